//! services/api/src/qa.rs
//!
//! Owns the lifecycle of one question-and-answer submission: input
//! validation, the call to the external answering service, and the
//! background write of the exchange into the user's history.

use legal_qa_core::{
    domain::{InteractionKind, NewInteractionRecord},
    ports::{AnsweringService, HistoryService, PortResult},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

/// Shown in the answer area while a submission is in flight. Distinct from
/// any real answer, including an empty one.
pub const PROCESSING_PLACEHOLDER: &str = "Analyzing document...";

/// The submission lifecycle of a `QaSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaStatus {
    Idle,
    Submitting,
    Answered,
    Failed,
}

/// What a call to [`QaSession::submit`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answering service produced an answer.
    Answered,
    /// The submission was a no-op: a required input was empty, or another
    /// submission was already in flight.
    Rejected,
}

/// One question/answer cycle against a fixed document context.
///
/// A session is created fresh for each submission with the question, the
/// context (handed over by value, so later ingestion cannot alter what a
/// running session records), and the identity of the already-authenticated
/// user.
pub struct QaSession {
    user_id: Uuid,
    question: String,
    context: String,
    status: QaStatus,
    answer_text: String,
    expanded: bool,
    answering: Arc<dyn AnsweringService>,
    history: Arc<dyn HistoryService>,
    history_write: Option<JoinHandle<()>>,
}

impl QaSession {
    pub fn new(
        answering: Arc<dyn AnsweringService>,
        history: Arc<dyn HistoryService>,
        user_id: Uuid,
        question: String,
        context: String,
    ) -> Self {
        Self {
            user_id,
            question,
            context,
            status: QaStatus::Idle,
            answer_text: String::new(),
            expanded: false,
            answering,
            history,
            history_write: None,
        }
    }

    pub fn status(&self) -> QaStatus {
        self.status
    }

    /// Whether a submit action is currently allowed. False while a
    /// submission is in flight or when either required input is empty; the
    /// submit control at the boundary is disabled off this value rather than
    /// raising an error.
    pub fn can_submit(&self) -> bool {
        !self.question.is_empty()
            && !self.context.is_empty()
            && self.status != QaStatus::Submitting
    }

    /// Runs one submission cycle against the answering service.
    ///
    /// When the preconditions do not hold this is a no-op returning
    /// [`SubmitOutcome::Rejected`]; no call leaves the process. On success
    /// the trimmed answer is stored, the session moves to `Answered`, and
    /// the history write is spawned as a detached task. On failure the
    /// session moves to `Failed` with an empty answer and the error is
    /// returned for the caller to surface; a new submission is permitted
    /// afterwards.
    ///
    /// Overlapping submissions cannot happen: `submit` needs exclusive
    /// access to the session, and callers sharing one behind a lock are
    /// stopped by the `Submitting` check in `can_submit`.
    pub async fn submit(&mut self) -> PortResult<SubmitOutcome> {
        if !self.can_submit() {
            return Ok(SubmitOutcome::Rejected);
        }

        self.status = QaStatus::Submitting;
        self.answer_text.clear();
        info!("Submitting question to the answering service.");

        match self
            .answering
            .answer_question(&self.question, &self.context)
            .await
        {
            Ok(raw_answer) => {
                let answer = raw_answer.trim().to_string();
                self.answer_text = answer.clone();
                self.status = QaStatus::Answered;

                // The record is written only after the session is already
                // visibly answered; its outcome never feeds back into the
                // session state.
                let record = NewInteractionRecord {
                    user_id: self.user_id,
                    query: format_query(&self.question, &self.context),
                    response: answer,
                    kind: InteractionKind::Qa,
                };
                self.history_write = Some(spawn_history_write(self.history.clone(), record));

                Ok(SubmitOutcome::Answered)
            }
            Err(e) => {
                error!("Answering service call failed: {}", e);
                self.status = QaStatus::Failed;
                Err(e)
            }
        }
    }

    /// The answer text to show the user: the placeholder while a submission
    /// is pending, the trimmed answer once one has arrived, and nothing at
    /// all before the first submission or after a failure.
    pub fn displayed_answer(&self) -> Option<&str> {
        match self.status {
            QaStatus::Submitting => Some(PROCESSING_PLACEHOLDER),
            QaStatus::Answered => Some(&self.answer_text),
            QaStatus::Idle | QaStatus::Failed => None,
        }
    }

    /// Flips the enlarged answer view. Presentation only: the submission
    /// state machine and the stored answer are never affected, and the flag
    /// is not persisted anywhere.
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Hands out the handle of the detached history write, if one was
    /// spawned. The write is best effort by contract: the session never
    /// waits for it, and its failure is logged without being surfaced.
    /// Tests and shutdown paths can await the handle to synchronize.
    pub fn take_history_write(&mut self) -> Option<JoinHandle<()>> {
        self.history_write.take()
    }
}

/// Formats the "what was asked" field of a history record: the literal
/// question followed by the full document context.
pub fn format_query(question: &str, context: &str) -> String {
    format!("Q: {}\n\nContext:\n{}", question, context)
}

/// A "fire-and-forget" background task persisting one exchange to the
/// history service without blocking the user.
fn spawn_history_write(
    history: Arc<dyn HistoryService>,
    record: NewInteractionRecord,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let user_id = record.user_id;
        if let Err(e) = history.save_interaction(record).await {
            error!(
                "Failed to record Q&A exchange in history for user {}: {}",
                user_id, e
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use legal_qa_core::domain::InteractionRecord;
    use legal_qa_core::ports::PortError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubAnswering {
        answer: Option<String>,
        calls: AtomicUsize,
    }

    impl StubAnswering {
        fn answering_with(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(answer.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnsweringService for StubAnswering {
        async fn answer_question(&self, _question: &str, _context: &str) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Some(answer) => Ok(answer.clone()),
                None => Err(PortError::Unexpected("answering service is down".to_string())),
            }
        }
    }

    struct RecordingHistory {
        saved: Mutex<Vec<NewInteractionRecord>>,
        fail_writes: bool,
    }

    impl RecordingHistory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                saved: Mutex::new(Vec::new()),
                fail_writes: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                saved: Mutex::new(Vec::new()),
                fail_writes: true,
            })
        }

        fn saved_records(&self) -> Vec<NewInteractionRecord> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HistoryService for RecordingHistory {
        async fn save_interaction(&self, record: NewInteractionRecord) -> PortResult<()> {
            if self.fail_writes {
                return Err(PortError::Unexpected("history service is down".to_string()));
            }
            self.saved.lock().unwrap().push(record);
            Ok(())
        }

        async fn interactions_for_user(
            &self,
            _user_id: Uuid,
        ) -> PortResult<Vec<InteractionRecord>> {
            Ok(Vec::new())
        }
    }

    fn session(
        answering: Arc<StubAnswering>,
        history: Arc<RecordingHistory>,
        question: &str,
        context: &str,
    ) -> QaSession {
        QaSession::new(
            answering,
            history,
            Uuid::new_v4(),
            question.to_string(),
            context.to_string(),
        )
    }

    #[tokio::test]
    async fn empty_question_is_rejected_without_a_service_call() {
        let answering = StubAnswering::answering_with("irrelevant");
        let history = RecordingHistory::new();
        let mut qa = session(answering.clone(), history, "", "some context");

        let outcome = qa.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(qa.status(), QaStatus::Idle);
        assert_eq!(answering.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_context_is_rejected_without_a_service_call() {
        let answering = StubAnswering::answering_with("irrelevant");
        let history = RecordingHistory::new();
        let mut qa = session(answering.clone(), history, "what is clause 4?", "");

        let outcome = qa.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(answering.call_count(), 0);
    }

    #[tokio::test]
    async fn successful_submission_stores_the_trimmed_answer() {
        let answering = StubAnswering::answering_with("  Yes, under clause 4.  ");
        let history = RecordingHistory::new();
        let mut qa = session(answering, history, "Is it covered?", "the contract text");

        let outcome = qa.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Answered);
        assert_eq!(qa.status(), QaStatus::Answered);
        assert_eq!(qa.displayed_answer(), Some("Yes, under clause 4."));
    }

    #[tokio::test]
    async fn exactly_one_history_write_per_successful_answer() {
        let answering = StubAnswering::answering_with("  Yes, under clause 4.  ");
        let history = RecordingHistory::new();
        let mut qa = session(
            answering,
            history.clone(),
            "Is it covered?",
            "the contract text",
        );

        qa.submit().await.unwrap();
        qa.take_history_write().unwrap().await.unwrap();

        let saved = history.saved_records();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].kind, InteractionKind::Qa);
        assert_eq!(saved[0].response, "Yes, under clause 4.");
        assert_eq!(
            saved[0].query,
            "Q: Is it covered?\n\nContext:\nthe contract text"
        );
    }

    #[tokio::test]
    async fn failed_submission_leaves_the_answer_empty_and_permits_retry() {
        let answering = StubAnswering::failing();
        let history = RecordingHistory::new();
        let mut qa = session(answering, history.clone(), "Is it covered?", "the contract");

        let result = qa.submit().await;

        assert!(result.is_err());
        assert_eq!(qa.status(), QaStatus::Failed);
        assert_eq!(qa.displayed_answer(), None);
        assert!(qa.can_submit());
        assert!(qa.take_history_write().is_none());
        assert!(history.saved_records().is_empty());
    }

    #[tokio::test]
    async fn history_write_failure_does_not_revert_the_answer() {
        let answering = StubAnswering::answering_with("The tenant is liable.");
        let history = RecordingHistory::failing();
        let mut qa = session(answering, history, "Who is liable?", "the lease");

        qa.submit().await.unwrap();
        qa.take_history_write().unwrap().await.unwrap();

        assert_eq!(qa.status(), QaStatus::Answered);
        assert_eq!(qa.displayed_answer(), Some("The tenant is liable."));
    }

    #[tokio::test]
    async fn empty_answer_is_distinguishable_from_the_placeholder() {
        let answering = StubAnswering::answering_with("   ");
        let history = RecordingHistory::new();
        let mut qa = session(answering, history, "Anything?", "the contract");

        qa.submit().await.unwrap();

        assert_eq!(qa.status(), QaStatus::Answered);
        assert_eq!(qa.displayed_answer(), Some(""));
        assert_ne!(qa.displayed_answer(), Some(PROCESSING_PLACEHOLDER));
    }

    #[tokio::test]
    async fn toggling_expanded_never_touches_the_state_machine() {
        let answering = StubAnswering::answering_with("Yes.");
        let history = RecordingHistory::new();
        let mut qa = session(answering, history, "Covered?", "the contract");

        assert!(!qa.is_expanded());
        qa.toggle_expanded();
        assert!(qa.is_expanded());
        assert_eq!(qa.status(), QaStatus::Idle);

        qa.submit().await.unwrap();
        let answer_before = qa.displayed_answer().map(str::to_string);
        qa.toggle_expanded();
        qa.toggle_expanded();
        assert_eq!(qa.status(), QaStatus::Answered);
        assert_eq!(qa.displayed_answer().map(str::to_string), answer_before);
    }
}
