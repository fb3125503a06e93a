//! crates/legal_qa_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The kind of a persisted interaction. This set is closed: the history
/// service only ever stores document summaries and question/answer exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Summary,
    Qa,
}

impl InteractionKind {
    /// The wire name of this kind, as the history service stores it.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Summary => "summary",
            InteractionKind::Qa => "qa",
        }
    }

    /// Parses a wire name back into a kind. Returns `None` for anything
    /// outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "summary" => Some(InteractionKind::Summary),
            "qa" => Some(InteractionKind::Qa),
            _ => None,
        }
    }
}

/// Represents one persisted question/answer or document/summary exchange,
/// as returned by the history service. Records are append-only; nothing in
/// this application updates or deletes one after it has been read.
#[derive(Debug, Clone)]
pub struct InteractionRecord {
    /// Opaque identifier assigned by the history service.
    pub id: String,
    pub user_id: Uuid,
    /// The input shown to the user as "what was asked". For Q&A records this
    /// is the question concatenated with the full document context.
    pub query: String,
    pub response: String,
    pub kind: InteractionKind,
    pub created_at: DateTime<Utc>,
}

/// The write-side shape of an interaction record. The history service
/// assigns `id` and `created_at` on its side, so neither appears here.
#[derive(Debug, Clone)]
pub struct NewInteractionRecord {
    pub user_id: Uuid,
    pub query: String,
    pub response: String,
    pub kind: InteractionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names_round_trip() {
        assert_eq!(InteractionKind::parse("qa"), Some(InteractionKind::Qa));
        assert_eq!(
            InteractionKind::parse("summary"),
            Some(InteractionKind::Summary)
        );
        assert_eq!(
            InteractionKind::parse(InteractionKind::Qa.as_str()),
            Some(InteractionKind::Qa)
        );
    }

    #[test]
    fn kind_rejects_unknown_wire_names() {
        assert_eq!(InteractionKind::parse("note"), None);
        assert_eq!(InteractionKind::parse(""), None);
        assert_eq!(InteractionKind::parse("QA"), None);
    }
}
