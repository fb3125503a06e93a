//! services/api/src/adapters/answering.rs
//!
//! This module contains the adapter for the remote answering service.
//! It implements the `AnsweringService` port from the `core` crate.

use async_trait::async_trait;
use legal_qa_core::ports::{AnsweringService, PortError, PortResult};
use serde::{Deserialize, Serialize};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnsweringService` against the remote
/// question-answering HTTP endpoint.
#[derive(Clone)]
pub struct HttpAnsweringAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnsweringAdapter {
    /// Creates a new `HttpAnsweringAdapter`. `endpoint` is the full URL of
    /// the question-answer endpoint.
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

//=========================================================================================
// Wire Shapes
//=========================================================================================

#[derive(Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct AnswerResponse {
    answer: String,
}

//=========================================================================================
// `AnsweringService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnsweringService for HttpAnsweringAdapter {
    /// Posts the question and context and returns the service's answer as
    /// delivered. Whitespace trimming is the caller's concern, not the
    /// transport's. Any non-success HTTP outcome is a failure.
    async fn answer_question(&self, question: &str, context: &str) -> PortResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnswerRequest { question, context })
            .send()
            .await
            .map_err(|e| {
                PortError::Unexpected(format!("failed to reach the answering service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "answering service returned {}",
                status
            )));
        }

        let body: AnswerResponse = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("failed to parse the answering response: {}", e))
        })?;

        Ok(body.answer)
    }
}
