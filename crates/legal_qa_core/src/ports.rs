//! crates/legal_qa_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the remote
//! answering and history services.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{InteractionRecord, NewInteractionRecord};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    /// No resolvable user identity. History access without an established
    /// user is a precondition failure, kept distinct from transport errors.
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AnsweringService: Send + Sync {
    /// Answers a question based on a provided document context.
    async fn answer_question(&self, question: &str, context: &str) -> PortResult<String>;
}

#[async_trait]
pub trait HistoryService: Send + Sync {
    /// Persists one interaction record. The service assigns the record's
    /// identifier and timestamp.
    async fn save_interaction(&self, record: NewInteractionRecord) -> PortResult<()>;

    /// Fetches all interaction records for a user, in the order the service
    /// returns them. An empty collection is a valid result, not an error.
    async fn interactions_for_user(&self, user_id: Uuid) -> PortResult<Vec<InteractionRecord>>;
}
