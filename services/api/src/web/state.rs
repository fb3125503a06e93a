//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use legal_qa_core::ports::{AnsweringService, HistoryService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub answering: Arc<dyn AnsweringService>,
    pub history: Arc<dyn HistoryService>,
}
