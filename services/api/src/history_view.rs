//! services/api/src/history_view.rs
//!
//! Read-only aggregation of a user's interaction history, partitioned by
//! kind for independent display.

use legal_qa_core::{
    domain::{InteractionKind, InteractionRecord},
    ports::{HistoryService, PortError, PortResult},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A user's history split by interaction kind. Within each partition the
/// history service's returned order is preserved; no re-sorting happens
/// locally. Both partitions being empty is a normal steady state.
#[derive(Debug, Default)]
pub struct HistoryPartitions {
    pub summaries: Vec<InteractionRecord>,
    pub qas: Vec<InteractionRecord>,
}

/// Fetches and partitions interaction history for display.
pub struct HistoryAggregator {
    history: Arc<dyn HistoryService>,
}

impl HistoryAggregator {
    pub fn new(history: Arc<dyn HistoryService>) -> Self {
        Self { history }
    }

    /// Loads all records for the user in one fetch and partitions them by
    /// kind.
    ///
    /// Without a resolvable user identity no fetch is attempted and
    /// `PortError::Unauthorized` is returned, distinct from service
    /// failures. Loading is all-or-nothing: any fetch or decode failure
    /// yields an error and no partial partitions.
    pub async fn load(&self, user_id: Option<Uuid>) -> PortResult<HistoryPartitions> {
        let user_id = user_id.ok_or(PortError::Unauthorized)?;

        let records = self.history.interactions_for_user(user_id).await?;
        info!("Loaded {} history records for user {}.", records.len(), user_id);

        let mut partitions = HistoryPartitions::default();
        for record in records {
            match record.kind {
                InteractionKind::Summary => partitions.summaries.push(record),
                InteractionKind::Qa => partitions.qas.push(record),
            }
        }
        Ok(partitions)
    }
}
