//! services/api/src/adapters/history.rs
//!
//! This module contains the adapter for the remote history service.
//! It implements the `HistoryService` port from the `core` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use legal_qa_core::domain::{InteractionKind, InteractionRecord, NewInteractionRecord};
use legal_qa_core::ports::{HistoryService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `HistoryService` port against the remote
/// history HTTP service. Writes go to `{base}/save`, reads to
/// `{base}/{userId}`.
#[derive(Clone)]
pub struct HttpHistoryAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpHistoryAdapter {
    /// Creates a new `HttpHistoryAdapter`. A trailing slash on `base_url`
    /// is tolerated.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Serialize)]
struct SaveInteractionRequest<'a> {
    #[serde(rename = "userId")]
    user_id: Uuid,
    query: &'a str,
    response: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct InteractionRecordDto {
    // The storage backend behind the service exposes Mongo-style `_id`.
    #[serde(alias = "_id")]
    id: String,
    #[serde(rename = "userId")]
    user_id: Uuid,
    query: String,
    response: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl InteractionRecordDto {
    fn to_domain(self) -> PortResult<InteractionRecord> {
        let kind = InteractionKind::parse(&self.kind).ok_or_else(|| {
            PortError::Unexpected(format!(
                "history service returned unknown interaction type '{}'",
                self.kind
            ))
        })?;
        Ok(InteractionRecord {
            id: self.id,
            user_id: self.user_id,
            query: self.query,
            response: self.response,
            kind,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `HistoryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl HistoryService for HttpHistoryAdapter {
    async fn save_interaction(&self, record: NewInteractionRecord) -> PortResult<()> {
        let url = format!("{}/save", self.base_url);
        let payload = SaveInteractionRequest {
            user_id: record.user_id,
            query: &record.query,
            response: &record.response,
            kind: record.kind.as_str(),
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                PortError::Unexpected(format!("failed to reach the history service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "history service returned {} on save",
                status
            )));
        }
        Ok(())
    }

    async fn interactions_for_user(&self, user_id: Uuid) -> PortResult<Vec<InteractionRecord>> {
        let url = format!("{}/{}", self.base_url, user_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            PortError::Unexpected(format!("failed to reach the history service: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "history service returned {} on read",
                status
            )));
        }

        let dtos: Vec<InteractionRecordDto> = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("failed to parse the history response: {}", e))
        })?;

        // All-or-nothing: one undecodable record fails the whole load.
        dtos.into_iter().map(|dto| dto.to_domain()).collect()
    }
}
