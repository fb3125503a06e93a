//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::extract::{Artifact, MediaKind};
use crate::history_view::{HistoryAggregator, HistoryPartitions};
use crate::ingest::{DocumentInput, IngestionController};
use crate::qa::{QaSession, SubmitOutcome};
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use legal_qa_core::domain::InteractionRecord;
use legal_qa_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        extract_document_handler,
        ask_question_handler,
        history_handler,
    ),
    components(
        schemas(
            ExtractResponse,
            AskRequest,
            AskResponse,
            HistoryResponse,
            InteractionRecordResponse
        )
    ),
    tags(
        (name = "Legal Document Q&A API", description = "API endpoints for document ingestion, question answering and history.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully extracting a document.
#[derive(Serialize, ToSchema)]
pub struct ExtractResponse {
    #[serde(rename = "fileName")]
    file_name: Option<String>,
    context: String,
}

/// The payload for submitting a question against a document context.
#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    question: String,
    context: String,
}

/// The response payload carrying the answering service's answer.
#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    answer: String,
}

/// One persisted interaction, as exposed to the frontend.
#[derive(Serialize, ToSchema)]
pub struct InteractionRecordResponse {
    id: String,
    #[serde(rename = "userId")]
    user_id: Uuid,
    query: String,
    response: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "createdAt")]
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InteractionRecord> for InteractionRecordResponse {
    fn from(record: InteractionRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            query: record.query,
            response: record.response,
            kind: record.kind.as_str().to_string(),
            created_at: record.created_at,
        }
    }
}

/// A user's history, partitioned by interaction kind.
#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    summaries: Vec<InteractionRecordResponse>,
    qas: Vec<InteractionRecordResponse>,
}

impl From<HistoryPartitions> for HistoryResponse {
    fn from(partitions: HistoryPartitions) -> Self {
        Self {
            summaries: partitions.summaries.into_iter().map(Into::into).collect(),
            qas: partitions.qas.into_iter().map(Into::into).collect(),
        }
    }
}

//=========================================================================================
// Header Helpers
//=========================================================================================

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let user_id_str = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;

    Uuid::parse_str(user_id_str).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Extract the text of an uploaded document.
///
/// Accepts a multipart/form-data request with a single file part. The part's
/// declared content type decides the media kind; only PDF and plain text are
/// accepted, everything else is rejected without extraction.
#[utoipa::path(
    post,
    path = "/documents/extract",
    request_body(content_type = "multipart/form-data", description = "The document to extract."),
    responses(
        (status = 200, description = "Document extracted successfully", body = ExtractResponse),
        (status = 400, description = "Bad request (e.g., missing file part)"),
        (status = 415, description = "Unsupported media type"),
        (status = 422, description = "The document could not be decoded"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn extract_document_handler(
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;

    let name = field.file_name().unwrap_or("untitled.txt").to_string();
    let declared_type = field.content_type().unwrap_or("").to_string();
    let kind = MediaKind::from_mime(&declared_type).ok_or_else(|| {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported media type: {}", declared_type),
        )
    })?;

    let bytes = field.bytes().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    let artifact = Artifact { name, kind, bytes };

    // PDF decoding is CPU-bound, so the whole ingestion runs off the async
    // executor.
    let ingested = tokio::task::spawn_blocking(move || {
        let mut controller = IngestionController::new();
        controller.ingest(DocumentInput::File(artifact)).map(|_| {
            (
                controller.selected_file_name().map(str::to_string),
                controller.context().to_string(),
            )
        })
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Extraction task failed: {}", e),
        )
    })?;

    match ingested {
        Ok((file_name, context)) => Ok(Json(ExtractResponse { file_name, context })),
        Err(e) => {
            error!("Failed to extract uploaded document: {}", e);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "Error reading file".to_string(),
            ))
        }
    }
}

/// Answer a question against a document context.
///
/// A `x-user-id` header is required so the exchange can be recorded in the
/// user's history. The history write is best effort and never blocks the
/// answer.
#[utoipa::path(
    post,
    path = "/questions",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Question answered", body = AskResponse),
        (status = 400, description = "Bad request (e.g., missing header, empty question or context)"),
        (status = 502, description = "The answering service failed")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn ask_question_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = user_id_from_headers(&headers)?;

    let mut session = QaSession::new(
        app_state.answering.clone(),
        app_state.history.clone(),
        user_id,
        payload.question,
        payload.context,
    );

    match session.submit().await {
        Ok(SubmitOutcome::Answered) => {
            let answer = session.displayed_answer().unwrap_or_default().to_string();
            Ok(Json(AskResponse { answer }))
        }
        Ok(SubmitOutcome::Rejected) => Err((
            StatusCode::BAD_REQUEST,
            "Question and context are required".to_string(),
        )),
        Err(e) => {
            error!("Failed to get an answer: {:?}", e);
            Err((StatusCode::BAD_GATEWAY, "Failed to get answer".to_string()))
        }
    }
}

/// Fetch a user's interaction history, partitioned by kind.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "History fetched successfully", body = HistoryResponse),
        (status = 401, description = "No resolvable user identity"),
        (status = 502, description = "The history service failed")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok());

    let aggregator = HistoryAggregator::new(app_state.history.clone());
    match aggregator.load(user_id).await {
        Ok(partitions) => Ok(Json(HistoryResponse::from(partitions))),
        Err(PortError::Unauthorized) => Err((
            StatusCode::UNAUTHORIZED,
            "A valid x-user-id header is required".to_string(),
        )),
        Err(e) => {
            error!("Failed to fetch history: {:?}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                "Failed to fetch history".to_string(),
            ))
        }
    }
}
