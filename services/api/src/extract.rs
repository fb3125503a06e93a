//! services/api/src/extract.rs
//!
//! Converts an uploaded artifact (PDF or plain text) into a single
//! normalized text string that the Q&A pipeline uses as its document
//! context.

use bytes::Bytes;
use lopdf::Document;

/// A custom error type for extraction failures.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The declared media type is not one the pipeline accepts. No decoding
    /// is attempted for these artifacts.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// The artifact could not be decoded. The caller keeps whatever context
    /// it already held and reports the failure without retrying.
    #[error("Failed to extract text from the document: {0}")]
    ExtractionFailed(String),
}

/// The media kinds accepted at the ingestion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    PlainText,
}

impl MediaKind {
    /// Maps a declared content type onto a supported media kind. Parameters
    /// after `;` (e.g. `charset=utf-8`) are ignored. Every other type yields
    /// `None`, so unsupported uploads are rejected before any bytes are read.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "application/pdf" => Some(MediaKind::Pdf),
            "text/plain" => Some(MediaKind::PlainText),
            _ => None,
        }
    }
}

/// A user-supplied file-like input, tagged with its declared media kind.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub kind: MediaKind,
    pub bytes: Bytes,
}

/// Extracts the text of an artifact as one string.
///
/// PDF pages are processed in ascending page order; the text tokens of a
/// page are joined with single spaces and pages are separated by newlines.
/// Plain text is used verbatim as decoded from UTF-8. The function is pure:
/// the same bytes always produce the same output. Callers on an async
/// executor should wrap PDF extraction in `spawn_blocking`.
pub fn extract_text(artifact: &Artifact) -> Result<String, ExtractError> {
    match artifact.kind {
        MediaKind::Pdf => extract_pdf_text(&artifact.bytes),
        MediaKind::PlainText => std::str::from_utf8(&artifact.bytes)
            .map(str::to_string)
            .map_err(|e| {
                ExtractError::ExtractionFailed(format!("file is not valid UTF-8 text: {}", e))
            }),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| {
        ExtractError::ExtractionFailed(format!("could not open PDF document: {}", e))
    })?;

    // get_pages returns a BTreeMap keyed by 1-based page number, so
    // iteration order is ascending page order.
    let mut pages_text = Vec::new();
    for (page_number, _object_id) in doc.get_pages() {
        let raw = doc.extract_text(&[page_number]).map_err(|e| {
            ExtractError::ExtractionFailed(format!(
                "could not extract text from page {}: {}",
                page_number, e
            ))
        })?;
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        pages_text.push(tokens.join(" "));
    }

    Ok(pages_text.join("\n"))
}
