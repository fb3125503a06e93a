//! services/api/src/ingest.rs
//!
//! Unifies the document input surfaces (file upload and pasted text) into
//! one "current context" value for the Q&A pipeline.

use crate::extract::{self, Artifact, ExtractError};

/// A document input, tagged by the surface it arrived through. Drag-and-drop
/// and the file picker both produce `File`; the textarea produces `Pasted`.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    File(Artifact),
    Pasted(String),
}

/// The input surface the user last edited. Only the active mode's text is
/// the authoritative context; the other mode's text is retained so the user
/// can toggle back without losing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    File,
    Paste,
}

/// Tracks the current document context across both input surfaces.
#[derive(Debug)]
pub struct IngestionController {
    selected_file_name: Option<String>,
    file_text: String,
    pasted_text: String,
    active_mode: InputMode,
}

impl IngestionController {
    pub fn new() -> Self {
        Self {
            selected_file_name: None,
            file_text: String::new(),
            pasted_text: String::new(),
            // The UI opens on the upload surface.
            active_mode: InputMode::File,
        }
    }

    /// Ingests a document input, replacing (never appending to) whatever the
    /// matching surface held before.
    ///
    /// A failed file extraction clears the selected file name but leaves
    /// both held texts and the active mode untouched, so the user's prior
    /// context survives a bad upload.
    pub fn ingest(&mut self, input: DocumentInput) -> Result<(), ExtractError> {
        match input {
            DocumentInput::File(artifact) => match extract::extract_text(&artifact) {
                Ok(text) => {
                    self.file_text = text;
                    self.selected_file_name = Some(artifact.name);
                    self.active_mode = InputMode::File;
                    Ok(())
                }
                Err(e) => {
                    self.selected_file_name = None;
                    Err(e)
                }
            },
            DocumentInput::Pasted(text) => {
                self.pasted_text = text;
                self.active_mode = InputMode::Paste;
                Ok(())
            }
        }
    }

    /// Switches the visible input surface. Held text on the other surface is
    /// retained, not cleared.
    pub fn set_active_mode(&mut self, mode: InputMode) {
        self.active_mode = mode;
    }

    pub fn active_mode(&self) -> InputMode {
        self.active_mode
    }

    /// The authoritative context to submit: the text of the surface the user
    /// last actively edited.
    pub fn context(&self) -> &str {
        match self.active_mode {
            InputMode::File => &self.file_text,
            InputMode::Paste => &self.pasted_text,
        }
    }

    pub fn selected_file_name(&self) -> Option<&str> {
        self.selected_file_name.as_deref()
    }

    /// Resets both surfaces and the selected file name. The active mode is
    /// left where the user last put it.
    pub fn clear(&mut self) {
        self.selected_file_name = None;
        self.file_text.clear();
        self.pasted_text.clear();
    }
}

impl Default for IngestionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MediaKind;
    use bytes::Bytes;

    fn text_artifact(name: &str, contents: &str) -> Artifact {
        Artifact {
            name: name.to_string(),
            kind: MediaKind::PlainText,
            bytes: Bytes::from(contents.to_string().into_bytes()),
        }
    }

    fn corrupt_pdf_artifact() -> Artifact {
        Artifact {
            name: "broken.pdf".to_string(),
            kind: MediaKind::Pdf,
            bytes: Bytes::from_static(b"not a pdf"),
        }
    }

    #[test]
    fn file_ingestion_sets_context_and_name() {
        let mut controller = IngestionController::new();
        controller
            .ingest(DocumentInput::File(text_artifact("lease.txt", "lease terms")))
            .unwrap();

        assert_eq!(controller.context(), "lease terms");
        assert_eq!(controller.selected_file_name(), Some("lease.txt"));
        assert_eq!(controller.active_mode(), InputMode::File);
    }

    #[test]
    fn repeated_file_ingestion_replaces_not_appends() {
        let mut controller = IngestionController::new();
        controller
            .ingest(DocumentInput::File(text_artifact("a.txt", "first")))
            .unwrap();
        controller
            .ingest(DocumentInput::File(text_artifact("b.txt", "second")))
            .unwrap();

        assert_eq!(controller.context(), "second");
        assert_eq!(controller.selected_file_name(), Some("b.txt"));
    }

    #[test]
    fn paste_becomes_the_authoritative_context() {
        let mut controller = IngestionController::new();
        controller
            .ingest(DocumentInput::File(text_artifact("a.txt", "file text")))
            .unwrap();
        controller
            .ingest(DocumentInput::Pasted("pasted text".to_string()))
            .unwrap();

        assert_eq!(controller.active_mode(), InputMode::Paste);
        assert_eq!(controller.context(), "pasted text");
    }

    #[test]
    fn switching_modes_retains_both_texts() {
        let mut controller = IngestionController::new();
        controller
            .ingest(DocumentInput::File(text_artifact("a.txt", "file text")))
            .unwrap();
        controller
            .ingest(DocumentInput::Pasted("pasted text".to_string()))
            .unwrap();

        controller.set_active_mode(InputMode::File);
        assert_eq!(controller.context(), "file text");
        assert_eq!(controller.selected_file_name(), Some("a.txt"));

        controller.set_active_mode(InputMode::Paste);
        assert_eq!(controller.context(), "pasted text");
    }

    #[test]
    fn failed_extraction_keeps_prior_context_and_clears_name() {
        let mut controller = IngestionController::new();
        controller
            .ingest(DocumentInput::File(text_artifact("good.txt", "good text")))
            .unwrap();

        let result = controller.ingest(DocumentInput::File(corrupt_pdf_artifact()));
        assert!(result.is_err());
        assert_eq!(controller.context(), "good text");
        assert_eq!(controller.selected_file_name(), None);
        assert_eq!(controller.active_mode(), InputMode::File);
    }

    #[test]
    fn clear_resets_both_surfaces() {
        let mut controller = IngestionController::new();
        controller
            .ingest(DocumentInput::File(text_artifact("a.txt", "file text")))
            .unwrap();
        controller
            .ingest(DocumentInput::Pasted("pasted text".to_string()))
            .unwrap();

        controller.clear();

        assert_eq!(controller.context(), "");
        assert_eq!(controller.selected_file_name(), None);
        controller.set_active_mode(InputMode::File);
        assert_eq!(controller.context(), "");
    }
}
