pub mod rest;
pub mod state;

// Re-export the REST handlers to make them easily accessible
// to the binary that will build the web server router.
pub use rest::{ask_question_handler, extract_document_handler, history_handler};
