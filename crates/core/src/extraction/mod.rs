//! Client for the external document-understanding service.
//!
//! The interaction has two phases:
//!
//! ```text
//! submit_document:  POST upload/files (start) -> PUT bytes (upload, finalize)
//!                   -> GET files/{name} every 2s, at most 30 times, until ACTIVE
//! generate:         POST models/{model}:generateContent
//!                   parts = [fileData?, text], optional systemInstruction
//! ```
//!
//! Callers depend on [`DocumentExtractor`]; [`GeminiClient`] is the HTTP
//! implementation.

mod error;
mod gemini;
pub mod poll;
mod wire;

use std::future::Future;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use error::ExtractionError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use poll::{RetryPolicy, Sleeper, TokioSleeper};

/// Reference to a document the service has accepted and processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    /// URI to reference the document in generation requests.
    pub uri: String,
    /// MIME type the service recorded.
    pub mime_type: String,
}

/// Document upload and text generation.
pub trait DocumentExtractor: Send + Sync {
    /// Uploads a document and waits until the service has processed it.
    fn submit_document(
        &self,
        bytes: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> impl Future<Output = Result<DocumentHandle, ExtractionError>> + Send;

    /// Runs one generation request and returns the concatenated text.
    fn generate(
        &self,
        prompt: &str,
        document: Option<&DocumentHandle>,
        system_instruction: Option<&str>,
    ) -> impl Future<Output = Result<String, ExtractionError>> + Send;
}
