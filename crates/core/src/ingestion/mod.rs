//! Upload lifecycle and the statement ingestion pipeline.
//!
//! ```text
//! create upload (processing)
//!   -> stage bytes -> submit document -> generate -> decode JSON
//!   -> validate entries -> estimate taxes -> advisory tips
//!   -> store transactions + summary, mark completed   (one transaction)
//! any error -> mark failed
//! staged bytes are discarded on every path
//! ```
//!
//! A periodic sweep fails uploads left in `processing` by a crash.

mod error;
mod prompts;
mod service;
mod types;


pub use error::IngestionError;
pub use service::{DEFAULT_MIME_TYPE, IngestionOptions, IngestionRepository, IngestionService};
pub use types::{
    IngestRequest, IngestionReport, InvalidTransition, Upload, UploadCompletion, UploadStatus,
};
