//! Ingestion error types.

use cognitax_shared::AppError;
use cognitax_shared::types::{AmountOverflow, UploadId};
use thiserror::Error;

use super::types::InvalidTransition;
use crate::decoder::DecodeError;
use crate::extraction::ExtractionError;
use crate::staging::StagingError;
use crate::statement::EntryError;

/// Ingestion errors. Each variant belongs to one pipeline stage.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The document was rejected before an upload was created.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Writing or reading the staged document failed.
    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),

    /// The document service failed or timed out.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The extraction result was not the expected JSON.
    #[error("could not decode extraction result: {0}")]
    Decode(#[from] DecodeError),

    /// An extracted transaction failed validation.
    #[error("transaction {index} is invalid: {source}")]
    InvalidEntry {
        /// Zero-based position in the extracted list.
        index: usize,
        /// What was wrong.
        source: EntryError,
    },

    /// Statement totals do not fit the supported amount range.
    #[error("statement totals are out of range: {0}")]
    Totals(#[from] AmountOverflow),

    /// The upload is no longer `processing`.
    #[error("upload {upload_id}: {source}")]
    InvalidTransition {
        /// Upload ID.
        upload_id: UploadId,
        /// Rejected transition.
        source: InvalidTransition,
    },

    /// Upload not found.
    #[error("upload not found: {0}")]
    NotFound(UploadId),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl IngestionError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Pipeline stage the error belongs to.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::InvalidUpload(_) => "upload",
            Self::Staging(_) => "staging",
            Self::Extraction(_) => "extraction",
            Self::Decode(_) => "decode",
            Self::InvalidEntry { .. } | Self::Totals(_) => "validation",
            Self::InvalidTransition { .. } | Self::NotFound(_) | Self::Repository(_) => {
                "persistence"
            }
        }
    }
}

impl From<IngestionError> for AppError {
    fn from(err: IngestionError) -> Self {
        let message = err.to_string();
        match err {
            IngestionError::InvalidUpload(_) => Self::Validation(message),
            IngestionError::Extraction(ExtractionError::Timeout(_)) => Self::Timeout(message),
            IngestionError::Extraction(ExtractionError::ExternalService { .. }) => {
                Self::ExternalService(message)
            }
            IngestionError::Decode(_)
            | IngestionError::InvalidEntry { .. }
            | IngestionError::Totals(_) => {
                Self::Unprocessable(message)
            }
            IngestionError::InvalidTransition { .. } => Self::Conflict(message),
            IngestionError::NotFound(_) => Self::NotFound(message),
            IngestionError::Repository(_) => Self::Database(message),
            IngestionError::Staging(_) => Self::Internal(message),
        }
    }
}
