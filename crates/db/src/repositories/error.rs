//! Repository error type.

use cognitax_core::chat::ChatError;
use cognitax_core::ingestion::IngestionError;
use cognitax_shared::AppError;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors from the read-side repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// A stored row could not be turned into a domain value.
    #[error("corrupt row in {table}: {reason}")]
    Corrupt {
        /// Table the row came from.
        table: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl RepositoryError {
    /// Create a corrupt-row error.
    #[must_use]
    pub fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            table,
            reason: reason.into(),
        }
    }
}

impl From<RepositoryError> for IngestionError {
    fn from(err: RepositoryError) -> Self {
        Self::repository(err.to_string())
    }
}

impl From<RepositoryError> for ChatError {
    fn from(err: RepositoryError) -> Self {
        Self::repository(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Database(err.to_string())
    }
}
