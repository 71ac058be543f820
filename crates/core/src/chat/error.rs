//! Chat error types.

use cognitax_shared::AppError;
use thiserror::Error;

use crate::extraction::ExtractionError;

/// Chat errors.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Empty message.
    #[error("message is required")]
    EmptyMessage,

    /// The assistant could not answer.
    #[error("assistant unavailable: {0}")]
    Generation(#[from] ExtractionError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ChatError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        let message = err.to_string();
        match err {
            ChatError::EmptyMessage => Self::Validation(message),
            ChatError::Generation(ExtractionError::Timeout(_)) => Self::Timeout(message),
            ChatError::Generation(ExtractionError::ExternalService { .. }) => {
                Self::ExternalService(message)
            }
            ChatError::Repository(_) => Self::Database(message),
        }
    }
}
