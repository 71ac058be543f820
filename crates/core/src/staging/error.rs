//! Staging error types.

use thiserror::Error;

/// Staging operation errors.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Document not found in the staging area.
    #[error("staged document not found: {key}")]
    NotFound {
        /// Key that was not found.
        key: String,
    },

    /// Staging backend configuration error.
    #[error("staging configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("staging operation failed: {0}")]
    Operation(String),
}

impl StagingError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for StagingError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}
