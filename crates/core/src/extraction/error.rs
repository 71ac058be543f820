//! Extraction error types.

use thiserror::Error;

/// Longest upstream body kept in an error.
const MAX_BODY_CHARS: usize = 512;

/// Errors talking to the document-understanding service.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The service failed, answered with a non-success status, or returned
    /// nothing usable.
    #[error("external service error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    ExternalService {
        /// Upstream HTTP status, when there was one.
        status: Option<u16>,
        /// Upstream body or a description of the failure.
        message: String,
    },

    /// A bounded wait ran out.
    #[error("timed out: {0}")]
    Timeout(String),
}

impl ExtractionError {
    /// Creates an external service error without an HTTP status.
    #[must_use]
    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalService {
            status: None,
            message: message.into(),
        }
    }

    /// Creates an external service error for a non-success response.
    #[must_use]
    pub fn upstream(status: u16, body: &str) -> Self {
        let message = if body.chars().count() > MAX_BODY_CHARS {
            let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
            format!("{truncated}...")
        } else {
            body.to_string()
        };
        Self::ExternalService {
            status: Some(status),
            message,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Returns true for timeouts.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        Self::ExternalService {
            status: err.status().map(|s| s.as_u16()),
            // Drop the URL so nothing sensitive ends up in logs.
            message: err.without_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_status() {
        let err = ExtractionError::upstream(503, "overloaded");
        assert_eq!(err.to_string(), "external service error (HTTP 503): overloaded");
    }

    #[test]
    fn test_display_without_status() {
        let err = ExtractionError::external("no candidates");
        assert_eq!(err.to_string(), "external service error: no candidates");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_long_bodies_truncated() {
        let body = "x".repeat(2000);
        let ExtractionError::ExternalService { message, .. } = ExtractionError::upstream(500, &body)
        else {
            panic!("expected external service error");
        };
        assert_eq!(message.len(), MAX_BODY_CHARS + 3);
    }

    #[test]
    fn test_timeout() {
        assert!(ExtractionError::timeout("file never became active").is_timeout());
    }
}
