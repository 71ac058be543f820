//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cognitax_core::chat::ChatError;
use cognitax_core::ingestion::IngestionError;
use cognitax_db::RepositoryError;
use cognitax_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Error returned by handlers.
///
/// Renders as `{"error": code, "message": text}`, plus `"stage"` for
/// ingestion failures.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    stage: Option<&'static str>,
}

impl ApiError {
    /// The underlying application error.
    #[must_use]
    pub const fn app_error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self { error, stage: None }
    }
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        let stage = err.stage();
        Self {
            error: err.into(),
            stage: Some(stage),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        AppError::from(err).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        AppError::from(err).into()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err.to_string()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(code = self.error.error_code(), stage = self.stage, error = %self.error, "Request failed");
        }

        let mut body = json!({
            "error": self.error.error_code(),
            "message": self.error.message(),
        });
        if let Some(stage) = self.stage {
            body["stage"] = json!(stage);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitax_core::decoder::DecodeError;

    #[test]
    fn test_ingestion_error_carries_stage() {
        let err = ApiError::from(IngestionError::Decode(DecodeError::Empty));
        assert_eq!(err.stage, Some("decode"));
        assert_eq!(err.app_error().status_code(), 422);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_database_error_is_500() {
        let response = ApiError::from(DbErr::Custom("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
