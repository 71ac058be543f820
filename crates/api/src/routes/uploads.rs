//! Statement upload and upload listing.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use cognitax_core::ingestion::{DEFAULT_MIME_TYPE, IngestRequest, IngestionReport, Upload};
use cognitax_db::UploadRepository;
use cognitax_shared::AppError;
use tracing::error;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

const DEFAULT_FILENAME: &str = "statement.pdf";

/// Headroom over the document limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Creates upload routes. Bodies are capped just above `max_upload_bytes` so
/// oversized documents still reach the size check and get a JSON error.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload-pdf",
            post(upload_pdf).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/uploads", get(list_uploads))
}

/// POST /upload-pdf - Extract, tax and store a bank statement.
async fn upload_pdf(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<IngestionReport>, ApiError> {
    let mut document = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        document = Some((filename, mime_type, bytes));
        break;
    }

    let Some((filename, mime_type, bytes)) = document else {
        return Err(AppError::Validation(format!("multipart field '{FILE_FIELD}' is required")).into());
    };
    state.ingestion.check_upload(bytes.len())?;

    let request = IngestRequest {
        owner_id: auth.user_id(),
        filename,
        mime_type,
        bytes,
    };

    // Runs detached so a dropped connection cannot strand the upload mid-pipeline.
    let ingestion = state.ingestion.clone();
    let report = tokio::spawn(async move { ingestion.ingest(request).await })
        .await
        .map_err(|e| {
            error!(error = %e, "Ingestion task panicked");
            AppError::Internal("ingestion task failed".to_string())
        })??;

    Ok(Json(report))
}

/// GET /uploads - The caller's uploads, newest first.
async fn list_uploads(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Upload>>, ApiError> {
    let uploads = UploadRepository::new((*state.db).clone())
        .list_for_owner(auth.user_id())
        .await?;
    Ok(Json(uploads))
}
