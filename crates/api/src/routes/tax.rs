//! Tax calculation history.

use axum::{Json, Router, extract::State, routing::get};
use cognitax_core::tax::TaxSummary;
use cognitax_db::TaxSummaryRepository;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Creates tax routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/tax-calculations", get(list_tax_calculations))
}

/// GET /tax-calculations - The caller's tax summaries, newest first.
async fn list_tax_calculations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TaxSummary>>, ApiError> {
    let summaries = TaxSummaryRepository::new((*state.db).clone())
        .list_for_owner(auth.user_id())
        .await?;
    Ok(Json(summaries))
}
