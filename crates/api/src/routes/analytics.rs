//! Cash-flow analytics.

use axum::{Json, Router, extract::State, routing::get};
use cognitax_core::analytics::{AnalyticsSummary, summarize};
use cognitax_db::{TaxSummaryRepository, TransactionRepository};
use cognitax_shared::AppError;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Creates analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/analytics", get(get_analytics))
}

/// GET /analytics - Totals and breakdowns over all of the caller's transactions.
async fn get_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let owner = auth.user_id();
    let transactions = TransactionRepository::new((*state.db).clone())
        .list_for_owner(owner, None)
        .await?;
    let latest = TaxSummaryRepository::new((*state.db).clone())
        .latest_for_owner(owner)
        .await?;

    let summary = summarize(&transactions, latest).map_err(AppError::from)?;
    Ok(Json(summary))
}
