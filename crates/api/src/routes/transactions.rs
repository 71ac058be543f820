//! Transaction listing.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use cognitax_core::statement::Transaction;
use cognitax_db::TransactionRepository;
use cognitax_shared::types::UploadId;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    /// Restrict to one upload.
    pub upload_id: Option<Uuid>,
}

/// Creates transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transactions", get(list_transactions))
}

/// GET /transactions - The caller's transactions, optionally for one upload.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = TransactionRepository::new((*state.db).clone())
        .list_for_owner(auth.user_id(), query.upload_id.map(UploadId::from_uuid))
        .await?;
    Ok(Json(transactions))
}
