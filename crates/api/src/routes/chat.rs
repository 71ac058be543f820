//! Tax assistant chat.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use cognitax_core::chat::{ChatReply, ChatRequest, ChatTurn};
use cognitax_shared::AppError;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Query parameters for chat history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Conversation to return.
    #[serde(default)]
    pub session_id: String,
}

/// Creates chat routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(send_message))
        .route("/chat/history", get(history))
}

/// POST /chat - Ask the tax assistant a question.
async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state.chat.send(auth.user_id(), request).await?;
    Ok(Json(reply))
}

/// GET /chat/history - One conversation, oldest turn first.
async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatTurn>>, ApiError> {
    let session_id = query.session_id.trim();
    if session_id.is_empty() {
        return Err(AppError::Validation("session_id is required".to_string()).into());
    }
    let turns = state.chat.history(auth.user_id(), session_id).await?;
    Ok(Json(turns))
}
