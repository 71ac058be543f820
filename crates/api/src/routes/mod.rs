//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod health;
pub mod tax;
pub mod transactions;
pub mod uploads;


/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let max_upload_bytes =
        usize::try_from(state.ingestion.options().max_upload_bytes).unwrap_or(usize::MAX);

    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(uploads::routes(max_upload_bytes))
        .merge(transactions::routes())
        .merge(tax::routes())
        .merge(analytics::routes())
        .merge(chat::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
