//! Registration, login and the current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cognitax_core::auth::{
    check_new_password, hash_password, is_plausible_email, normalize_email, verify_password,
};
use cognitax_db::UserRepository;
use cognitax_db::entities::users;
use cognitax_shared::auth::{LoginRequest, RegisterRequest, TokenResponse, UserInfo};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::middleware::auth::AuthUser;

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Auth routes that need a valid token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

fn invalid_credentials() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "Invalid email or password",
    )
}

fn email_taken() -> Response {
    error_response(
        StatusCode::CONFLICT,
        "email_exists",
        "An account with this email already exists",
    )
}

/// Signs a token for the user and wraps it in the response body.
fn issue_token(state: &AppState, user: users::Model, status: StatusCode, action: &str) -> Response {
    match state.jwt_service.generate_access_token(user.id) {
        Ok(token) => (status, Json(TokenResponse::bearer(token, user.into()))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                &format!("An error occurred during {action}"),
            )
        }
    }
}

/// POST /auth/register - Create an account and return a token.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    let email = normalize_email(&payload.email);
    if !is_plausible_email(&email) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "A valid email address is required",
        );
    }
    let name = payload.name.trim();
    if name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", "Name is required");
    }
    if let Err(e) = check_new_password(&payload.password) {
        return error_response(StatusCode::BAD_REQUEST, "validation_error", &e.to_string());
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&email).await {
        Ok(true) => return email_taken(),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred during registration",
            );
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred during registration",
            );
        }
    };

    let user = match user_repo.create(&email, name, &password_hash).await {
        Ok(u) => u,
        // Lost a race with a concurrent registration for the same email.
        Err(e) if is_unique_violation(&e) => return email_taken(),
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred during registration",
            );
        }
    };

    info!(user_id = %user.id, "New user registered");
    issue_token(&state, user, StatusCode::CREATED, "registration")
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// POST /auth/login - Authenticate and return a token.
async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    let email = normalize_email(&payload.email);
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!("Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred during login",
            );
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(user_id = %user.id, error = %e, "Password verification error");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred during login",
            );
        }
    }

    info!(user_id = %user.id, "User logged in");
    issue_token(&state, user, StatusCode::OK, "login")
}

/// GET /auth/me - The authenticated user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Response {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(auth.user_id().into_inner()).await {
        Ok(Some(user)) => Json(UserInfo::from(user)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "User not found"),
        Err(e) => {
            error!(error = %e, "Database error loading user");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An error occurred loading the user",
            )
        }
    }
}
