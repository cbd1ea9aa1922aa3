use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        claims::Claims,
        dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse},
        extractors::{AuthUser, JsonBody},
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthError> {
    let user = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { user })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let auth_token = state.auth.login(payload).await?;
    Ok(Json(LoginResponse { auth_token }))
}

/// Echoes the claims of a valid token back to the caller.
#[instrument(skip_all)]
pub async fn verify(AuthUser(claims): AuthUser) -> Json<Claims> {
    info!(user_id = %claims.id, "token verified");
    Json(claims)
}
