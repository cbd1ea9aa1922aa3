use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Input rejected before any store access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingField(&'static str),
    #[error("Provide a valid email address.")]
    InvalidEmail,
    #[error(
        "Password must have at least 6 characters and contain at least one number, \
         one lowercase and one uppercase letter."
    )]
    WeakPassword,
    #[error("Provide a JSON request body.")]
    MalformedBody,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("User already exists.")]
    UserExists,
    #[error("Unable to authenticate the user")]
    AuthenticationFailed,
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::UserExists => StatusCode::BAD_REQUEST,
            AuthError::AuthenticationFailed | AuthError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal causes are logged where they happen; the client gets a fixed message.
        let message = match &self {
            AuthError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Logs an internal failure with its context and wraps it for the caller.
pub(crate) fn internal(what: &'static str) -> impl FnOnce(anyhow::Error) -> AuthError {
    move |e| {
        tracing::error!(error = %e, "{what} failed");
        AuthError::Internal(e.context(what))
    }
}
