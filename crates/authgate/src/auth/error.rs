//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication errors.
///
/// Each variant maps to a fixed HTTP status, error code and client message.
/// Codes and messages are matched on by clients and must not change.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("authorization token not provided")]
    TokenMissing,

    /// Token rejected by the verifier (malformed, expired, wrong signer).
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// Token is valid but no local account exists for its subject.
    #[error("user not found")]
    UserNotFound,

    /// Account exists but has been deactivated.
    #[error("account is inactive")]
    AccountInactive,

    /// Verifier or account store failure.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status for this rejection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TokenMissing | AuthError::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::AccountInactive => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "TOKEN_MISSING",
            AuthError::TokenInvalid(_) => "TOKEN_INVALID",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::Internal(_) => "AUTH_ERROR",
        }
    }

    /// Client-facing message. Never includes error details.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "Authorization token not provided",
            AuthError::TokenInvalid(_) => "Invalid or expired token. Please login again.",
            AuthError::UserNotFound => "User not found. Please complete registration.",
            AuthError::AccountInactive => "Account is inactive. Please contact support.",
            AuthError::Internal(_) => "Authentication failed. Please try again.",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_code: String,
}

impl From<&AuthError> for AuthErrorResponse {
    fn from(err: &AuthError) -> Self {
        Self {
            success: false,
            message: err.message().to_string(),
            error_code: err.error_code().to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorResponse::from(&self));
        (self.status_code(), body).into_response()
    }
}
