//! API error taxonomy and response mapping.
//!
//! # Design Decisions
//! - Error bodies are always `{"detail": <message>}`, the contract the
//!   existing clients parse
//! - Authentication failures carry `WWW-Authenticate: Bearer`
//! - Internal failures are logged in full but reported to clients with a
//!   generic detail

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::token::AuthError;

/// Errors a request handler can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Entity lookup by id failed.
    #[error("{what} with id {id} not found")]
    NotFound { what: &'static str, id: i64 },

    /// Authentication or authorization failed.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// The account behind a valid token is disabled.
    #[error("Inactive user")]
    InactiveUser,

    /// Unique constraint would be violated.
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// The request parsed but its content is unusable.
    #[error("{0}")]
    Unprocessable(String),

    /// Token verification or signing failed.
    #[error(transparent)]
    Token(#[from] AuthError),

    /// Query execution failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed.
    #[error("password hashing error")]
    Password(#[from] bcrypt::BcryptError),
}

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::Token(AuthError::InvalidToken) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InactiveUser => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUsername(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Token(AuthError::Signing(_))
            | ApiError::Database(_)
            | ApiError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match &self {
            ApiError::Database(source) => {
                tracing::error!(error = %source, "Database failure");
                "internal server error".to_string()
            }
            ApiError::Password(source) => {
                tracing::error!(error = %source, "Password hashing failure");
                "internal server error".to_string()
            }
            ApiError::Token(AuthError::Signing(source)) => {
                tracing::error!(error = %source, "Token signing failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
