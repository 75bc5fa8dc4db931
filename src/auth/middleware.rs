//! Request authentication.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// The authenticated user behind the current request.
///
/// Extracting this from a request verifies the bearer token, loads the
/// user row, and rejects disabled accounts. Handlers that need
/// authentication simply take it as an argument.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: bool,
    pub is_superuser: bool,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Could not validate credentials"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Could not validate credentials"))?;

        let claims = state.tokens.verify(token)?;

        let user = sqlx::query_as::<_, CurrentUser>(
            "SELECT id, username, email, full_name, disabled, is_superuser \
             FROM user WHERE username = ?",
        )
        .bind(&claims.sub)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::Unauthorized("Could not validate credentials"))?;

        if user.disabled {
            return Err(ApiError::InactiveUser);
        }

        Ok(user)
    }
}

/// Guard for routes restricted to superusers. The message matches the
/// one clients have relied on since user management was added.
pub fn require_superuser(user: &CurrentUser) -> Result<(), ApiError> {
    if !user.is_superuser {
        return Err(ApiError::Unauthorized(
            "You are unauthorised to create a new user.",
        ));
    }
    Ok(())
}
