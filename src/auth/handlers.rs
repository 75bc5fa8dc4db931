//! Login endpoint.

use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;

use crate::auth::password::verify_password;
use crate::auth::token::TokenResponse;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

/// Form body of `POST /token` (OAuth2 password flow shape).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    username: String,
    hashed_password: String,
}

/// `POST /token` — exchange credentials for an access token.
///
/// Unknown users and bad passwords get the same response, so usernames
/// cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let row = sqlx::query_as::<_, CredentialRow>(
        "SELECT username, hashed_password FROM user WHERE username = ?",
    )
    .bind(&form.username)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::Unauthorized("Incorrect username or password"))?;

    if !verify_password(&form.password, &row.hashed_password) {
        return Err(ApiError::Unauthorized("Incorrect username or password"));
    }

    tracing::info!(username = %row.username, "Issued access token");
    Ok(Json(state.tokens.issue(&row.username)?))
}
