//! User management.
//!
//! # Data Flow
//! ```text
//! POST /users (superuser) → bcrypt hash → INSERT → user view
//! GET  /users/me          → the extracted CurrentUser
//! GET  /users (superuser) → full listing
//!
//! Startup:
//!     empty user table + bootstrap credentials configured
//!     → create the first superuser
//! ```
//!
//! # Design Decisions
//! - Superuser is a column on the row, not a well-known username
//! - Accounts are created enabled; disabling is an operator action on
//!   the database, there is deliberately no self-service route for it

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::auth::{require_superuser, CurrentUser};
use crate::config::AuthConfig;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub is_superuser: bool,
}

/// `POST /users` — create an account. Superuser only.
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> ApiResult<Json<CurrentUser>> {
    require_superuser(&current_user)?;

    if payload.username.is_empty() {
        return Err(ApiError::Unprocessable("username must not be empty".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Unprocessable("password must not be empty".to_string()));
    }

    let hashed = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, CurrentUser>(
        "INSERT INTO user (username, email, full_name, hashed_password, disabled, is_superuser) \
         VALUES (?, ?, ?, ?, 0, ?) \
         RETURNING id, username, email, full_name, disabled, is_superuser",
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&payload.full_name)
    .bind(&hashed)
    .bind(payload.is_superuser)
    .fetch_one(&state.db)
    .await
    .map_err(|err| {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return ApiError::DuplicateUsername(payload.username.clone());
            }
        }
        ApiError::from(err)
    })?;

    tracing::info!(
        username = %user.username,
        is_superuser = user.is_superuser,
        created_by = %current_user.username,
        "User created"
    );
    Ok(Json(user))
}

/// `GET /users/me` — the profile behind the presented token.
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// `GET /users` — list all accounts. Superuser only.
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> ApiResult<Json<Vec<CurrentUser>>> {
    require_superuser(&current_user)?;

    let users = sqlx::query_as::<_, CurrentUser>(
        "SELECT id, username, email, full_name, disabled, is_superuser FROM user ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(users))
}

/// Create the first superuser when the user table is empty.
///
/// Without this there is no in-band way to obtain the superuser needed
/// to create further accounts.
pub async fn bootstrap_superuser(
    pool: &sqlx::SqlitePool,
    auth: &AuthConfig,
) -> ApiResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    if auth.bootstrap_password.is_empty() {
        tracing::warn!(
            "User table is empty and auth.bootstrap_password is not set; no superuser created"
        );
        return Ok(());
    }

    let hashed = hash_password(&auth.bootstrap_password)?;
    sqlx::query(
        "INSERT INTO user (username, email, full_name, hashed_password, disabled, is_superuser) \
         VALUES (?, NULL, NULL, ?, 0, 1)",
    )
    .bind(&auth.bootstrap_username)
    .bind(&hashed)
    .execute(pool)
    .await?;

    tracing::warn!(
        username = %auth.bootstrap_username,
        "Created bootstrap superuser; rotate its password after first login"
    );
    Ok(())
}
