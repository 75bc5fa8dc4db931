//! Store CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

/// A physical store, referenced by transactions.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: i64,
    pub name: String,
}

/// Body of `POST /store`.
#[derive(Debug, Deserialize)]
pub struct StoreCreate {
    pub name: String,
}

/// Query parameters of `PUT /store/{id}`.
#[derive(Debug, Deserialize)]
pub struct StoreUpdate {
    pub name: String,
}

/// `POST /store` — create a store.
pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<StoreCreate>,
) -> ApiResult<(StatusCode, Json<Store>)> {
    let store =
        sqlx::query_as::<_, Store>("INSERT INTO store (name) VALUES (?) RETURNING id, name")
            .bind(&payload.name)
            .fetch_one(&state.db)
            .await?;

    Ok((StatusCode::CREATED, Json(store)))
}

/// `GET /store/{id}` — read one store.
pub async fn read(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Store>> {
    let store = sqlx::query_as::<_, Store>("SELECT id, name FROM store WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound { what: "store", id })?;

    Ok(Json(store))
}

/// `PUT /store/{id}` — rename a store.
pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Query(payload): Query<StoreUpdate>,
) -> ApiResult<Json<Store>> {
    let store = sqlx::query_as::<_, Store>(
        "UPDATE store SET name = ? WHERE id = ? RETURNING id, name",
    )
    .bind(&payload.name)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound { what: "store", id })?;

    Ok(Json(store))
}

/// `DELETE /store/{id}` — remove a store.
pub async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM store WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound { what: "store", id });
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /store` — list all stores.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Store>>> {
    let stores = sqlx::query_as::<_, Store>("SELECT id, name FROM store ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(stores))
}
