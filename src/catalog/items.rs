//! Item CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::catalog::tree::{build_tree, TreeNode};
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

/// A sellable item.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}

/// Body of `POST /item`.
#[derive(Debug, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Query parameters of `PUT /item/{id}`.
#[derive(Debug, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub category: Option<String>,
}

/// `POST /item` — create an item.
pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<ItemCreate>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = sqlx::query_as::<_, Item>(
        "INSERT INTO item (name, category) VALUES (?, ?) RETURNING id, name, category",
    )
    .bind(&payload.name)
    .bind(&payload.category)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /item/{id}` — read one item.
pub async fn read(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Item>> {
    let item = sqlx::query_as::<_, Item>("SELECT id, name, category FROM item WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound { what: "item", id })?;

    Ok(Json(item))
}

/// `PUT /item/{id}` — rename an item; the category is only replaced when
/// one is supplied.
pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Query(payload): Query<ItemUpdate>,
) -> ApiResult<Json<Item>> {
    let item = sqlx::query_as::<_, Item>(
        "UPDATE item SET name = ?, category = COALESCE(?, category) WHERE id = ? \
         RETURNING id, name, category",
    )
    .bind(&payload.name)
    .bind(&payload.category)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound { what: "item", id })?;

    Ok(Json(item))
}

/// `DELETE /item/{id}` — remove an item.
pub async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM item WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound { what: "item", id });
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /item` — list all items.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Item>>> {
    let items = sqlx::query_as::<_, Item>("SELECT id, name, category FROM item ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(items))
}

/// `GET /item/tree` — items grouped by category path.
pub async fn tree(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<TreeNode>> {
    let rows: Vec<(i64, Option<String>)> =
        sqlx::query_as("SELECT id, category FROM item ORDER BY id")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(build_tree(&rows)))
}
