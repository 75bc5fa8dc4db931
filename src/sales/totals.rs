//! Daily takings records.
//!
//! A total is entered per store and day with the card/cash split; the
//! stored `total` column is always computed as `card + cash`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::sales::types::{day_start_utc, parse_date};

/// A recorded day of takings for one store.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Total {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub card: i64,
    pub cash: i64,
    pub total: i64,
    pub store_id: i64,
    pub transaction_count: i64,
}

/// Body of `POST /total`.
#[derive(Debug, Deserialize)]
pub struct TotalCreate {
    pub store_id: i64,
    pub date: NaiveDate,
    pub card: i64,
    pub cash: i64,
    pub transaction_count: i64,
}

/// Query parameters of `GET /total`.
#[derive(Debug, Default, Deserialize)]
pub struct TotalFilter {
    pub store_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `POST /total` — record a day's takings.
pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<TotalCreate>,
) -> ApiResult<(StatusCode, Json<Total>)> {
    if payload.card < 0 || payload.cash < 0 {
        return Err(ApiError::Unprocessable(
            "card and cash amounts must not be negative".to_string(),
        ));
    }
    if payload.transaction_count < 0 {
        return Err(ApiError::Unprocessable(
            "transaction_count must not be negative".to_string(),
        ));
    }

    let total = sqlx::query_as::<_, Total>(
        "INSERT INTO total (date, card, cash, total, store_id, transaction_count) \
         VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, date, card, cash, total, store_id, transaction_count",
    )
    .bind(day_start_utc(payload.date))
    .bind(payload.card)
    .bind(payload.cash)
    .bind(payload.card + payload.cash)
    .bind(payload.store_id)
    .bind(payload.transaction_count)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(total)))
}

/// `GET /total` — list recorded takings, optionally restricted by store
/// and date range (same boundary semantics as the transaction filters).
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<TotalFilter>,
) -> ApiResult<Json<Vec<Total>>> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, date, card, cash, total, store_id, transaction_count FROM total WHERE 1 = 1",
    );

    if let Some(store_id) = filter.store_id {
        query.push(" AND store_id = ").push_bind(store_id);
    }
    if let Some(raw) = &filter.start_date {
        let start = day_start_utc(parse_date(raw)?);
        query.push(" AND date >= ").push_bind(start);
    }
    if let Some(raw) = &filter.end_date {
        let end = day_start_utc(parse_date(raw)?);
        query.push(" AND date < ").push_bind(end);
    }
    query.push(" ORDER BY date, store_id");

    let totals: Vec<Total> = query.build_query_as().fetch_all(&state.db).await?;
    Ok(Json(totals))
}
