//! Transaction handlers, including the filtered reporting endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::auth::CurrentUser;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::sales::types::{
    day_start_utc, parse_date, StockLine, TransactionCreate, TransactionFilter,
    TransactionUpdate, TransactionView,
};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    datetime: DateTime<Utc>,
    price: i64,
}

async fn fetch_lines(db: &SqlitePool, transaction_id: i64) -> Result<Vec<StockLine>, sqlx::Error> {
    sqlx::query_as::<_, StockLine>(
        "SELECT id, item_id, store_id, transaction_id, quantity \
         FROM stock WHERE transaction_id = ? ORDER BY id",
    )
    .bind(transaction_id)
    .fetch_all(db)
    .await
}

/// Compose the API view of one transaction row.
async fn load_view(db: &SqlitePool, id: i64) -> ApiResult<TransactionView> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"SELECT id, datetime, price FROM "transaction" WHERE id = ?"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(ApiError::NotFound {
        what: "transaction",
        id,
    })?;

    let items = fetch_lines(db, row.id).await?;
    Ok(TransactionView {
        id: row.id,
        datetime: row.datetime,
        store_id: items.first().map(|line| line.store_id),
        price: row.price,
        items,
    })
}

/// `POST /transaction` — record a sale.
///
/// The sale row and every stock line commit together; a failed line
/// insert rolls the whole sale back.
pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<TransactionCreate>,
) -> ApiResult<(StatusCode, Json<TransactionView>)> {
    let now = Utc::now();

    let mut tx = state.db.begin().await?;
    let id: i64 = sqlx::query_scalar(
        r#"INSERT INTO "transaction" (datetime, price) VALUES (?, ?) RETURNING id"#,
    )
    .bind(now)
    .bind(payload.price)
    .fetch_one(&mut *tx)
    .await?;

    for line in &payload.items {
        sqlx::query(
            "INSERT INTO stock (item_id, store_id, transaction_id, quantity) VALUES (?, ?, ?, ?)",
        )
        .bind(line.item_id)
        .bind(payload.store_id)
        .bind(id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::debug!(transaction_id = id, lines = payload.items.len(), "Sale recorded");
    let view = load_view(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /transaction/{id}` — read one transaction.
pub async fn read(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<TransactionView>> {
    Ok(Json(load_view(&state.db, id).await?))
}

/// `PUT /transaction/{id}` — amend the price and/or replace every stock
/// line.
pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionUpdate>,
) -> ApiResult<Json<TransactionView>> {
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, TransactionRow>(
        r#"SELECT id, datetime, price FROM "transaction" WHERE id = ?"#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound {
        what: "transaction",
        id,
    })?;

    let price = payload.price.unwrap_or(existing.price);
    sqlx::query(r#"UPDATE "transaction" SET price = ? WHERE id = ?"#)
        .bind(price)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if let Some(lines) = &payload.items {
        let previous_store: Option<i64> = sqlx::query_scalar(
            "SELECT store_id FROM stock WHERE transaction_id = ? ORDER BY id LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let store_id = payload.store_id.or(previous_store).ok_or_else(|| {
            ApiError::Unprocessable(
                "store_id is required when replacing the lines of a transaction with none"
                    .to_string(),
            )
        })?;

        sqlx::query("DELETE FROM stock WHERE transaction_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for line in lines {
            sqlx::query(
                "INSERT INTO stock (item_id, store_id, transaction_id, quantity) VALUES (?, ?, ?, ?)",
            )
            .bind(line.item_id)
            .bind(store_id)
            .bind(id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(Json(load_view(&state.db, id).await?))
}

/// `DELETE /transaction/{id}` — remove a transaction and its lines.
pub async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM stock WHERE transaction_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query(r#"DELETE FROM "transaction" WHERE id = ?"#)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            what: "transaction",
            id,
        });
    }

    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /transaction` — the reporting endpoint.
///
/// Every filter is optional and they combine with AND: `start_date`
/// inclusive, `end_date` exclusive, price bounds inclusive, and
/// `store_id` matching any line without duplicating the transaction.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<TransactionFilter>,
) -> ApiResult<Json<Vec<TransactionView>>> {
    let mut query = QueryBuilder::<Sqlite>::new(
        r#"SELECT id, datetime, price FROM "transaction" WHERE 1 = 1"#,
    );

    if let Some(min_price) = filter.min_price {
        query.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(raw) = &filter.start_date {
        let start = day_start_utc(parse_date(raw)?);
        query.push(" AND datetime >= ").push_bind(start);
    }
    if let Some(raw) = &filter.end_date {
        let end = day_start_utc(parse_date(raw)?);
        query.push(" AND datetime < ").push_bind(end);
    }
    if let Some(store_id) = filter.store_id {
        query
            .push(
                r#" AND EXISTS (SELECT 1 FROM stock
                     WHERE stock.transaction_id = "transaction".id
                       AND stock.store_id = "#,
            )
            .push_bind(store_id)
            .push(")");
    }
    query.push(" ORDER BY id");

    let rows: Vec<TransactionRow> = query.build_query_as().fetch_all(&state.db).await?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        let items = fetch_lines(&state.db, row.id).await?;
        views.push(TransactionView {
            id: row.id,
            datetime: row.datetime,
            store_id: items.first().map(|line| line.store_id),
            price: row.price,
            items,
        });
    }

    Ok(Json(views))
}
