//! Wire and row types for the sales subsystem.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;

/// One stock movement line of a transaction.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockLine {
    pub id: i64,
    pub item_id: i64,
    pub store_id: i64,
    pub transaction_id: i64,
    pub quantity: i64,
}

/// The composed transaction view returned by the API.
///
/// `store_id` is taken from the first line; it is `null` for a
/// transaction without lines.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub id: i64,
    pub datetime: DateTime<Utc>,
    pub store_id: Option<i64>,
    pub price: i64,
    pub items: Vec<StockLine>,
}

/// One line of a transaction create/update request.
#[derive(Debug, Deserialize)]
pub struct LineCreate {
    pub item_id: i64,
    pub quantity: i64,
}

/// Body of `POST /transaction`.
#[derive(Debug, Deserialize)]
pub struct TransactionCreate {
    pub store_id: i64,
    pub price: i64,
    pub items: Vec<LineCreate>,
}

/// Body of `PUT /transaction/{id}`. Absent fields keep their value;
/// `items`, when present, replaces every line.
#[derive(Debug, Deserialize)]
pub struct TransactionUpdate {
    pub store_id: Option<i64>,
    pub price: Option<i64>,
    pub items: Option<Vec<LineCreate>>,
}

/// Query parameters of the transaction reporting endpoint. Dates arrive
/// as strings so a malformed one maps to 422 with a useful detail
/// instead of a bare query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    pub store_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::Unprocessable(format!("invalid date '{raw}', expected YYYY-MM-DD"))
    })
}

/// UTC midnight at the start of a calendar day, the boundary used by the
/// date filters.
pub fn day_start_utc(day: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(day.and_time(NaiveTime::MIN), Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_date_accepts_calendar_days() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_day_start_is_midnight_utc() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = day_start_utc(day);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }
}
