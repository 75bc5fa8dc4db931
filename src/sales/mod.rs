//! Sales subsystem: transactions, their stock movement lines, and
//! recorded daily takings.
//!
//! # Data Flow
//! ```text
//! POST /transaction
//!     → one SQL transaction: insert sale row + all stock lines
//!     → composed view {id, datetime, store_id, price, items}
//!
//! GET /transaction?store_id&start_date&end_date&min_price&max_price
//!     → dynamically built filter query (the reporting endpoint)
//!
//! POST /total / GET /total
//!     → per-store daily takings, total always card + cash
//! ```
//!
//! # Design Decisions
//! - Prices are integer pennies end to end
//! - `start_date` is inclusive, `end_date` exclusive; both are calendar
//!   days interpreted as UTC midnight
//! - A store filter must not repeat a transaction that has several lines
//!   from that store

pub mod totals;
pub mod transactions;
pub mod types;

pub use types::{StockLine, TransactionView};
