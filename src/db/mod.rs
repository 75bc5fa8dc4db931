//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     DatabaseConfig → connect() → SqlitePool
//!     → ensure_schema() (idempotent CREATE TABLE IF NOT EXISTS)
//!     → pool shared with all handlers via AppState
//! ```
//!
//! # Design Decisions
//! - Schema is applied on every boot; statements are idempotent so a
//!   restart against an existing database is a no-op
//! - Foreign keys are enforced at the connection level (off by default
//!   in SQLite)
//! - Monetary amounts are integers in pennies throughout

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;

/// Schema statements, one table each. `transaction` is quoted because it
/// is an SQL keyword.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS item (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS store (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "transaction" (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        datetime TEXT NOT NULL,
        price INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL REFERENCES item(id),
        store_id INTEGER NOT NULL REFERENCES store(id),
        transaction_id INTEGER NOT NULL REFERENCES "transaction"(id),
        quantity INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT,
        full_name TEXT,
        hashed_password TEXT NOT NULL,
        disabled INTEGER NOT NULL DEFAULT 0,
        is_superuser INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS total (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        card INTEGER NOT NULL,
        cash INTEGER NOT NULL,
        total INTEGER NOT NULL,
        store_id INTEGER NOT NULL REFERENCES store(id),
        transaction_count INTEGER NOT NULL
    )
    "#,
];

/// Open a connection pool against the configured database, creating the
/// file if it does not exist yet.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

/// Apply the schema. Safe to call on every boot.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(tables = SCHEMA.len(), "Schema ensured");
    Ok(())
}
