//! POS backend and host provisioning.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌────────────────────────────────────────────────┐
//!                   │                  POS SERVER                     │
//!                   │                                                 │
//!   Client Request  │  ┌─────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ────────────────┼─▶│  http   │──▶│   auth   │──▶│  handlers   │  │
//!                   │  │ router  │   │ extractor│   │ users/item/ │  │
//!                   │  └─────────┘   └──────────┘   │ store/sales │  │
//!                   │                                └──────┬──────┘  │
//!                   │                                       │         │
//!                   │                                       ▼         │
//!   Client Response │                                ┌─────────────┐  │
//!   ◀───────────────┼────────────────────────────────│  db (sqlx   │  │
//!                   │                                │   sqlite)   │  │
//!                   │                                └─────────────┘  │
//!                   │                                                 │
//!                   │  ┌───────────────────────────────────────────┐  │
//!                   │  │           Cross-Cutting Concerns           │  │
//!                   │  │  ┌────────┐ ┌───────────┐ ┌────────────┐  │  │
//!                   │  │  │ config │ │observa-   │ │ lifecycle  │  │  │
//!                   │  │  │        │ │ bility    │ │  shutdown  │  │  │
//!                   │  │  └────────┘ └───────────┘ └────────────┘  │  │
//!                   │  └───────────────────────────────────────────┘  │
//!                   └────────────────────────────────────────────────┘
//!
//!   pos-provision (bin) ──▶ provision: packages → port grant → launch
//!                           reconciles host state, then verifies GET /
//! ```

// Core subsystems
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod http;
pub mod sales;
pub mod users;

// Host provisioning
pub mod provision;

// Cross-cutting concerns
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
