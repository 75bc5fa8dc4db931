//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → access_log.rs (method, path, status, latency; one line each)
//!     → metrics.rs (counter + latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The access log uses the matched route template, not the raw path,
//!   so ids do not explode label cardinality
//! - Metrics are cheap (atomic increments); the exporter runs its own
//!   listener and never blocks request handling

pub mod access_log;
pub mod metrics;
