//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal or programmatic trigger → broadcast
//!     → server stops accepting, drains in-flight requests, exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; anything long-running subscribes
//! - Tests drive shutdown through the same trigger the signals use

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
