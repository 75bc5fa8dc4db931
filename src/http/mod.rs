//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, propagated to the response)
//!     → auth extractor (bearer token → CurrentUser)
//!     → handlers (users / catalog / sales)
//!     → error.rs (typed failures → status + {"detail": ...})
//! ```

pub mod error;
pub mod request;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
