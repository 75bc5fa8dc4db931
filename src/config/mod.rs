//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, SECRET_KEY env override)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - One file drives both binaries: `pos-server` reads the listener,
//!   database and auth sections, `pos-provision` additionally reads the
//!   provisioning target state

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AuthConfig;
pub use schema::DatabaseConfig;
pub use schema::ListenerConfig;
pub use schema::ProvisionConfig;
pub use schema::ServerConfig;
