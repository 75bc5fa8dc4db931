//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the POS
//! server and its provisioning tool. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the POS server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, workers, TLS).
    pub listener: ListenerConfig,

    /// SQLite database settings.
    pub database: DatabaseConfig,

    /// Token signing and bootstrap credentials.
    pub auth: AuthConfig,

    /// Allowed CORS origins.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Host provisioning target state (read by `pos-provision`).
    pub provision: ProvisionConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080" for development,
    /// "0.0.0.0:80" for a provisioned host).
    pub bind_address: String,

    /// Runtime worker threads. The deployed service runs with a single
    /// worker; the async scheduler multiplexes requests within it.
    pub workers: usize,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            workers: 1,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,

    /// Optional path to the CA chain (PEM), served alongside the leaf.
    pub ca_path: Option<String>,
}

/// SQLite database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL (e.g., "sqlite://pos.db" or "sqlite::memory:").
    pub url: String,

    /// Maximum pool connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pos.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. Must be set; the `SECRET_KEY`
    /// environment variable overrides this field.
    pub secret: String,

    /// Access token lifetime in minutes. 12 hours covers a working day.
    pub token_expiry_mins: i64,

    /// Username for the superuser created when the user table is empty.
    pub bootstrap_username: String,

    /// Password for the bootstrap superuser. Leave empty to disable
    /// bootstrapping.
    pub bootstrap_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_expiry_mins: 60 * 12,
            bootstrap_username: "admin".to_string(),
            bootstrap_password: String::new(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
            ],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Host provisioning target state.
///
/// Describes what a correctly provisioned host looks like; `pos-provision`
/// reconciles the host against it. The grant port is taken from
/// `listener.bind_address`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Unprivileged user the service runs as and the port grant is
    /// assigned to.
    pub service_user: String,

    /// OS packages that must be installed.
    pub packages: Vec<String>,

    /// Directory holding authbind per-port permission markers.
    pub authbind_dir: String,

    /// Path of the server binary to launch under authbind.
    pub server_binary: String,

    /// Seconds to wait for the launched server to answer `GET /`.
    pub verify_timeout_secs: u64,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            service_user: "pos".to_string(),
            packages: vec!["authbind".to_string()],
            authbind_dir: "/etc/authbind/byport".to_string(),
            server_binary: "/usr/local/bin/pos-server".to_string(),
            verify_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.listener.workers, 1);
        assert!(config.listener.tls.is_none());
        assert_eq!(config.auth.token_expiry_mins, 720);
        assert_eq!(config.provision.packages, vec!["authbind".to_string()]);
        assert_eq!(config.provision.authbind_dir, "/etc/authbind/byport");
    }

    #[test]
    fn test_minimal_toml_gets_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [auth]
            secret = "0123456789abcdef0123456789abcdef"

            [listener]
            bind_address = "0.0.0.0:80"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:80");
        // Untouched sections fall back to defaults.
        assert_eq!(config.database.url, "sqlite://pos.db");
        assert_eq!(config.provision.service_user, "pos");
    }
}
