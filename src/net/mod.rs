//! Network helpers: TLS material loading.

pub mod tls;
