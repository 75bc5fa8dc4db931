//! TLS configuration and certificate loading.

use std::io::BufReader;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::schema::TlsConfig;

/// Load TLS material described by the config.
///
/// The certificate chain is parsed up front so a bad PEM fails with a
/// readable error at startup instead of on the first handshake. When a
/// CA chain is configured it is appended to the served chain.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, std::io::Error> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    let mut cert_pem = std::fs::read(cert_path)?;
    validate_pem(cert_path, &cert_pem)?;
    if let Some(ca_path) = &config.ca_path {
        let ca_pem = std::fs::read(ca_path)?;
        validate_pem(Path::new(ca_path), &ca_pem)?;
        cert_pem.extend_from_slice(b"\n");
        cert_pem.extend_from_slice(&ca_pem);
    }

    let key_pem = std::fs::read(key_path)?;

    RustlsConfig::from_pem(cert_pem, key_pem).await
}

/// Require at least one certificate in a PEM blob.
fn validate_pem(path: &Path, pem: &[u8]) -> Result<(), std::io::Error> {
    let mut reader = BufReader::new(pem);
    let certs: Result<Vec<_>, _> = rustls_pemfile::certs(&mut reader).collect();
    let certs = certs.map_err(|error| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: invalid PEM: {}", path.display(), error),
        )
    })?;
    if certs.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: no certificates found", path.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pem_rejects_empty() {
        let err = validate_pem(Path::new("cert.pem"), b"").unwrap_err();
        assert!(err.to_string().contains("no certificates"));
    }

    #[test]
    fn test_validate_pem_rejects_garbage() {
        let garbage = b"-----BEGIN CERTIFICATE-----\nnot base64!!\n-----END CERTIFICATE-----\n";
        assert!(validate_pem(Path::new("cert.pem"), garbage).is_err());
    }
}
