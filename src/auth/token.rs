//! Access token issuing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Errors that can occur while handling access tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token is missing, malformed, expired, or has a bad signature.
    /// One message for every failure mode so callers cannot probe which
    /// check failed.
    #[error("Could not validate credentials")]
    InvalidToken,

    /// Signing a new token failed.
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Body returned by `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expiry: DateTime<Utc>,
}

/// Issues and verifies access tokens with a shared HMAC secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, expiry_mins: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::minutes(expiry_mins),
        }
    }

    /// Issue a token for `username`, expiring after the configured
    /// lifetime.
    pub fn issue(&self, username: &str) -> Result<TokenResponse, AuthError> {
        let expiry = Utc::now() + self.expiry;
        let claims = Claims {
            sub: username.to_string(),
            exp: expiry.timestamp(),
        };
        let access_token =
            encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(AuthError::Signing)?;
        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expiry,
        })
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(ALGORITHM))
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_verify_roundtrip() {
        let signer = TokenSigner::new(SECRET, 60);
        let token = signer.issue("josh").unwrap();
        assert_eq!(token.token_type, "bearer");
        assert!(token.expiry > Utc::now());

        let claims = signer.verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, "josh");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenSigner::new(SECRET, 60);
        let other = TokenSigner::new("another-secret-another-secret-ab", 60);
        let token = signer.issue("josh").unwrap();
        assert!(other.verify(&token.access_token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expired well past the default verification leeway.
        let signer = TokenSigner::new(SECRET, -10);
        let token = signer.issue("josh").unwrap();
        assert!(signer.verify(&token.access_token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = TokenSigner::new(SECRET, 60);
        assert!(signer.verify("not-a-token").is_err());
    }
}
