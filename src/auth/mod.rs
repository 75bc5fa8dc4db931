//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /token:
//!     form credentials → password.rs (bcrypt verify)
//!     → token.rs (signed access token, sub + exp)
//!
//! Authenticated request:
//!     Authorization: Bearer <token>
//!     → middleware.rs (CurrentUser extractor: verify token, load user,
//!       reject disabled accounts)
//!     → handler (require_superuser() where the route demands it)
//! ```
//!
//! # Design Decisions
//! - Tokens are stateless HS256 JWTs; revocation is by expiry only
//! - The superuser flag lives on the user row, not in the token, so a
//!   role change takes effect on the next request rather than the next
//!   login

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{require_superuser, CurrentUser};
pub use token::{AuthError, TokenResponse, TokenSigner};
