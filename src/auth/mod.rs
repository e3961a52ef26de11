//! Token issuance, verification and per-route access decisions.

pub mod authority;
pub mod claims;
pub mod codec;
pub mod guard;
pub mod revocation;
pub mod route_access;
pub mod service;

pub use authority::Authority;
pub use claims::{TokenPair, TokenPayload};
pub use codec::{SignOptions, TokenCodec};
pub use guard::{extract_bearer, AccessGuard, Admission};
pub use revocation::RevocationList;
pub use route_access::{AccessRequirement, RouteAccess, RouteAccessRegistry};
pub use service::TokenService;

use thiserror::Error;

/// Failures raised by the access-control layer.
///
/// `Unauthorized` deliberately carries no detail: callers must not learn
/// which check rejected a credential or token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden resource")]
    Forbidden,

    #[error("token signing failed: {0}")]
    Signing(String),
}
