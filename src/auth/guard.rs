use std::sync::Arc;

use axum::http::{header, HeaderMap, Method};

use super::{AccessRequirement, AuthError, RevocationList, RouteAccessRegistry, TokenCodec, TokenPayload};

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Public route; no identity was checked.
    Public,
    /// Verified caller, to be attached to the request.
    Authenticated(TokenPayload),
}

/// Per-request gate: resolves the route's requirement, verifies the bearer
/// token and checks authorities.
pub struct AccessGuard {
    codec: Arc<TokenCodec>,
    registry: RouteAccessRegistry,
    revocations: Arc<RevocationList>,
}

impl AccessGuard {
    pub fn new(
        codec: Arc<TokenCodec>,
        registry: RouteAccessRegistry,
        revocations: Arc<RevocationList>,
    ) -> Self {
        Self {
            codec,
            registry,
            revocations,
        }
    }

    /// Evaluates a request against the requirement declared for its route.
    pub fn check(
        &self,
        method: &Method,
        matched_path: &str,
        headers: &HeaderMap,
    ) -> Result<Admission, AuthError> {
        let requirement = self.registry.resolve(method, matched_path);
        self.evaluate(&requirement, headers)
    }

    pub fn evaluate(
        &self,
        requirement: &AccessRequirement,
        headers: &HeaderMap,
    ) -> Result<Admission, AuthError> {
        if requirement.public {
            return Ok(Admission::Public);
        }

        let token = extract_bearer(headers).ok_or_else(|| {
            tracing::debug!("Denied: missing or malformed bearer token");
            AuthError::Unauthorized
        })?;

        let payload = self.codec.verify(token)?;

        if self.revocations.is_revoked(&payload.jti) {
            tracing::debug!(jti = %payload.jti, "Denied: token was revoked");
            return Err(AuthError::Unauthorized);
        }

        if let Some(required) = &requirement.authorities {
            if !payload.has_any(required) {
                tracing::debug!(
                    subject = %payload.sub,
                    required = ?required,
                    held = ?payload.authorities,
                    "Denied: missing required authority"
                );
                return Err(AuthError::Forbidden);
            }
        }

        Ok(Admission::Authenticated(payload))
    }
}

/// Returns the token from `Authorization: Bearer <token>`, or `None` when the
/// header is absent, not `Bearer`, or does not hold exactly one token.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;

    if scheme != "Bearer" || token.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(token)
}
