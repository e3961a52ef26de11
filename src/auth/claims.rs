use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Authority;

/// Verified contents of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub authorities: BTreeSet<Authority>,
}

impl TokenPayload {
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }

    /// True when at least one of `required` is held.
    pub fn has_any(&self, required: &BTreeSet<Authority>) -> bool {
        !self.authorities.is_disjoint(required)
    }
}

/// Access/refresh pair returned by `/auth/token` and `/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
