use std::collections::BTreeSet;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::{AuthError, Authority, RevocationList, SignOptions, TokenCodec, TokenPair, TokenPayload};
use crate::config::{ExpiresIn, SecurityConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Access,
    Refresh,
}

/// The single configured admin identity.
struct RootCredentials {
    username: String,
    password: String,
}

impl RootCredentials {
    /// Both fields are compared as fixed-size digests and both comparisons
    /// always run, so timing does not depend on which one differs.
    fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = digest(username).as_slice().ct_eq(digest(&self.username).as_slice());
        let password_ok = digest(password).as_slice().ct_eq(digest(&self.password).as_slice());
        bool::from(username_ok & password_ok)
    }
}

fn digest(value: &str) -> sha2::digest::Output<Sha256> {
    Sha256::digest(value.as_bytes())
}

/// Mints token pairs. Nothing else in the crate signs tokens.
pub struct TokenService {
    codec: Arc<TokenCodec>,
    credentials: RootCredentials,
    access_expires_in: ExpiresIn,
    refresh_expires_in: ExpiresIn,
    revocations: Arc<RevocationList>,
    revoke_on_refresh: bool,
}

impl TokenService {
    pub fn new(
        config: &SecurityConfig,
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationList>,
    ) -> Self {
        Self {
            codec,
            credentials: RootCredentials {
                username: config.root_username.clone(),
                password: config.root_password.clone(),
            },
            access_expires_in: config.jwt.access_expires_in,
            refresh_expires_in: config.jwt.refresh_expires_in,
            revocations,
            revoke_on_refresh: config.jwt.revoke_on_refresh,
        }
    }

    /// Checks the admin credentials and returns a fresh token pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        if !self.credentials.matches(username, password) {
            tracing::warn!("Rejected token request with invalid credentials");
            return Err(AuthError::Unauthorized);
        }

        let pair = self.issue_pair()?;
        tracing::info!(subject = %self.credentials.username, "Issued token pair");
        Ok(pair)
    }

    /// Rotates the pair for a caller holding a refresh token.
    ///
    /// With revocation enabled the presented refresh token is retired, so a
    /// second refresh with the same token is rejected.
    pub fn refresh(&self, caller: &TokenPayload) -> Result<TokenPair, AuthError> {
        if !caller.has_authority(Authority::Refresh) {
            return Err(AuthError::Forbidden);
        }

        if self.revoke_on_refresh && !self.revocations.revoke(&caller.jti, caller.exp) {
            tracing::warn!(jti = %caller.jti, "Refresh token reused after rotation");
            return Err(AuthError::Unauthorized);
        }

        let pair = self.issue_pair()?;
        tracing::info!(subject = %self.credentials.username, rotated = %caller.jti, "Refreshed token pair");
        Ok(pair)
    }

    fn issue_pair(&self) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.sign(TokenKind::Access)?,
            refresh_token: self.sign(TokenKind::Refresh)?,
        })
    }

    fn sign(&self, kind: TokenKind) -> Result<String, AuthError> {
        let (authorities, expires_in): (BTreeSet<Authority>, ExpiresIn) = match kind {
            TokenKind::Access => (Authority::business(), self.access_expires_in),
            TokenKind::Refresh => (Authority::refresh_only(), self.refresh_expires_in),
        };

        let options = SignOptions {
            expires_in,
            subject: self.credentials.username.clone(),
            token_id: Uuid::new_v4().to_string(),
        };

        self.codec.issue(&authorities, &options).map_err(|e| {
            tracing::error!(error = %e, kind = ?kind, "Failed to sign token");
            e
        })
    }
}
