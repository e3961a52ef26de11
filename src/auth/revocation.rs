use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::Utc;

/// Token ids that were rotated out before their natural expiry.
///
/// Entries are kept only until the token would have expired anyway and are
/// pruned on every insert. The list lives in process memory, so a restart
/// forgets it.
#[derive(Debug, Default)]
pub struct RevocationList {
    entries: RwLock<HashMap<String, i64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes `jti` until `exp`. Returns false when it was already revoked.
    pub fn revoke(&self, jti: &str, exp: i64) -> bool {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(jti.to_string(), exp).is_none()
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(jti)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
