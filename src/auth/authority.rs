use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named permission carried by a token and required by routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    FileManagement,
    LibraryManagement,
    Refresh,
}

impl Authority {
    /// Authorities granted to access tokens.
    pub const BUSINESS: [Authority; 2] = [Authority::FileManagement, Authority::LibraryManagement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::FileManagement => "FILE_MANAGEMENT",
            Authority::LibraryManagement => "LIBRARY_MANAGEMENT",
            Authority::Refresh => "REFRESH",
        }
    }

    pub fn business() -> BTreeSet<Authority> {
        Self::BUSINESS.into_iter().collect()
    }

    pub fn refresh_only() -> BTreeSet<Authority> {
        BTreeSet::from([Authority::Refresh])
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
