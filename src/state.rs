use std::sync::Arc;

use crate::auth::{AccessGuard, RevocationList, TokenCodec, TokenService};
use crate::config::{AppConfig, ConfigError};
use crate::routes;
use crate::services::{FileService, LibraryService};

/// Shared, immutable-after-startup application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub guard: Arc<AccessGuard>,
    pub libraries: Arc<LibraryService>,
    pub files: Arc<FileService>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let codec = Arc::new(TokenCodec::from_config(&config.security.jwt)?);
        let revocations = Arc::new(RevocationList::new());

        let tokens = TokenService::new(&config.security, codec.clone(), revocations.clone());
        let registry = routes::access_registry(&config.http.global_prefix);
        tracing::debug!(routes = registry.route_count(), "Route access registry built");
        let guard = AccessGuard::new(codec, registry, revocations);

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            guard: Arc::new(guard),
            libraries: Arc::new(LibraryService::new()),
            files: Arc::new(FileService::new()),
        })
    }
}
