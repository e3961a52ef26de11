use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{Authority, RouteAccess, RouteAccessRegistry};
use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::access_guard_middleware;
use crate::state::AppState;

const APP: &str = "app";
const AUTH: &str = "auth";
const FILES: &str = "files";
const LIBRARIES: &str = "libraries";

/// Access declarations for every route in [`app`]. Keep the two in step:
/// undeclared routes fall back to "authenticated, no authority".
pub fn access_registry(prefix: &str) -> RouteAccessRegistry {
    RouteAccessRegistry::builder()
        .prefix(prefix)
        .controller(APP, RouteAccess::public())
        .controller(FILES, RouteAccess::authorities([Authority::FileManagement]))
        .controller(LIBRARIES, RouteAccess::authorities([Authority::LibraryManagement]))
        // App
        .handler(APP, Method::GET, "/", RouteAccess::inherit())
        .handler(APP, Method::GET, "/health", RouteAccess::inherit())
        // Auth
        .handler(AUTH, Method::POST, "/auth/token", RouteAccess::public())
        .handler(AUTH, Method::POST, "/auth/refresh", RouteAccess::authorities([Authority::Refresh]))
        .handler(AUTH, Method::GET, "/auth/whoami", RouteAccess::inherit())
        // Files
        .handler(FILES, Method::GET, "/files", RouteAccess::inherit())
        .handler(FILES, Method::GET, "/files/:id", RouteAccess::inherit())
        // Libraries
        .handler(LIBRARIES, Method::GET, "/libraries", RouteAccess::inherit())
        .handler(LIBRARIES, Method::POST, "/libraries", RouteAccess::inherit())
        .handler(LIBRARIES, Method::GET, "/libraries/:id", RouteAccess::inherit())
        .handler(LIBRARIES, Method::PATCH, "/libraries/:id", RouteAccess::inherit())
        .handler(LIBRARIES, Method::DELETE, "/libraries/:id", RouteAccess::inherit())
        .build()
}

pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_routes())
        .merge(file_routes())
        .merge(library_routes())
        // The guard sees the matched route pattern, so it runs as a route layer
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            access_guard_middleware,
        ));

    let prefix = state.config.http.global_prefix.clone();
    let router = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    };

    router
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/auth/token", post(public::token_post))
        .route("/auth/refresh", post(auth::refresh_post))
        .route("/auth/whoami", get(auth::whoami_get))
}

fn file_routes() -> Router<AppState> {
    use protected::files;

    Router::new()
        .route("/files", get(files::file_list))
        .route("/files/:id", get(files::file_show))
}

fn library_routes() -> Router<AppState> {
    use protected::libraries;

    Router::new()
        .route(
            "/libraries",
            get(libraries::library_list).post(libraries::library_create),
        )
        .route(
            "/libraries/:id",
            get(libraries::library_show)
                .patch(libraries::library_update)
                .delete(libraries::library_delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.http.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .http
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
