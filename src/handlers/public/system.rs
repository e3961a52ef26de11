use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "FileBuddy API",
        "version": version,
        "endpoints": {
            "token": "POST /auth/token (public)",
            "refresh": "POST /auth/refresh (REFRESH)",
            "whoami": "GET /auth/whoami (authenticated)",
            "files": "GET /files[/:id] (FILE_MANAGEMENT)",
            "libraries": "/libraries[/:id] (LIBRARY_MANAGEMENT)",
            "health": "GET /health (public)",
        }
    }))
}

/// GET /health - liveness check
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}
