// handlers/mod.rs - Handlers grouped by access tier
//
// Public (no token) → Protected (bearer token, optionally an authority).
// The tiers are organisational only; what a route actually requires is
// declared in `routes::access_registry` and enforced by the access guard.

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod protected;
pub mod public;

/// Parses a JSON request body. An empty body yields `T::default()` so that
/// field validation can report every missing property.
pub(crate) fn parse_json_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}
