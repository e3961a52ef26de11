use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{Admission, AuthError, TokenPayload};
use crate::error::ApiError;
use crate::state::AppState;

/// Verified identity of the caller, available to handlers behind the guard.
#[derive(Clone, Debug)]
pub struct Caller(pub TokenPayload);

impl Caller {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenPayload>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| AuthError::Unauthorized.into())
    }
}

/// Access guard applied to every routed request.
///
/// Public routes pass straight through; everything else needs a valid bearer
/// token whose payload is stored in the request extensions.
pub async fn access_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let decision = state
        .guard
        .check(request.method(), &matched_path, request.headers());

    match decision {
        Ok(Admission::Public) => next.run(request).await,
        Ok(Admission::Authenticated(payload)) => {
            tracing::trace!(subject = %payload.sub, path = %matched_path, "Request admitted");
            request.extensions_mut().insert(payload);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(
                method = %request.method(),
                path = %matched_path,
                error = %err,
                "Request denied"
            );
            ApiError::from(err).into_response()
        }
    }
}
