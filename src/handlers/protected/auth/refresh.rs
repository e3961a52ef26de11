// handlers/protected/auth/refresh.rs - POST /auth/refresh handler

use axum::extract::State;

use crate::auth::TokenPair;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::state::AppState;

/// POST /auth/refresh - Rotate the token pair
///
/// Requires a refresh token (`REFRESH` authority). An access token is
/// rejected by the guard with 403 before this runs.
pub async fn refresh_post(State(state): State<AppState>, caller: Caller) -> ApiResult<TokenPair> {
    let pair = state.tokens.refresh(&caller.0)?;
    Ok(ApiResponse::success(pair))
}
