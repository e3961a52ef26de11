// handlers/public/auth/token.rs - POST /auth/token handler

use axum::{body::Bytes, extract::State};
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::handlers::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{check_password, check_username, Validator};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/token - Authenticate the admin user and receive a token pair
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output:
/// ```json
/// { "access_token": "eyJhbGciOiJIUzUxMiJ9...", "refresh_token": "eyJhbGciOiJIUzUxMiJ9..." }
/// ```
///
/// 400 when the body is malformed or fails validation, 401 when the
/// credentials do not match.
pub async fn token_post(State(state): State<AppState>, body: Bytes) -> ApiResult<TokenPair> {
    let request: TokenRequest = parse_json_body(&body)?;

    let mut validator = Validator::new();
    check_username(&mut validator, &request.username);
    check_password(&mut validator, &request.password);
    validator.finish().map_err(ApiError::validation_failed)?;

    let pair = state.tokens.authenticate(&request.username, &request.password)?;
    Ok(ApiResponse::success(pair))
}
