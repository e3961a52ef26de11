// handlers/protected/auth/whoami.rs - GET /auth/whoami handler

use crate::auth::TokenPayload;
use crate::middleware::{ApiResponse, ApiResult, Caller};

/// GET /auth/whoami - Verified payload of the presented token
pub async fn whoami_get(caller: Caller) -> ApiResult<TokenPayload> {
    Ok(ApiResponse::success(caller.0))
}
