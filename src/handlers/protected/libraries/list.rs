use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Library;
use crate::state::AppState;

/// GET /libraries - All libraries, oldest first
pub async fn library_list(State(state): State<AppState>) -> ApiResult<Vec<Library>> {
    Ok(ApiResponse::success(state.libraries.find_all().await))
}
