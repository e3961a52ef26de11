use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Library;
use crate::state::AppState;

/// GET /libraries/:id
pub async fn library_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Library> {
    let library = state.libraries.find_by_id(&id).await?;
    Ok(ApiResponse::success(library))
}
