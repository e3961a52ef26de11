use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::FileRecord;
use crate::state::AppState;

/// GET /files/:id
pub async fn file_show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FileRecord> {
    let file = state.files.find_by_id(&id).await?;
    Ok(ApiResponse::success(file))
}
