use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::state::AppState;

/// DELETE /libraries/:id
pub async fn library_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> ApiResult<()> {
    state.libraries.delete_by_id(&id).await?;
    tracing::info!(subject = caller.subject(), id = %id, "Library deleted");
    Ok(ApiResponse::<()>::no_content())
}
