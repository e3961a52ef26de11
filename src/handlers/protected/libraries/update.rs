use axum::{
    body::Bytes,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::services::{Library, LibraryUpdate};
use crate::state::AppState;
use crate::validation::{check_directory_path, check_library_name, Validator};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateLibraryRequest {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// PATCH /libraries/:id - Rename and/or move a library
///
/// Absent fields are left unchanged.
pub async fn library_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
    body: Bytes,
) -> ApiResult<Library> {
    let request: UpdateLibraryRequest = parse_json_body(&body)?;

    let mut validator = Validator::new();
    if let Some(name) = &request.name {
        check_library_name(&mut validator, "name", name);
    }
    if let Some(path) = &request.path {
        check_directory_path(&mut validator, "path", path);
    }
    validator.finish().map_err(ApiError::validation_failed)?;

    let update = LibraryUpdate {
        name: request.name,
        path: request.path,
    };
    let library = state.libraries.update_by_id(&id, update).await?;
    tracing::info!(subject = caller.subject(), id = %library.id, "Library updated");
    Ok(ApiResponse::success(library))
}
