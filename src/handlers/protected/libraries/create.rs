use axum::{body::Bytes, extract::State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::services::Library;
use crate::state::AppState;
use crate::validation::{check_directory_path, check_library_name, Validator};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateLibraryRequest {
    pub name: String,
    pub path: String,
}

/// POST /libraries - Register a new library root
///
/// 201 with the created library, 409 when the path is already registered.
pub async fn library_create(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> ApiResult<Library> {
    let request: CreateLibraryRequest = parse_json_body(&body)?;

    let mut validator = Validator::new();
    check_library_name(&mut validator, "name", &request.name);
    check_directory_path(&mut validator, "path", &request.path);
    validator.finish().map_err(ApiError::validation_failed)?;

    let library = state.libraries.create(&request.name, &request.path).await?;
    tracing::info!(subject = caller.subject(), id = %library.id, path = %library.path, "Library created");
    Ok(ApiResponse::created(library))
}
