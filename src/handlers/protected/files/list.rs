use axum::extract::{rejection::QueryRejection, Query, State};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::file_service::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::services::{FilePage, FileQuery};
use crate::state::AppState;
use crate::validation::Validator;

/// GET /files - One page of the file catalogue
///
/// Query: `page` (from 0), `size` (10-50), `order` (`NAME`, `SIZE`,
/// `CREATED_AT`, `UPDATED_AT`), `direction` (`ASC`, `DESC`), `name` filter.
pub async fn file_list(
    State(state): State<AppState>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> ApiResult<FilePage> {
    let Query(query) =
        query.map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))?;

    let mut validator = Validator::new();
    validator
        .field("size")
        .range(u64::from(query.size), u64::from(MIN_PAGE_SIZE), u64::from(MAX_PAGE_SIZE))
        .done();
    validator.finish().map_err(ApiError::validation_failed)?;

    Ok(ApiResponse::success(state.files.find_all(&query).await))
}
