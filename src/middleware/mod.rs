pub mod auth;
pub mod response;

pub use auth::{access_guard_middleware, Caller};
pub use response::{ApiResponse, ApiResult};
