// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and service liveness. Declared public in the access
// registry, so the guard never looks at the Authorization header here.

pub mod auth;
pub mod system;

pub use auth::token_post;
pub use system::{health, root};
