// handlers/protected/libraries/mod.rs - Library management
//
// The whole controller requires LIBRARY_MANAGEMENT.

pub mod create;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

pub use create::library_create;
pub use delete::library_delete;
pub use list::library_list;
pub use show::library_show;
pub use update::library_update;
