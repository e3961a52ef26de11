// handlers/protected/files/mod.rs - Read-only file catalogue
//
// The whole controller requires FILE_MANAGEMENT.

pub mod list;
pub mod show;

pub use list::file_list;
pub use show::file_show;
