pub mod file_service;
pub mod library_service;

pub use file_service::{FileError, FilePage, FileQuery, FileRecord, FileService};
pub use library_service::{Library, LibraryError, LibraryService, LibraryUpdate};
