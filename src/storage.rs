mod directory;
mod spec_file;

pub use directory::{Summary, collect_paths, convert_all, convert_directory};
pub use spec_file::{FileError, Outcome, convert_file, read_document, write_document};
