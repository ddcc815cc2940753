//! Filesystem primitives for the listing mirror
//!
//! Provides forward-slash path handling, staged (rename-based) file
//! replacement, and format-agnostic config storage.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::StagedFile;
pub use path::{NormalizedPath, validate_path_identifier};
