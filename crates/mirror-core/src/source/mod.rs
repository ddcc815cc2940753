//! Remote source definitions
//!
//! A source describes how to scrape one kind of listing front-end: which
//! links are files, which are subdirectories, how a file's logical name is
//! derived from its link, and where the revision token lives on a page.

mod builtins;
mod definition;
mod registry;

pub use builtins::{BUILTIN_COUNT, builtin_definitions};
pub use definition::{DEFAULT_MTIME_FORMAT, RemoteSource, SourceDefinition};
pub use registry::SourceRegistry;
