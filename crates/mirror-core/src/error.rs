//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No source with this name is registered
    #[error("Unknown source: {name}")]
    UnknownSource { name: String },

    /// A source definition failed to compile
    #[error("Invalid source {name}: {message}")]
    InvalidSource { name: String, message: String },

    /// A file mask could not be parsed
    #[error("Invalid file mask {mask:?}: {message}")]
    InvalidMask { mask: String, message: String },

    /// A URL could not be parsed or resolved
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Mirror root is not usable
    #[error("Invalid mirror root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Leftover `.moved` backups block a new sync
    #[error(
        "{} leftover .moved file(s) under {root}; review and remove them before syncing",
        .files.len()
    )]
    PendingBackups { root: PathBuf, files: Vec<PathBuf> },

    /// Network failure fetching a page or file
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Server answered with a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A subdirectory reports a different revision than the root
    #[error("Revision mismatch at {url}: expected {expected}, found {found}")]
    RevisionMismatch {
        url: String,
        expected: String,
        found: String,
    },

    /// Error in ledger operations
    #[error("Ledger error at {path}: {message}")]
    Ledger { path: PathBuf, message: String },

    /// Configuration file problem
    #[error("Config error: {message}")]
    Config { message: String },

    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is one the operator must resolve by hand
    /// before retrying (as opposed to a transient fetch failure).
    pub fn needs_operator(&self) -> bool {
        matches!(
            self,
            Self::PendingBackups { .. }
                | Self::RevisionMismatch { .. }
                | Self::UnknownSource { .. }
                | Self::InvalidSource { .. }
        )
    }
}
