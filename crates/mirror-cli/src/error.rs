//! Error types for mirror-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from mirror-core
    #[error(transparent)]
    Core(#[from] mirror_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// A hint printed after the error, for errors the operator must act on.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Core(mirror_core::Error::PendingBackups { .. }) => {
                Some("review them, then run `mirror backups --clean` or `mirror backups --restore`")
            }
            Self::Core(mirror_core::Error::UnknownSource { .. }) => {
                Some("run `mirror sources` to list the available sources")
            }
            _ => None,
        }
    }
}
