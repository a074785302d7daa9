use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors that do not map to a more specific kind.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// The directory does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The directory exists but cannot be listed.
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The path exists but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The log subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The OS refused to register a change watch.
    #[error("Cannot watch {}: {source}", path.display())]
    WatchSetup {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The default application could not be launched.
    #[error("Cannot open {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A click referred to an entry that is no longer displayed.
    #[error("Entry is no longer in the current listing")]
    StaleEntry,
}

impl AppError {
    /// Classify an I/O error raised while reading `path`.
    pub fn from_read(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => AppError::PermissionDenied(path),
            _ => AppError::Io(err),
        }
    }
}
