use std::path::Path;

use tracing::debug;

use crate::error::{AppError, Result};

/// Hands a file to an external program.
pub trait Launcher {
    /// Start the handler and return without waiting for it.
    fn launch(&self, path: &Path) -> Result<()>;
}

/// Opens files with the OS default application.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "opening with default application");
        open::that_detached(path).map_err(|source| AppError::Launch {
            path: path.to_path_buf(),
            source,
        })
    }
}
