use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, Result};
use crate::fs::entries::{Entry, EntryCollection};

/// List the immediate children of `path`.
///
/// The result is in raw enumeration order with the default view mode;
/// callers run `prepare` and carry the view preference forward themselves.
/// Children whose type cannot be determined are skipped.
pub fn read_path(path: &Path) -> Result<EntryCollection> {
    let metadata = fs::metadata(path).map_err(|e| AppError::from_read(path.to_path_buf(), e))?;
    if !metadata.is_dir() {
        return Err(AppError::NotADirectory(path.to_path_buf()));
    }

    let read_dir = fs::read_dir(path).map_err(|e| AppError::from_read(path.to_path_buf(), e))?;

    let mut entries = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(e) => {
                debug!(dir = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let child = path.join(dir_entry.file_name());
        match classify(&dir_entry) {
            Some(is_folder) => entries.push(Entry::new(child, is_folder)),
            None => debug!(path = %child.display(), "skipping entry of unknown type"),
        }
    }

    Ok(EntryCollection::new(path.to_path_buf(), entries))
}

/// Folder or file, following symlinks. A dangling link counts as a file.
fn classify(dir_entry: &fs::DirEntry) -> Option<bool> {
    let file_type = dir_entry.file_type().ok()?;
    if file_type.is_symlink() {
        return Some(
            fs::metadata(dir_entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false),
        );
    }
    Some(file_type.is_dir())
}
