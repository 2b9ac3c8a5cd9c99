//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Replace a directory with a fresh, empty one
pub fn recreate_dir(path: &Path) -> Result<(), FilesystemError> {
    remove_dir_all(path)?;
    create_dir_all(path)
}

/// Resolve an existing path to its absolute form
pub fn absolute(path: &Path) -> Result<PathBuf, FilesystemError> {
    std::fs::canonicalize(path).map_err(|e| FilesystemError::Resolve {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Make a possibly non-existent path absolute against the current directory
pub fn lexically_absolute(path: &Path) -> Result<PathBuf, FilesystemError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| FilesystemError::Resolve {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}
