//! Filesystem operations
//!
//! Handles file and directory operations for the dist and staging trees.

use std::path::Path;

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

/// Delete a directory if present and create it empty
pub fn recreate_dir(path: &Path) -> Result<(), FilesystemError> {
    remove_dir_all(path)?;
    create_dir_all(path)
}

/// Copy a single file, creating the destination's parent directories
///
/// Permission bits travel with the copy.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map_err(|e| FilesystemError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(())
}

/// Recursively copy a directory tree
///
/// Symlinks are not followed.
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    create_dir_all(to)?;

    for entry in walkdir::WalkDir::new(from).follow_links(false).min_depth(1) {
        let entry = entry.map_err(|e| FilesystemError::ReadDir {
            path: from.to_path_buf(),
            error: e.to_string(),
        })?;

        // walkdir only yields paths under `from`
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}
