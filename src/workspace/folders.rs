//! Folder Management
//!
//! Create and rename folders inside the asset library. These exist so the
//! browser shell never manipulates paths itself; names are validated before
//! they ever touch the filesystem.

use std::path::{Path, PathBuf};

use crate::{HubError, HubResult};

/// Base name for newly created folders.
pub const NEW_FOLDER_BASE_NAME: &str = "NewFolder";

/// Create a new subfolder under `parent` with an unused default name.
///
/// Tries `NewFolder`, then `NewFolder_1`, `NewFolder_2`, and so on until a
/// free name is found. Returns the created path.
pub fn create_folder(parent: &Path) -> HubResult<PathBuf> {
    let mut candidate = parent.join(NEW_FOLDER_BASE_NAME);
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = parent.join(format!("{NEW_FOLDER_BASE_NAME}_{counter}"));
    }

    std::fs::create_dir(&candidate)?;
    Ok(candidate)
}

/// Rename `folder` to `new_name` within its parent directory.
///
/// Renaming to the current name is a no-op. Fails with
/// [`HubError::FolderExists`] when the target name is already taken, and
/// with [`HubError::InvalidFolderName`] when the name is empty or contains
/// path separators, traversal sequences, or control characters.
pub fn rename_folder(folder: &Path, new_name: &str) -> HubResult<PathBuf> {
    let name = validated_folder_name(new_name)?;

    let parent = folder.parent().ok_or_else(|| {
        HubError::Validation(format!("Cannot rename {}: no parent directory", folder.display()))
    })?;

    let target = parent.join(name);
    if target == folder {
        return Ok(target);
    }
    if target.exists() {
        return Err(HubError::FolderExists(target));
    }

    std::fs::rename(folder, &target)?;
    Ok(target)
}

/// Checks a folder name is a single safe path component.
fn validated_folder_name(name: &str) -> HubResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HubError::InvalidFolderName(
            "name is empty or contains only whitespace".to_string(),
        ));
    }
    if trimmed.contains("..")
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains(':')
    {
        return Err(HubError::InvalidFolderName(format!(
            "'{trimmed}' contains path separators or traversal sequences"
        )));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(HubError::InvalidFolderName(format!(
            "'{trimmed}' contains control characters"
        )));
    }
    Ok(trimmed)
}
