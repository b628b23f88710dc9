//! Asset Directory Scanner
//!
//! Walks a library root looking for asset folders: directories that contain
//! a `metadata.json` document. An asset folder is a leaf of the walk; its
//! subdirectories hold version outputs and are never separate assets.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::metadata::METADATA_FILE_NAME;

/// Recursive scanner for asset folders under a library root
pub struct AssetScanner {
    root: PathBuf,
    max_depth: Option<usize>,
}

impl AssetScanner {
    /// Create a scanner for the given root
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            max_depth: None,
        }
    }

    /// Cap the directory depth of the walk
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Find all asset folders under the root.
    ///
    /// Depth-first walk that stops descending once a directory holds a
    /// metadata document. Returns absolute folder paths sorted for
    /// deterministic results. Unreadable entries are skipped.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut folders = Vec::new();

        let mut walker = WalkDir::new(&self.root).follow_links(false);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut it = walker.into_iter();
        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable entry during scan");
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if is_asset_folder(entry.path()) {
                folders.push(entry.path().to_path_buf());
                // Everything below belongs to this asset.
                it.skip_current_dir();
            }
        }

        folders.sort();
        folders
    }
}

/// Whether a directory holds a metadata document.
pub fn is_asset_folder(dir: &Path) -> bool {
    dir.join(METADATA_FILE_NAME).is_file()
}
