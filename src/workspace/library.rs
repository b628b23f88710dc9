//! Asset Library
//!
//! The narrow, non-UI surface behind the asset browser: discover asset
//! folders under a root, build browse summaries, fetch one asset's details,
//! and manage folders. Every query re-reads the filesystem; nothing is
//! cached between calls.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::metadata::{AssetMetadata, MetadataStore, VersionEntry, METADATA_FILE_NAME};
use crate::{HubError, HubResult};

use super::folders;
use super::scanner::AssetScanner;

/// Browse summary for one asset, enough to draw a grid tile or list row.
#[derive(Clone, Debug)]
pub struct AssetSummary {
    /// Display name from the document
    pub name: String,
    /// Absolute path of the asset folder
    pub folder: PathBuf,
    /// Latest version entry, absent while no version is recorded
    pub latest: Option<VersionEntry>,
    /// Absolute path of the latest version's preview, when the file exists
    pub thumbnail_path: Option<PathBuf>,
}

/// Full detail view of one asset.
#[derive(Clone, Debug)]
pub struct AssetDetails {
    /// Absolute path of the asset folder
    pub folder: PathBuf,
    /// The complete metadata document
    pub document: AssetMetadata,
    /// Absolute path of the latest version's preview, when the file exists
    pub thumbnail_path: Option<PathBuf>,
}

/// A document that could not be loaded during a listing pass.
#[derive(Clone, Debug)]
pub struct CorruptDocument {
    /// Path of the offending `metadata.json`
    pub path: PathBuf,
    /// Why it failed to load
    pub reason: String,
}

/// Result of listing assets with per-document error capture.
///
/// One broken document never hides the rest of the library; failures are
/// collected here so the shell can surface them.
#[derive(Debug, Default)]
pub struct AssetListing {
    /// Successfully loaded assets
    pub assets: Vec<AssetSummary>,
    /// Documents that failed to load
    pub corrupt: Vec<CorruptDocument>,
}

/// An asset library rooted at one directory.
#[derive(Debug)]
pub struct AssetLibrary {
    root: PathBuf,
}

impl AssetLibrary {
    /// Open a library rooted at `root`.
    ///
    /// The root must already exist as a directory; it is canonicalized so
    /// later containment checks are unambiguous.
    pub fn open(root: PathBuf) -> HubResult<AssetLibrary> {
        if !root.is_dir() {
            return Err(HubError::RootNotFound(root));
        }
        let root = std::fs::canonicalize(&root)?;
        Ok(AssetLibrary { root })
    }

    /// The canonical library root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths of all metadata documents under the root, sorted.
    pub fn find_metadata_documents(&self) -> Vec<PathBuf> {
        AssetScanner::new(self.root.clone())
            .scan()
            .into_iter()
            .map(|folder| folder.join(METADATA_FILE_NAME))
            .collect()
    }

    /// Load every discovered document into browse summaries.
    pub fn list_assets(&self) -> AssetListing {
        let mut listing = AssetListing::default();

        for folder in AssetScanner::new(self.root.clone()).scan() {
            match MetadataStore::load(&folder) {
                Ok(document) => listing.assets.push(summarize(&folder, &document)),
                Err(e) => {
                    warn!(
                        folder = %folder.display(),
                        error = %e,
                        "Skipping unreadable metadata document"
                    );
                    listing.corrupt.push(CorruptDocument {
                        path: folder.join(METADATA_FILE_NAME),
                        reason: e.to_string(),
                    });
                }
            }
        }

        listing
    }

    /// Detail query for a single asset folder.
    ///
    /// Unlike [`AssetLibrary::list_assets`], a corrupt document is an error
    /// here: the caller asked about this asset specifically.
    pub fn asset_details(&self, asset_folder: &Path) -> HubResult<AssetDetails> {
        self.ensure_in_root(asset_folder)?;

        let document = MetadataStore::load(asset_folder)?;
        let thumbnail_path =
            resolve_thumbnail(asset_folder, MetadataStore::latest_version(&document));
        Ok(AssetDetails {
            folder: asset_folder.to_path_buf(),
            document,
            thumbnail_path,
        })
    }

    /// Create a `NewFolder`-named subfolder under `parent`.
    pub fn create_folder(&self, parent: &Path) -> HubResult<PathBuf> {
        self.ensure_in_root(parent)?;
        folders::create_folder(parent)
    }

    /// Rename a folder inside the library.
    pub fn rename_folder(&self, folder: &Path, new_name: &str) -> HubResult<PathBuf> {
        let canonical = self.ensure_in_root(folder)?;
        if canonical == self.root {
            return Err(HubError::Validation(
                "Cannot rename the library root".to_string(),
            ));
        }
        folders::rename_folder(folder, new_name)
    }

    /// Refuse paths that resolve outside the library root.
    fn ensure_in_root(&self, path: &Path) -> HubResult<PathBuf> {
        let canonical = std::fs::canonicalize(path)?;
        if canonical.starts_with(&self.root) {
            Ok(canonical)
        } else {
            Err(HubError::Validation(format!(
                "Path is outside the library root: {}",
                path.display()
            )))
        }
    }
}

fn summarize(folder: &Path, document: &AssetMetadata) -> AssetSummary {
    let latest = MetadataStore::latest_version(document).cloned();
    AssetSummary {
        name: document.name.clone(),
        folder: folder.to_path_buf(),
        thumbnail_path: resolve_thumbnail(folder, latest.as_ref()),
        latest,
    }
}

/// Resolve an entry's thumbnail to an absolute path, if the file exists.
fn resolve_thumbnail(folder: &Path, entry: Option<&VersionEntry>) -> Option<PathBuf> {
    let relative = entry?.thumbnail.as_ref()?;
    let absolute = folder.join(relative);
    absolute.is_file().then_some(absolute)
}

// =============================================================================
// Tests
// =============================================================================
