//! Metadata Store
//!
//! Loads, validates, mutates, and persists one asset's `metadata.json`.
//! The owning folder is the unit of identity; there is no in-memory registry.
//! The filesystem is the single source of truth, re-read on every access.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::fs::atomic_write_json_pretty;
use crate::{HubError, HubResult};

use super::models::{AssetMetadata, VersionEntry, METADATA_FILE_NAME};

/// Operations over one asset's metadata document.
///
/// All operations are stateless: `load` and `save` address the document by
/// its folder, `record_version` is a pure function over document values.
pub struct MetadataStore;

impl MetadataStore {
    /// Load the metadata document for an asset folder.
    ///
    /// A missing `metadata.json` is not an error: the asset simply has no
    /// history yet, and a fresh document is returned with `name` inferred
    /// from the folder name. A file that is present but not parseable as
    /// UTF-8 JSON, or that violates the schema, fails with
    /// [`HubError::CorruptMetadata`] and is left on disk untouched for
    /// inspection.
    pub fn load(asset_folder: &Path) -> HubResult<AssetMetadata> {
        let path = asset_folder.join(METADATA_FILE_NAME);

        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(folder = %asset_folder.display(), "No metadata document, starting a fresh history");
                return Ok(AssetMetadata::new_empty(&infer_asset_name(asset_folder)));
            }
            Err(e) => return Err(HubError::Io(e)),
        };

        // Parsed from raw bytes: a bad encoding is a parse failure, not a
        // filesystem error.
        let mut document: AssetMetadata =
            serde_json::from_slice(&raw).map_err(|e| HubError::CorruptMetadata {
                path: path.clone(),
                reason: format!("JSON parse error: {e}"),
            })?;

        validate_document(&document, &path)?;

        // Entry order carries no information and has one unambiguous repair,
        // so hand-edited files with shuffled entries are normalized here.
        // Content problems (duplicates, a wrong `latest`) are rejected above.
        document.versions.sort_by_key(|v| v.version);

        Ok(document)
    }

    /// Record a new version entry, returning the updated document.
    ///
    /// Pure function: performs no I/O and never mutates the input. Callers
    /// persist the returned value explicitly via [`MetadataStore::save`].
    /// Fails with [`HubError::DuplicateVersion`] when the entry's version is
    /// already present; the existing history is never overwritten silently.
    pub fn record_version(
        document: &AssetMetadata,
        entry: VersionEntry,
    ) -> HubResult<AssetMetadata> {
        if entry.version == 0 {
            return Err(HubError::Validation(format!(
                "Version numbers start at 1, got 0 for asset '{}'",
                document.name
            )));
        }
        if document.versions.iter().any(|v| v.version == entry.version) {
            return Err(HubError::DuplicateVersion {
                name: document.name.clone(),
                version: entry.version,
            });
        }

        let mut updated = document.clone();
        updated.versions.push(entry);
        updated.versions.sort_by_key(|v| v.version);
        updated.latest = updated.versions.iter().map(|v| v.version).max();
        Ok(updated)
    }

    /// Persist a document to `<asset_folder>/metadata.json`.
    ///
    /// The write is atomic with respect to concurrent readers: a reader sees
    /// either the previous complete document or the new one, never a
    /// truncated file. The folder is created if absent.
    pub fn save(document: &AssetMetadata, asset_folder: &Path) -> HubResult<()> {
        let path = asset_folder.join(METADATA_FILE_NAME);
        atomic_write_json_pretty(&path, document)?;
        debug!(
            path = %path.display(),
            versions = document.versions.len(),
            "Saved metadata document"
        );
        Ok(())
    }

    /// The entry named by the document's `latest` field, if any.
    ///
    /// Looked up by version number, not by position: external tools may
    /// hand-edit the file, so entry order is an invariant to verify rather
    /// than trust.
    pub fn latest_version(document: &AssetMetadata) -> Option<&VersionEntry> {
        let latest = document.latest?;
        document.versions.iter().find(|v| v.version == latest)
    }
}

/// Display name for an asset that has no document yet.
fn infer_asset_name(asset_folder: &Path) -> String {
    asset_folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

/// Schema checks beyond what deserialization enforces.
///
/// Silent repair of content problems would hide real corruption, so every
/// ambiguity here is a hard failure.
fn validate_document(document: &AssetMetadata, path: &Path) -> HubResult<()> {
    if document.name.trim().is_empty() {
        return Err(corrupt(path, "asset name is empty".to_string()));
    }

    let mut seen = BTreeSet::new();
    for entry in &document.versions {
        if entry.version == 0 {
            return Err(corrupt(path, "version numbers must be positive".to_string()));
        }
        if !seen.insert(entry.version) {
            return Err(corrupt(path, format!("duplicate version {}", entry.version)));
        }
    }

    let highest = document.versions.iter().map(|v| v.version).max();
    match (document.latest, highest) {
        (Some(latest), Some(highest)) if latest != highest => Err(corrupt(
            path,
            format!("latest is {latest} but the highest recorded version is {highest}"),
        )),
        (None, Some(highest)) => Err(corrupt(
            path,
            format!("latest is missing but version {highest} is recorded"),
        )),
        (Some(latest), None) => Err(corrupt(
            path,
            format!("latest is {latest} but no versions are recorded"),
        )),
        _ => Ok(()),
    }
}

fn corrupt(path: &Path, reason: String) -> HubError {
    HubError::CorruptMetadata {
        path: path.to_path_buf(),
        reason,
    }
}

// =============================================================================
// Tests
// =============================================================================
