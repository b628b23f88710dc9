//! Asset Metadata Models
//!
//! Data model for the `metadata.json` sidecar document that records an
//! asset's exported version history. The document lives next to the exported
//! files and is the only record of that history; everything here serializes
//! to the exact on-disk schema.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// File name of the sidecar document inside an asset folder.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Version numbers are plain positive integers, unique within a document.
pub type VersionNumber = u32;

/// Conventional directory name for a version's output files, e.g. `v_001`.
///
/// The padding is a minimum width: version 1234 maps to `v_1234`.
pub fn version_dir_name(version: VersionNumber) -> String {
    format!("v_{:03}", version)
}

/// One exported version of an asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Version number, unique within the document
    pub version: VersionNumber,
    /// Logical role -> path relative to the asset folder, e.g. "fbx" -> "v_001/Ellie.fbx"
    pub files: BTreeMap<String, String>,
    /// Identity of whoever ran the export
    pub author: String,
    /// Export date (the artist's local calendar date)
    pub date: NaiveDate,
    /// Preview image path relative to the asset folder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl VersionEntry {
    /// Create an entry with no thumbnail
    pub fn new(
        version: VersionNumber,
        files: BTreeMap<String, String>,
        author: &str,
        date: NaiveDate,
    ) -> Self {
        Self {
            version,
            files,
            author: author.to_string(),
            date,
            thumbnail: None,
        }
    }

    /// Set the preview image path (relative to the asset folder)
    pub fn with_thumbnail(mut self, thumbnail: &str) -> Self {
        self.thumbnail = Some(thumbnail.to_string());
        self
    }
}

/// The `metadata.json` document: one asset's full version history.
///
/// `versions` is kept sorted ascending by version number and `latest` always
/// names the highest recorded version. [`super::MetadataStore`] enforces both
/// on every load and mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Display name of the asset, fixed at first creation
    pub name: String,
    /// Version history, ascending by version number
    pub versions: Vec<VersionEntry>,
    /// Highest version number present; absent while `versions` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<VersionNumber>,
}

impl AssetMetadata {
    /// Create a document with no recorded versions
    pub fn new_empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            versions: Vec::new(),
            latest: None,
        }
    }
}
