//! Asset Exporter
//!
//! Drives one export end to end: produce the new version's output files
//! through the host backend, optionally capture a preview image, then record
//! the result in the asset's metadata document.
//!
//! The sequence is linear with no retries. Host export calls are assumed
//! synchronous and either fully succeed or fully fail; a failure at any step
//! aborts the export, and already-created output directories are left on
//! disk for manual cleanup rather than rolled back.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::metadata::{version_dir_name, MetadataStore, VersionEntry};
use crate::thumbnail::{ThumbnailCapture, DEFAULT_THUMBNAIL_HEIGHT, DEFAULT_THUMBNAIL_WIDTH};
use crate::{HubError, HubResult};

/// Default file name for the per-version preview image.
pub const DEFAULT_THUMBNAIL_FILE_NAME: &str = "thumb.png";

/// Produces the actual output files for a version.
///
/// Implemented against the host application ("export selected objects");
/// tests use in-memory fakes. Given a target directory, the backend writes
/// its files there and reports what it wrote.
pub trait ExportBackend {
    /// Export the current selection into `output_dir`.
    ///
    /// Returns a map of logical role -> file path relative to `output_dir`,
    /// e.g. "fbx" -> "Ellie.fbx". The exporter rebases these onto the asset
    /// folder when recording them.
    fn export_selection(
        &mut self,
        output_dir: &Path,
    ) -> Result<BTreeMap<String, String>, ExportBackendError>;
}

/// Export backend error
#[derive(Debug, Error)]
pub enum ExportBackendError {
    #[error("Host export failed: {0}")]
    Host(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export behavior knobs.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Preview image width in pixels
    pub thumbnail_width: u32,
    /// Preview image height in pixels
    pub thumbnail_height: u32,
    /// File name of the preview image inside the version directory
    pub thumbnail_file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
            thumbnail_file_name: DEFAULT_THUMBNAIL_FILE_NAME.to_string(),
        }
    }
}

/// Runs exports against an asset folder.
///
/// Holds the optional thumbnail collaborator and the export options; the
/// backend is passed per call because the host hands it out per command.
pub struct AssetExporter {
    options: ExportOptions,
    thumbnailer: Option<Box<dyn ThumbnailCapture>>,
}

impl AssetExporter {
    /// Create an exporter with default options and no thumbnail capture
    pub fn new() -> Self {
        Self {
            options: ExportOptions::default(),
            thumbnailer: None,
        }
    }

    /// Replace the export options
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a thumbnail collaborator
    pub fn with_thumbnailer(mut self, thumbnailer: impl ThumbnailCapture + 'static) -> Self {
        self.thumbnailer = Some(Box::new(thumbnailer));
        self
    }

    /// Export the host's current selection as the next version of the asset
    /// rooted at `asset_folder`.
    ///
    /// Steps: load the document, pick `latest + 1` as the next version,
    /// create `v_<nnn>/`, let the backend write its files, capture a preview
    /// (failure is non-fatal), then re-read the document and record the new
    /// entry. Losing a race against another exporter for the same version
    /// number fails with [`HubError::ExportConflict`]; nothing is retried.
    pub fn export(
        &mut self,
        asset_folder: &Path,
        author: &str,
        backend: &mut dyn ExportBackend,
    ) -> HubResult<VersionEntry> {
        let document = MetadataStore::load(asset_folder)?;
        let next_version = document.latest.unwrap_or(0).checked_add(1).ok_or_else(|| {
            HubError::Validation(format!(
                "Version numbers for asset '{}' are exhausted",
                document.name
            ))
        })?;
        let dir_name = version_dir_name(next_version);
        let output_dir = asset_folder.join(&dir_name);
        std::fs::create_dir_all(&output_dir)?;

        let exported = backend.export_selection(&output_dir)?;
        let mut files = BTreeMap::new();
        for (role, rel_path) in exported {
            files.insert(role, format!("{}/{}", dir_name, rel_path.replace('\\', "/")));
        }

        let mut entry = VersionEntry::new(next_version, files, author, Local::now().date_naive());
        if let Some(thumbnail) = self.capture_thumbnail(&output_dir, &dir_name) {
            entry = entry.with_thumbnail(&thumbnail);
        }

        // The backend call can take a while; another exporter may have
        // recorded a version meanwhile. Re-read before recording so the
        // loser of that race fails here instead of overwriting history.
        let document = MetadataStore::load(asset_folder)?;
        let updated =
            MetadataStore::record_version(&document, entry.clone()).map_err(|e| match e {
                HubError::DuplicateVersion { name, version } => {
                    HubError::ExportConflict { name, version }
                }
                other => other,
            })?;
        MetadataStore::save(&updated, asset_folder)?;

        info!(
            asset = %updated.name,
            version = next_version,
            files = entry.files.len(),
            "Recorded export"
        );
        Ok(entry)
    }

    /// Returns the recorded thumbnail path, or `None` when capture is
    /// unavailable or failed.
    fn capture_thumbnail(&mut self, output_dir: &Path, dir_name: &str) -> Option<String> {
        let thumbnailer = self.thumbnailer.as_mut()?;
        let output_path = output_dir.join(&self.options.thumbnail_file_name);

        match thumbnailer.capture(
            &output_path,
            self.options.thumbnail_width,
            self.options.thumbnail_height,
        ) {
            Ok(()) => Some(format!("{}/{}", dir_name, self.options.thumbnail_file_name)),
            Err(e) => {
                warn!(error = %e, "Thumbnail capture failed, continuing without a preview");
                None
            }
        }
    }
}

impl Default for AssetExporter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use crate::metadata::{AssetMetadata, METADATA_FILE_NAME};
    use crate::thumbnail::ThumbnailError;

    /// Writes one file into the version directory, like a host export call.
    struct FakeBackend {
        file_stem: String,
        fail: bool,
    }

    impl FakeBackend {
        fn exporting(file_stem: &str) -> Self {
            Self {
                file_stem: file_stem.to_string(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                file_stem: String::new(),
                fail: true,
            }
        }
    }

    impl ExportBackend for FakeBackend {
        fn export_selection(
            &mut self,
            output_dir: &Path,
        ) -> Result<BTreeMap<String, String>, ExportBackendError> {
            if self.fail {
                return Err(ExportBackendError::Host("selection is empty".to_string()));
            }
            let file_name = format!("{}.fbx", self.file_stem);
            std::fs::write(output_dir.join(&file_name), b"fbx")?;
            let mut files = BTreeMap::new();
            files.insert("fbx".to_string(), file_name);
            Ok(files)
        }
    }

    /// Writes `{width}x{height}` into the preview file so tests can check
    /// the requested size without shared state.
    struct FakeThumbnailer {
        fail: bool,
    }

    impl ThumbnailCapture for FakeThumbnailer {
        fn capture(
            &mut self,
            output_path: &Path,
            width: u32,
            height: u32,
        ) -> Result<(), ThumbnailError> {
            if self.fail {
                return Err(ThumbnailError::Capture("viewport unavailable".to_string()));
            }
            std::fs::write(output_path, format!("{width}x{height}"))?;
            Ok(())
        }
    }

    /// Sneaks a rival version into the document while the outer export is
    /// still writing files, reproducing two exporters racing past each
    /// other's initial load.
    struct RacingBackend {
        asset_folder: PathBuf,
        inner: FakeBackend,
    }

    impl ExportBackend for RacingBackend {
        fn export_selection(
            &mut self,
            output_dir: &Path,
        ) -> Result<BTreeMap<String, String>, ExportBackendError> {
            let host = |e: HubError| ExportBackendError::Host(e.to_string());

            let document = MetadataStore::load(&self.asset_folder).map_err(host)?;
            let next = document.latest.unwrap_or(0) + 1;
            let rival = VersionEntry::new(
                next,
                BTreeMap::new(),
                "rival",
                Local::now().date_naive(),
            );
            let updated = MetadataStore::record_version(&document, rival).map_err(host)?;
            MetadataStore::save(&updated, &self.asset_folder).map_err(host)?;

            self.inner.export_selection(output_dir)
        }
    }

    fn asset_folder(dir: &TempDir) -> PathBuf {
        let folder = dir.path().join("Ellie");
        std::fs::create_dir_all(&folder).unwrap();
        folder
    }

    #[test]
    fn first_export_creates_version_one() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);
        let mut backend = FakeBackend::exporting("Ellie");

        let entry = AssetExporter::new()
            .export(&folder, "xicheng", &mut backend)
            .unwrap();

        assert_eq!(entry.version, 1);
        assert_eq!(entry.author, "xicheng");
        assert_eq!(entry.files["fbx"], "v_001/Ellie.fbx");
        assert_eq!(entry.thumbnail, None);
        assert!(folder.join("v_001").join("Ellie.fbx").is_file());

        let doc = MetadataStore::load(&folder).unwrap();
        assert_eq!(doc.name, "Ellie");
        assert_eq!(doc.latest, Some(1));
        assert_eq!(doc.versions, vec![entry]);
    }

    #[test]
    fn second_export_appends_version_two() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);
        let mut exporter = AssetExporter::new();

        let mut backend = FakeBackend::exporting("Ellie");
        exporter.export(&folder, "xicheng", &mut backend).unwrap();
        let entry = exporter.export(&folder, "xicheng", &mut backend).unwrap();

        assert_eq!(entry.version, 2);
        assert_eq!(entry.files["fbx"], "v_002/Ellie.fbx");
        assert!(folder.join("v_002").join("Ellie.fbx").is_file());

        let doc = MetadataStore::load(&folder).unwrap();
        let versions: Vec<u32> = doc.versions.iter().map(|v| v.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(doc.latest, Some(2));
    }

    #[test]
    fn backend_failure_aborts_without_recording() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);

        let err = AssetExporter::new()
            .export(&folder, "xicheng", &mut FakeBackend::failing())
            .unwrap_err();

        assert!(matches!(err, HubError::ExportBackend(_)));
        // No metadata was written; the empty version directory is left for
        // manual cleanup.
        assert!(!folder.join(METADATA_FILE_NAME).exists());
        assert!(folder.join("v_001").is_dir());
    }

    #[test]
    fn export_fails_cleanly_when_version_numbers_are_exhausted() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);

        let full = MetadataStore::record_version(
            &AssetMetadata::new_empty("Ellie"),
            VersionEntry::new(u32::MAX, BTreeMap::new(), "xicheng", Local::now().date_naive()),
        )
        .unwrap();
        MetadataStore::save(&full, &folder).unwrap();

        let err = AssetExporter::new()
            .export(&folder, "xicheng", &mut FakeBackend::exporting("Ellie"))
            .unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));

        // The recorded history is untouched.
        let doc = MetadataStore::load(&folder).unwrap();
        assert_eq!(doc.latest, Some(u32::MAX));
        assert_eq!(doc.versions.len(), 1);
    }

    #[test]
    fn thumbnail_is_recorded_when_capture_succeeds() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);
        let mut backend = FakeBackend::exporting("Ellie");

        let entry = AssetExporter::new()
            .with_thumbnailer(FakeThumbnailer { fail: false })
            .export(&folder, "xicheng", &mut backend)
            .unwrap();

        assert_eq!(entry.thumbnail.as_deref(), Some("v_001/thumb.png"));
        let thumb = folder.join("v_001").join("thumb.png");
        assert_eq!(std::fs::read_to_string(thumb).unwrap(), "512x512");
    }

    #[test]
    fn thumbnail_failure_is_non_fatal() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);
        let mut backend = FakeBackend::exporting("Ellie");

        let entry = AssetExporter::new()
            .with_thumbnailer(FakeThumbnailer { fail: true })
            .export(&folder, "xicheng", &mut backend)
            .unwrap();

        assert_eq!(entry.version, 1);
        assert_eq!(entry.thumbnail, None);

        let doc = MetadataStore::load(&folder).unwrap();
        assert_eq!(doc.latest, Some(1));
    }

    #[test]
    fn custom_options_change_preview_name_and_size() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);
        let mut backend = FakeBackend::exporting("Ellie");

        let options = ExportOptions {
            thumbnail_width: 256,
            thumbnail_height: 256,
            thumbnail_file_name: "preview.png".to_string(),
        };
        let entry = AssetExporter::new()
            .with_options(options)
            .with_thumbnailer(FakeThumbnailer { fail: false })
            .export(&folder, "xicheng", &mut backend)
            .unwrap();

        assert_eq!(entry.thumbnail.as_deref(), Some("v_001/preview.png"));
        let thumb = folder.join("v_001").join("preview.png");
        assert_eq!(std::fs::read_to_string(thumb).unwrap(), "256x256");
    }

    #[test]
    fn losing_a_version_race_fails_with_conflict() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);
        let mut exporter = AssetExporter::new();

        // Both exporters will start from latest == 1 and aim for version 2.
        let mut backend = FakeBackend::exporting("Ellie");
        exporter.export(&folder, "xicheng", &mut backend).unwrap();

        let mut racing = RacingBackend {
            asset_folder: folder.clone(),
            inner: FakeBackend::exporting("Ellie"),
        };
        let err = exporter.export(&folder, "xicheng", &mut racing).unwrap_err();

        match err {
            HubError::ExportConflict { name, version } => {
                assert_eq!(name, "Ellie");
                assert_eq!(version, 2);
            }
            other => panic!("expected ExportConflict, got {other:?}"),
        }

        // Exactly one version 2 landed, and the document is intact.
        let doc = MetadataStore::load(&folder).unwrap();
        let versions: Vec<u32> = doc.versions.iter().map(|v| v.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(doc.latest, Some(2));
        assert_eq!(doc.versions[1].author, "rival");
    }

    #[test]
    fn export_into_missing_folder_creates_it() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("props").join("Brick");
        let mut backend = FakeBackend::exporting("Brick");

        let entry = AssetExporter::new()
            .export(&folder, "xicheng", &mut backend)
            .unwrap();

        assert_eq!(entry.version, 1);
        let doc = MetadataStore::load(&folder).unwrap();
        assert_eq!(doc.name, "Brick");
        assert_eq!(doc.latest, Some(1));
    }

    #[test]
    fn conflict_check_uses_fresh_disk_state() {
        let dir = TempDir::new().unwrap();
        let folder = asset_folder(&dir);

        // Rival lands version 1 while this export is mid-flight.
        let mut racing = RacingBackend {
            asset_folder: folder.clone(),
            inner: FakeBackend::exporting("Ellie"),
        };
        let err = AssetExporter::new()
            .export(&folder, "xicheng", &mut racing)
            .unwrap_err();
        assert!(matches!(err, HubError::ExportConflict { version: 1, .. }));

        // A later export sees the rival's version and moves on to 2.
        let mut backend = FakeBackend::exporting("Ellie");
        let entry = AssetExporter::new()
            .export(&folder, "xicheng", &mut backend)
            .unwrap();
        assert_eq!(entry.version, 2);
    }
}
