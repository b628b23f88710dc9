//! Asset Hub Error Definitions
//!
//! Defines error types used throughout the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::exporter::ExportBackendError;
use crate::metadata::VersionNumber;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum HubError {
    // =========================================================================
    // Metadata Document Errors
    // =========================================================================
    #[error("Corrupt metadata document {}: {}", .path.display(), .reason)]
    CorruptMetadata { path: PathBuf, reason: String },

    #[error("Version {version} already recorded for asset '{name}'")]
    DuplicateVersion {
        name: String,
        version: VersionNumber,
    },

    // =========================================================================
    // Export Errors
    // =========================================================================
    #[error("Export conflict: version {version} of asset '{name}' was recorded by another writer")]
    ExportConflict {
        name: String,
        version: VersionNumber,
    },

    #[error("Export backend failed: {0}")]
    ExportBackend(#[from] ExportBackendError),

    // =========================================================================
    // Library Errors
    // =========================================================================
    #[error("Library root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Folder already exists: {}", .0.display())]
    FolderExists(PathBuf),

    #[error("Invalid folder name: {0}")]
    InvalidFolderName(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result type
pub type HubResult<T> = Result<T, HubError>;
