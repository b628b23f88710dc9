//! Thumbnail Capture
//!
//! The host application owns viewport rendering; the export pipeline only
//! needs a way to ask for a preview image at a given path and size. Capture
//! failures never fail an export, the version is simply recorded without a
//! preview.

use std::path::Path;

use thiserror::Error;

/// Default preview size, matching the playblast convention of the hosts.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 512;
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 512;

/// Renders a preview image of the host application's current view.
///
/// Implemented against the host (a viewport grab in a DCC, a scene capture
/// in an engine editor); tests use fakes that write a placeholder file.
pub trait ThumbnailCapture {
    /// Render a preview image to `output_path` at the given pixel size.
    fn capture(&mut self, output_path: &Path, width: u32, height: u32)
        -> Result<(), ThumbnailError>;
}

/// Thumbnail capture error
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
