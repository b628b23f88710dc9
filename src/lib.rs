//! Asset Hub Core
//!
//! Versioned asset metadata store for DCC asset browsers. Each asset folder
//! carries a `metadata.json` sidecar document recording its exported
//! versions (files produced, author, date, thumbnail); this crate owns that
//! document's schema and the logic that reads, merges, and rewrites it as
//! new versions are exported.
//!
//! - [`metadata`] — the document model and [`metadata::MetadataStore`]
//! - [`exporter`] — the export pipeline around a host backend
//! - [`thumbnail`] — the preview-capture collaborator contract
//! - [`workspace`] — asset discovery and folder management under a root
//! - [`fs`] — crash-tolerant atomic file writes
//!
//! The crate is synchronous and purely local: the filesystem is the single
//! source of truth, re-read on every access. UI shells, host integrations,
//! and network sync live elsewhere.

pub mod exporter;
pub mod fs;
pub mod metadata;
pub mod thumbnail;
pub mod workspace;

mod error;
pub use error::*;
