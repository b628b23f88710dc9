//! Versioned Asset Metadata
//!
//! The `metadata.json` document model and the store that reads, validates,
//! and writes it. This is the core of the crate: every other module either
//! feeds this document or queries it.

mod models;
mod store;

pub use models::*;
pub use store::*;
