//! Command implementations for the Onyx CLI.

pub mod catalog;
pub mod export;
pub mod types;
pub mod upload;

use anyhow::{Context, Result};
use onyx_catalog::{Catalog, CatalogResult, ProgressEvent, ProgressSink};
use std::path::Path;

/// Load `path` if given, otherwise the built-in catalog.
pub fn load_catalog(path: Option<&Path>, builtin: fn() -> CatalogResult<Catalog>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path).with_context(|| format!("Failed to load catalog: {}", path.display())),
        None => builtin().context("Built-in catalog is invalid"),
    }
}

/// Drops progress lines so `--json` output stays machine-readable.
pub struct SilentProgressSink;

impl ProgressSink for SilentProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
