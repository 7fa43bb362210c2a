//! The `metadata.json` snapshot written at the end of an export run.
//!
//! The document is a JSON array of `ExportResult` objects in processing
//! order. It is rewritten in full on every run, never patched.

use crate::error::{CatalogError, CatalogResult};
use crate::result::{ExportResult, ExportStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Render results as the metadata document: 2-space indented JSON, non-ASCII
/// text kept as UTF-8, trailing newline.
pub fn render_metadata(results: &[ExportResult]) -> CatalogResult<String> {
    let mut out = serde_json::to_string_pretty(results)?;
    out.push('\n');
    Ok(out)
}

/// Write the metadata document, replacing any previous snapshot.
pub fn write_metadata(path: &Path, results: &[ExportResult]) -> CatalogResult<()> {
    let rendered = render_metadata(results)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, rendered.as_bytes())?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), entries = results.len(), "Wrote metadata snapshot");
    Ok(())
}

pub fn read_metadata(path: &Path) -> CatalogResult<Vec<ExportResult>> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CatalogError::Metadata(format!("{}: {}", path.display(), e)))
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// `success` + `exists` results.
    pub succeeded: usize,
    pub failed: usize,
    pub total_bytes: u64,
}

impl RunSummary {
    #[must_use]
    pub fn from_results(results: &[ExportResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.status {
                ExportStatus::Success | ExportStatus::Exists => acc.succeeded += 1,
                ExportStatus::Failed => acc.failed += 1,
            }
            acc.total_bytes += r.size_bytes.unwrap_or(0);
            acc
        })
    }

    #[must_use]
    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / 1024.0 / 1024.0
    }
}
