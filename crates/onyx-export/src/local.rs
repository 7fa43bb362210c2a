//! Catalog-mode publisher: artifacts live under the models directory as
//! `{id}.{ext}` next to a `metadata.json` snapshot.

use crate::download::ArtifactFetcher;
use crate::error::{PipelineError, PublishFailure};
use onyx_catalog::{ExportFormat, ExportResult, ModelDescriptor, ModelsLayout};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An artifact in its final location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct LocalPublisher {
    layout: ModelsLayout,
}

impl LocalPublisher {
    #[must_use]
    pub fn new(layout: ModelsLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &ModelsLayout {
        &self.layout
    }

    /// Create the models directory. Failing here aborts the run.
    pub fn prepare(&self) -> Result<(), PipelineError> {
        self.layout.ensure_dirs()?;
        Ok(())
    }

    /// Move a freshly exported artifact to `{id}.{ext}`, replacing any previous one.
    pub fn publish(
        &self,
        descriptor: &ModelDescriptor,
        format: ExportFormat,
        artifact: &Path,
    ) -> Result<PublishedArtifact, PublishFailure> {
        if !artifact.is_file() {
            return Err(PublishFailure::NotFound(artifact.to_path_buf()));
        }

        let dest = self.layout.artifact_path(descriptor, format);
        if artifact != dest {
            move_file(artifact, &dest)?;
        }
        debug!(model = %descriptor.id, dest = %dest.display(), "Published artifact");
        self.stat(descriptor, format)
    }

    /// Size an artifact that is expected to already be in place.
    pub fn discover(
        &self,
        descriptor: &ModelDescriptor,
        format: ExportFormat,
    ) -> Result<PublishedArtifact, PublishFailure> {
        self.stat(descriptor, format)
    }

    /// Download a missing pre-built artifact to `{id}.{ext}` and size it.
    pub async fn fetch_missing(
        &self,
        fetcher: &dyn ArtifactFetcher,
        descriptor: &ModelDescriptor,
        format: ExportFormat,
        url: &str,
    ) -> Result<PublishedArtifact, PublishFailure> {
        let dest = self.layout.artifact_path(descriptor, format);
        fetcher.fetch(url, &dest).await?;
        self.stat(descriptor, format)
    }

    /// Replace `metadata.json` with the given results. Failing here aborts the run.
    pub fn write_metadata(&self, results: &[ExportResult]) -> Result<PathBuf, PipelineError> {
        let path = self.layout.metadata_path();
        onyx_catalog::write_metadata(&path, results)?;
        Ok(path)
    }

    fn stat(&self, descriptor: &ModelDescriptor, format: ExportFormat) -> Result<PublishedArtifact, PublishFailure> {
        let path = self.layout.artifact_path(descriptor, format);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(PublishedArtifact {
                filename: descriptor.artifact_filename(format),
                path,
                size_bytes: meta.len(),
            }),
            _ => Err(PublishFailure::NotFound(path)),
        }
    }
}

/// Rename over `to`, falling back to a copy when the staging directory is on
/// another filesystem. The copy lands next to `to` first, so a failed copy
/// leaves the previous artifact in place.
fn move_file(from: &Path, to: &Path) -> Result<(), PublishFailure> {
    let relocate_err = |e: std::io::Error| PublishFailure::Relocate {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message: e.to_string(),
    };

    let Err(e) = std::fs::rename(from, to) else {
        return Ok(());
    };
    warn!(error = %e, "Rename failed, copying artifact instead");

    let name = to.file_name().map_or_else(|| "artifact".into(), |n| n.to_string_lossy().into_owned());
    let staged = to.with_file_name(format!(".{name}.tmp"));
    if let Err(e) = std::fs::copy(from, &staged).and_then(|_| std::fs::rename(&staged, to)) {
        let _ = std::fs::remove_file(&staged);
        return Err(relocate_err(e));
    }
    std::fs::remove_file(from).map_err(relocate_err)
}
