use onyx_catalog::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

/// The conversion step could not produce an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportFailure {
    #[error("failed to launch exporter `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("{0}")]
    Conversion(String),

    #[error("exporter reported success but no artifact was found at {}", .0.display())]
    MissingArtifact(PathBuf),
}

/// An exported artifact could not be relocated or uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishFailure {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to move {} to {}: {message}", .from.display(), .to.display())]
    Relocate { from: PathBuf, to: PathBuf, message: String },

    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },
}

/// Failure attributed to a single catalog entry. Never ends a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemFailure {
    #[error(transparent)]
    Export(#[from] ExportFailure),

    #[error(transparent)]
    Publish(#[from] PublishFailure),
}

/// Errors outside the per-model loop. These abort the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("object store unavailable: {0}")]
    Store(String),

    #[error("http client unavailable: {0}")]
    Http(String),
}
