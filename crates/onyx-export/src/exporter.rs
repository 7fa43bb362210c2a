use crate::error::ExportFailure;
use async_trait::async_trait;
use onyx_catalog::{ExportFormat, ExportSettings, ModelDescriptor};
use std::path::PathBuf;

/// Parameters of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub source_ref: String,
    pub format: ExportFormat,
    /// Square input resolution.
    pub image_size: u32,
    pub opset: Option<u32>,
    pub simplify: bool,
}

impl ExportRequest {
    #[must_use]
    pub fn for_descriptor(descriptor: &ModelDescriptor, settings: &ExportSettings) -> Self {
        Self {
            source_ref: descriptor.source_ref.clone(),
            format: settings.format,
            image_size: descriptor.image_size(),
            opset: settings.opset,
            simplify: settings.simplify,
        }
    }
}

/// Converts a checkpoint into a portable artifact.
///
/// The returned path points at wherever the conversion wrote its output;
/// publishers own relocating and naming it.
#[async_trait]
pub trait Exporter: Send + Sync {
    fn id(&self) -> &'static str;

    async fn export(&self, request: &ExportRequest) -> Result<PathBuf, ExportFailure>;
}
