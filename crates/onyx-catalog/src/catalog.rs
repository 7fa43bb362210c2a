//! Catalogs: ordered lists of models to export plus the export settings
//! that apply to all of them.
//!
//! Catalogs are TOML documents:
//!
//! ```toml
//! [export]
//! format = "onnx"
//! opset = 12
//! simplify = false
//!
//! [[models]]
//! id = "yolov8n-coco"
//! sourceRef = "yolov8n.pt"
//! name = "YOLOv8n COCO Detection"
//! labels = ["person", "bicycle"]
//! ```

use crate::descriptor::ModelDescriptor;
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

const BUILTIN_EXPORT_CATALOG: &str = include_str!("../catalog/export.toml");
const BUILTIN_UPLOAD_CATALOG: &str = include_str!("../catalog/upload.toml");

/// Portable format requested from the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Onnx,
    Torchscript,
}

impl ExportFormat {
    /// File extension of artifacts in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Torchscript => "torchscript",
        }
    }

    /// Name understood by the exporter's `format=` argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.extension()
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion parameters shared by every model in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub format: ExportFormat,
    /// Operator set version; `None` leaves the exporter's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opset: Option<u32>,
    #[serde(default)]
    pub simplify: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { format: ExportFormat::Onnx, opset: Some(12), simplify: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl Catalog {
    /// Parse and validate a catalog document. `origin` only labels errors.
    pub fn from_toml_str(content: &str, origin: &str) -> CatalogResult<Self> {
        let catalog: Self = toml::from_str(content).map_err(|e| CatalogError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        catalog.validate()?;
        debug!(origin, models = catalog.models.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Catalog used by `onyx export` when no `--catalog` is given.
    pub fn builtin_export() -> CatalogResult<Self> {
        Self::from_toml_str(BUILTIN_EXPORT_CATALOG, "<builtin export catalog>")
    }

    /// Catalog used by `onyx upload` when no `--catalog` is given.
    pub fn builtin_upload() -> CatalogResult<Self> {
        Self::from_toml_str(BUILTIN_UPLOAD_CATALOG, "<builtin upload catalog>")
    }

    pub fn validate(&self) -> CatalogResult<()> {
        let mut seen = HashSet::new();
        for model in &self.models {
            if model.id.trim().is_empty() {
                return Err(CatalogError::Invalid("model id is required".to_string()));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(CatalogError::Invalid(format!("duplicate model id: {}", model.id)));
            }
            let shape = model.input_shape;
            if shape.width == 0 || shape.height == 0 || shape.channels == 0 {
                return Err(CatalogError::Invalid(format!(
                    "{}: inputShape dimensions must be >= 1",
                    model.id
                )));
            }
            if let Some(url) = &model.url {
                if !model.already_present {
                    return Err(CatalogError::Invalid(format!(
                        "{}: url is only used by alreadyPresent models",
                        model.id
                    )));
                }
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(CatalogError::Invalid(format!("{}: url must be http(s), got {url}", model.id)));
                }
            }
            if model.already_present {
                continue;
            }
            if model.source_ref.trim().is_empty() {
                return Err(CatalogError::Invalid(format!("{}: sourceRef is required", model.id)));
            }
            if !shape.is_square() {
                return Err(CatalogError::Invalid(format!(
                    "{}: exported models need a square inputShape, got {}x{}",
                    model.id, shape.width, shape.height
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models that must go through the exporter, in catalog order.
    pub fn to_export(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(|m| !m.already_present)
    }

    /// Models whose artifacts are expected to already be on disk, in catalog order.
    pub fn already_present(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(|m| m.already_present)
    }
}
