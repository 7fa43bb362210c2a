use crate::catalog::ExportFormat;
use serde::{Deserialize, Serialize};

/// Expected input tensor dimensions of an exported model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShape {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

impl InputShape {
    #[must_use]
    pub const fn square(size: u32) -> Self {
        Self { width: size, height: size, channels: 3 }
    }

    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl Default for InputShape {
    fn default() -> Self {
        Self::square(640)
    }
}

/// Descriptive fields shown by catalog consumers.
///
/// The export pipeline never inspects these; they are carried into the
/// metadata document unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Technical task family (Detection, Segmentation, Classification, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mAP", default, skip_serializing_if = "Option::is_none")]
    pub map: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_ms: Option<u32>,
}

/// A model to export, as listed in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Stable slug; exported artifacts are named `{id}.{ext}`.
    pub id: String,
    /// Checkpoint locator handed to the exporter (e.g. `yolov8n.pt`).
    #[serde(default)]
    pub source_ref: String,
    #[serde(flatten)]
    pub display: DisplayMetadata,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub input_shape: InputShape,
    /// The artifact already lives in the models directory and is only
    /// re-discovered, never exported.
    #[serde(default, skip_serializing_if = "is_false")]
    pub already_present: bool,
    /// Where a pre-existing artifact is fetched from when it is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl ModelDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>, source_ref: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display: DisplayMetadata { name: id.clone(), ..DisplayMetadata::default() },
            id,
            source_ref: source_ref.into(),
            labels: Vec::new(),
            input_shape: InputShape::default(),
            already_present: false,
            url: None,
        }
    }

    /// File name of this model's artifact in the models directory.
    #[must_use]
    pub fn artifact_filename(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.id, format.extension())
    }

    /// Square image size requested from the exporter.
    #[must_use]
    pub const fn image_size(&self) -> u32 {
        self.input_shape.width
    }

    /// Checkpoint file name without its extension (`yolov8n.pt` -> `yolov8n`).
    #[must_use]
    pub fn source_slug(&self) -> String {
        let name = std::path::Path::new(&self.source_ref)
            .file_name()
            .map_or_else(|| self.source_ref.clone(), |n| n.to_string_lossy().into_owned());
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name,
        }
    }
}
