use crate::descriptor::ModelDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    /// Exported during this run.
    Success,
    /// Export or relocation failed.
    Failed,
    /// Artifact was already on disk and only re-discovered.
    Exists,
}

impl ExportStatus {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Success | Self::Exists)
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Exists => "exists",
        })
    }
}

/// Outcome of processing one `ModelDescriptor`.
///
/// `artifact_filename` and `size_bytes` are set iff the status is not
/// `Failed`; `error_detail` is set iff it is. Use the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    #[serde(flatten)]
    pub descriptor: ModelDescriptor,
    pub status: ExportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ExportResult {
    #[must_use]
    pub fn success(descriptor: ModelDescriptor, artifact_filename: String, size_bytes: u64) -> Self {
        Self {
            descriptor,
            status: ExportStatus::Success,
            artifact_filename: Some(artifact_filename),
            size_bytes: Some(size_bytes),
            error_detail: None,
        }
    }

    #[must_use]
    pub fn exists(descriptor: ModelDescriptor, artifact_filename: String, size_bytes: u64) -> Self {
        Self {
            descriptor,
            status: ExportStatus::Exists,
            artifact_filename: Some(artifact_filename),
            size_bytes: Some(size_bytes),
            error_detail: None,
        }
    }

    #[must_use]
    pub fn failed(descriptor: ModelDescriptor, error_detail: impl Into<String>) -> Self {
        Self {
            descriptor,
            status: ExportStatus::Failed,
            artifact_filename: None,
            size_bytes: None,
            error_detail: Some(error_detail.into()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result_shape() {
        let r = ExportResult::success(ModelDescriptor::new("m1", "m1.ckpt"), "m1.onnx".to_string(), 5_242_880);
        let value = serde_json::to_value(&r).unwrap();

        assert_eq!(value["id"], "m1");
        assert_eq!(value["status"], "success");
        assert_eq!(value["artifactFilename"], "m1.onnx");
        assert_eq!(value["sizeBytes"], 5_242_880);
        assert_eq!(value["inputShape"]["width"], 640);
        assert!(value.get("errorDetail").is_none());
    }

    #[test]
    fn test_failed_result_has_no_artifact_fields() {
        let r = ExportResult::failed(ModelDescriptor::new("m2", "m2.ckpt"), "file not found");
        let value = serde_json::to_value(&r).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["errorDetail"], "file not found");
        assert!(value.get("artifactFilename").is_none());
        assert!(value.get("sizeBytes").is_none());
    }

    #[test]
    fn test_status_is_ok() {
        assert!(ExportStatus::Success.is_ok());
        assert!(ExportStatus::Exists.is_ok());
        assert!(!ExportStatus::Failed.is_ok());
    }
}
