//! Exporter backed by the ultralytics `yolo` command line tool.

use crate::error::ExportFailure;
use crate::exporter::{ExportRequest, Exporter};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_COMMAND: &str = "yolo";

static SAVED_AS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"saved as '([^']+)'").expect("valid regex"));

/// Runs `yolo export model=<src> format=<fmt> imgsz=<n> ...` in a staging
/// directory. Checkpoints given by bare name are resolved (and downloaded)
/// by the tool itself, so the artifact usually lands in the staging
/// directory next to the checkpoint.
#[derive(Debug, Clone)]
pub struct UltralyticsExporter {
    command: String,
    work_dir: PathBuf,
}

impl UltralyticsExporter {
    #[must_use]
    pub fn new(command: impl Into<String>, work_dir: PathBuf) -> Self {
        Self { command: command.into(), work_dir }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Arguments passed after the command name.
    #[must_use]
    pub fn args(request: &ExportRequest) -> Vec<String> {
        let mut args = vec![
            "export".to_string(),
            format!("model={}", request.source_ref),
            format!("format={}", request.format.as_str()),
            format!("imgsz={}", request.image_size),
        ];
        if let Some(opset) = request.opset {
            args.push(format!("opset={opset}"));
        }
        args.push(format!("simplify={}", if request.simplify { "True" } else { "False" }));
        args
    }

    /// Where the artifact is expected when the tool does not say.
    fn default_artifact_path(&self, request: &ExportRequest) -> PathBuf {
        let stem = Path::new(&request.source_ref)
            .file_stem()
            .map_or_else(|| request.source_ref.clone(), |s| s.to_string_lossy().into_owned());
        self.work_dir.join(format!("{stem}.{}", request.format.extension()))
    }

    fn resolve(&self, reported: &str) -> PathBuf {
        let path = PathBuf::from(reported);
        if path.is_absolute() { path } else { self.work_dir.join(path) }
    }
}

/// Last `saved as '<path>'` mention in the tool's output.
pub(crate) fn parse_saved_path(output: &str) -> Option<String> {
    SAVED_AS
        .captures_iter(output)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Last non-blank line, which for a Python failure is the exception message.
pub(crate) fn last_meaningful_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Exporter for UltralyticsExporter {
    fn id(&self) -> &'static str {
        "ultralytics"
    }

    async fn export(&self, request: &ExportRequest) -> Result<PathBuf, ExportFailure> {
        tokio::fs::create_dir_all(&self.work_dir).await.map_err(|e| {
            ExportFailure::Conversion(format!(
                "cannot create staging directory {}: {e}",
                self.work_dir.display()
            ))
        })?;

        let args = Self::args(request);
        debug!(command = %self.command, ?args, work_dir = %self.work_dir.display(), "Running exporter");

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExportFailure::Spawn { command: self.command.clone(), message: e.to_string() })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = last_meaningful_line(&stderr)
                .or_else(|| last_meaningful_line(&stdout))
                .unwrap_or_else(|| format!("exporter exited with {}", output.status));
            warn!(source = %request.source_ref, status = %output.status, "Export failed");
            return Err(ExportFailure::Conversion(message));
        }

        let artifact = parse_saved_path(&stdout)
            .or_else(|| parse_saved_path(&stderr))
            .map_or_else(|| self.default_artifact_path(request), |p| self.resolve(&p));

        if !artifact.is_file() {
            return Err(ExportFailure::MissingArtifact(artifact));
        }

        info!(source = %request.source_ref, artifact = %artifact.display(), "Export finished");
        Ok(artifact)
    }
}
