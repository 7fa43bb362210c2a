//! Sequential drivers for both publishing modes.
//!
//! Every catalog entry is processed to completion before the next one
//! starts, and any per-entry failure is captured in that entry's result.

use crate::download::ArtifactFetcher;
use crate::error::{ItemFailure, PipelineError, PublishFailure};
use crate::exporter::{ExportRequest, Exporter};
use crate::local::{LocalPublisher, PublishedArtifact};
use crate::remote::{public_url, ObjectStore, UpdateStatement};
use onyx_catalog::{
    Catalog, ExportFormat, ExportResult, ExportSettings, ModelDescriptor, ModelsLayout, ProgressEvent, ProgressSink,
    RunSummary,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a catalog-mode run.
#[derive(Debug, Clone)]
pub struct CatalogRun {
    /// One entry per catalog model: exported ones first, then pre-existing ones.
    pub results: Vec<ExportResult>,
    pub metadata_path: PathBuf,
}

impl CatalogRun {
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }
}

/// Export, relocate into the models directory, and snapshot `metadata.json`.
pub struct CatalogPipeline<'a> {
    exporter: &'a dyn Exporter,
    publisher: LocalPublisher,
    progress: &'a dyn ProgressSink,
    fetcher: Option<&'a dyn ArtifactFetcher>,
}

impl<'a> CatalogPipeline<'a> {
    #[must_use]
    pub fn new(exporter: &'a dyn Exporter, publisher: LocalPublisher, progress: &'a dyn ProgressSink) -> Self {
        Self { exporter, publisher, progress, fetcher: None }
    }

    /// Download missing pre-built artifacts that name a `url`. Without a
    /// fetcher they are recorded as failed.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: &'a dyn ArtifactFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub async fn run(&self, catalog: &Catalog) -> Result<CatalogRun, PipelineError> {
        self.publisher.prepare()?;
        info!(
            exporter = self.exporter.id(),
            models = catalog.len(),
            dir = %self.publisher.layout().root().display(),
            "Starting export run"
        );

        let mut results = Vec::with_capacity(catalog.len());
        for descriptor in catalog.to_export() {
            results.push(self.export_one(descriptor, &catalog.export).await);
        }
        for descriptor in catalog.already_present() {
            results.push(self.discover_one(descriptor, catalog.export.format).await);
        }

        let metadata_path = self.publisher.write_metadata(&results)?;
        Ok(CatalogRun { results, metadata_path })
    }

    async fn export_one(&self, descriptor: &ModelDescriptor, settings: &ExportSettings) -> ExportResult {
        self.progress.on_event(ProgressEvent::Started {
            model_id: descriptor.id.clone(),
            source_ref: descriptor.source_ref.clone(),
        });

        match self.try_export(descriptor, settings).await {
            Ok(published) => {
                self.progress.on_event(ProgressEvent::Exported {
                    model_id: descriptor.id.clone(),
                    filename: published.filename.clone(),
                    size_bytes: published.size_bytes,
                });
                ExportResult::success(descriptor.clone(), published.filename, published.size_bytes)
            }
            Err(failure) => self.record_failure(descriptor, &failure),
        }
    }

    async fn try_export(
        &self,
        descriptor: &ModelDescriptor,
        settings: &ExportSettings,
    ) -> Result<PublishedArtifact, ItemFailure> {
        let request = ExportRequest::for_descriptor(descriptor, settings);
        let artifact = self.exporter.export(&request).await?;
        Ok(self.publisher.publish(descriptor, settings.format, &artifact)?)
    }

    async fn discover_one(&self, descriptor: &ModelDescriptor, format: ExportFormat) -> ExportResult {
        let missing = match self.publisher.discover(descriptor, format) {
            Ok(found) => {
                self.progress.on_event(ProgressEvent::Discovered {
                    model_id: descriptor.id.clone(),
                    filename: found.filename.clone(),
                    size_bytes: found.size_bytes,
                });
                return ExportResult::exists(descriptor.clone(), found.filename, found.size_bytes);
            }
            Err(failure) => failure,
        };

        let (Some(fetcher), Some(url)) = (self.fetcher, descriptor.url.as_deref()) else {
            return self.record_failure(descriptor, &ItemFailure::from(missing));
        };
        match self.publisher.fetch_missing(fetcher, descriptor, format, url).await {
            Ok(fetched) => {
                self.progress.on_event(ProgressEvent::Downloaded {
                    model_id: descriptor.id.clone(),
                    filename: fetched.filename.clone(),
                    size_bytes: fetched.size_bytes,
                });
                ExportResult::exists(descriptor.clone(), fetched.filename, fetched.size_bytes)
            }
            Err(failure) => self.record_failure(descriptor, &ItemFailure::from(failure)),
        }
    }

    fn record_failure(&self, descriptor: &ModelDescriptor, failure: &ItemFailure) -> ExportResult {
        warn!(model = %descriptor.id, error = %failure, "Model not exported");
        self.progress.on_event(ProgressEvent::Failed {
            model_id: descriptor.id.clone(),
            error: failure.to_string(),
        });
        ExportResult::failed(descriptor.clone(), failure.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { key: String, public_url: String, statement: String },
    Failed(ItemFailure),
}

/// Outcome for one catalog entry in upload mode. Console-only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub model_id: String,
    pub source_ref: String,
    pub outcome: UploadOutcome,
}

impl UploadReport {
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        match &self.outcome {
            UploadOutcome::Uploaded { statement, .. } => Some(statement),
            UploadOutcome::Failed(_) => None,
        }
    }
}

/// Export, upload to object storage under the artifact's own file name, and
/// render the statement pointing the model's row at the public URL.
///
/// Pre-existing entries are not exported: their `{id}.{ext}` artifact is
/// uploaded from the models directory and their slug is the model id.
pub struct UploadPipeline<'a> {
    exporter: &'a dyn Exporter,
    store: &'a dyn ObjectStore,
    models: ModelsLayout,
    public_base_url: String,
    statement: UpdateStatement,
    progress: &'a dyn ProgressSink,
}

impl<'a> UploadPipeline<'a> {
    #[must_use]
    pub fn new(
        exporter: &'a dyn Exporter,
        store: &'a dyn ObjectStore,
        models: ModelsLayout,
        public_base_url: impl Into<String>,
        statement: UpdateStatement,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self { exporter, store, models, public_base_url: public_base_url.into(), statement, progress }
    }

    pub async fn run(&self, catalog: &Catalog) -> Vec<UploadReport> {
        info!(
            exporter = self.exporter.id(),
            bucket = self.store.bucket(),
            models = catalog.len(),
            "Starting upload run"
        );

        let mut reports = Vec::with_capacity(catalog.len());
        for descriptor in &catalog.models {
            let (uploaded, slug) = if descriptor.already_present {
                (self.upload_existing(descriptor, catalog.export.format).await, descriptor.id.clone())
            } else {
                self.progress.on_event(ProgressEvent::Started {
                    model_id: descriptor.id.clone(),
                    source_ref: descriptor.source_ref.clone(),
                });
                (self.upload_one(descriptor, &catalog.export).await, descriptor.source_slug())
            };

            let outcome = match uploaded {
                Ok((key, url)) => {
                    self.progress.on_event(ProgressEvent::Uploaded {
                        model_id: descriptor.id.clone(),
                        public_url: url.clone(),
                    });
                    let statement = self.statement.render(&url, &slug);
                    UploadOutcome::Uploaded { key, public_url: url, statement }
                }
                Err(failure) => {
                    warn!(model = %descriptor.id, error = %failure, "Model not uploaded");
                    self.progress.on_event(ProgressEvent::Failed {
                        model_id: descriptor.id.clone(),
                        error: failure.to_string(),
                    });
                    UploadOutcome::Failed(failure)
                }
            };

            reports.push(UploadReport {
                model_id: descriptor.id.clone(),
                source_ref: descriptor.source_ref.clone(),
                outcome,
            });
        }
        reports
    }

    async fn upload_one(
        &self,
        descriptor: &ModelDescriptor,
        settings: &ExportSettings,
    ) -> Result<(String, String), ItemFailure> {
        let request = ExportRequest::for_descriptor(descriptor, settings);
        let artifact = self.exporter.export(&request).await?;
        let key = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| PublishFailure::NotFound(artifact.clone()))?;
        self.push(key, &artifact).await
    }

    async fn upload_existing(
        &self,
        descriptor: &ModelDescriptor,
        format: ExportFormat,
    ) -> Result<(String, String), ItemFailure> {
        let path = self.models.artifact_path(descriptor, format);
        if !path.is_file() {
            return Err(PublishFailure::NotFound(path).into());
        }
        self.push(descriptor.artifact_filename(format), &path).await
    }

    async fn push(&self, key: String, path: &Path) -> Result<(String, String), ItemFailure> {
        self.store.put_file(&key, path).await?;
        let url = public_url(&self.public_base_url, &key);
        Ok((key, url))
    }
}
