//! Onyx Export
//!
//! Turns catalog entries into published model artifacts:
//! - `Exporter`: the conversion seam (`UltralyticsExporter` shells out to `yolo export`)
//! - `LocalPublisher`: moves artifacts into the models directory and writes metadata.json
//! - `ArtifactFetcher`: downloads pre-built artifacts that are missing (`HttpFetcher`)
//! - `ObjectStore`: pushes artifacts to S3-compatible storage (`S3ObjectStore`)
//! - `CatalogPipeline` / `UploadPipeline`: the sequential drivers for both modes

pub mod download;
pub mod error;
pub mod exporter;
pub mod local;
pub mod pipeline;
pub mod remote;
pub mod ultralytics;

pub use download::{ArtifactFetcher, HttpFetcher};
pub use error::{ExportFailure, ItemFailure, PipelineError, PublishFailure};
pub use exporter::{ExportRequest, Exporter};
pub use local::{LocalPublisher, PublishedArtifact};
pub use pipeline::{CatalogPipeline, CatalogRun, UploadOutcome, UploadPipeline, UploadReport};
pub use remote::{public_url, ObjectStore, S3ObjectStore, S3StoreConfig, UpdateStatement};
pub use ultralytics::UltralyticsExporter;
