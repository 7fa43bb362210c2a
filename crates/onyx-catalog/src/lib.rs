//! Onyx Catalog
//!
//! Data model and on-disk formats for model export runs:
//! - Describing the models to export (`ModelDescriptor`, `Catalog`)
//! - Recording what happened to each one (`ExportResult`)
//! - Locating artifacts and the metadata document (`ModelsLayout`)
//! - Reporting progress while a run is in flight (`ProgressSink`)

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod progress;
pub mod result;

pub use catalog::{Catalog, ExportFormat, ExportSettings};
pub use descriptor::{DisplayMetadata, InputShape, ModelDescriptor};
pub use error::{CatalogError, CatalogResult};
pub use layout::ModelsLayout;
pub use metadata::{read_metadata, render_metadata, write_metadata, RunSummary};
pub use progress::{ProgressEvent, ProgressSink, StdoutProgressSink};
pub use result::{ExportResult, ExportStatus};
