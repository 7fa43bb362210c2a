//! Command type definitions shared between main.rs and the command modules.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Catalog file (defaults to the built-in export catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Destination directory for artifacts and metadata.json
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Export tool to run (default: yolo)
    #[arg(long)]
    pub exporter: Option<String>,

    /// Directory the export tool runs in
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Do not download missing pre-built models; record them as failed
    #[arg(long)]
    pub offline: bool,

    /// Output the run summary and results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Catalog file (defaults to the built-in upload catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Export tool to run (default: yolo)
    #[arg(long)]
    pub exporter: Option<String>,

    /// Directory the export tool runs in
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Directory holding pre-built artifacts of `alreadyPresent` models
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Bucket to upload into (overrides storage.bucket)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Public base URL of the bucket (overrides storage.public_url)
    #[arg(long)]
    pub public_url: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogCommand {
    /// List the models in a catalog
    List {
        /// Catalog file (defaults to a built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Show the built-in upload catalog instead of the export catalog
        #[arg(long, conflicts_with = "catalog")]
        upload: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a catalog file
    Check {
        /// Catalog file to validate
        path: PathBuf,
    },
}
