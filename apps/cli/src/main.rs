//! Onyx CLI - export model checkpoints to portable artifacts and publish them.
//!
//! `onyx export` writes artifacts plus `metadata.json` into a local models
//! directory; `onyx upload` pushes artifacts to S3-compatible storage and
//! prints the database statements that point each model at its public URL.

mod commands;
mod config;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::types::{CatalogCommand, ExportArgs, UploadArgs};
use config::OnyxConfig;

/// Onyx CLI - model export and publishing
#[derive(Parser, Debug)]
#[command(
    name = "onyx",
    author,
    version,
    about = "Onyx - export model checkpoints and publish the artifacts",
    long_about = "Onyx (onyx) converts model checkpoints into portable inference artifacts.\nArtifacts are either catalogued in a local models directory with a metadata.json snapshot,\nor uploaded to S3-compatible object storage."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (skips ~/.onyx/config.toml and ./onyx.toml discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the catalog into the local models directory
    ///
    /// Each model is exported, moved to `<models-dir>/<id>.<ext>`, and recorded
    /// in `<models-dir>/metadata.json`. Failures are recorded and skipped.
    Export(ExportArgs),

    /// Export models and upload them to object storage
    ///
    /// Each artifact is uploaded under its file name and an UPDATE statement
    /// pointing the model at its public URL is printed.
    Upload(UploadArgs),

    /// Inspect and validate catalogs
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<OnyxConfig> {
    let mut config = match path {
        Some(path) => OnyxConfig::load_from_file(path),
        None => OnyxConfig::discover_and_load(),
    }
    .context("Failed to load configuration")?;
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let config_path = args.config.as_ref();
    match command {
        Command::Export(export_args) => {
            let config = load_config(config_path)?;
            commands::export::execute(&config, export_args).await?;
        }
        Command::Upload(upload_args) => {
            let config = load_config(config_path)?;
            commands::upload::execute(&config, upload_args).await?;
        }
        Command::Catalog(catalog_command) => {
            let config = load_config(config_path)?;
            commands::catalog::execute(&config, catalog_command)?;
        }
        Command::Completions { shell } => {
            let mut cmd = Args::command();
            generate(shell, &mut cmd, "onyx", &mut std::io::stdout());
        }
    }

    Ok(())
}
