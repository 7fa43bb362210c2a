//! Upload command implementation.

use crate::commands::load_catalog;
use crate::commands::types::UploadArgs;
use crate::config::OnyxConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use onyx_catalog::{Catalog, ModelsLayout, StdoutProgressSink};
use onyx_export::{S3ObjectStore, UltralyticsExporter, UploadOutcome, UploadPipeline};

pub async fn execute(config: &OnyxConfig, args: UploadArgs) -> Result<()> {
    let catalog_path = args.catalog.or_else(|| config.upload_catalog());
    let catalog = load_catalog(catalog_path.as_deref(), Catalog::builtin_upload)?;

    let public_url = args
        .public_url
        .or_else(|| config.storage.public_url.clone())
        .filter(|url| !url.trim().is_empty())
        .context("A public URL is required: pass --public-url or set storage.public_url / ONYX_R2_PUBLIC_URL")?;

    let mut store_config = config.store_config();
    if let Some(bucket) = args.bucket {
        store_config.bucket = bucket;
    }
    let store = S3ObjectStore::connect(&store_config).await.context("Failed to create storage client")?;

    let exporter = UltralyticsExporter::new(
        args.exporter.as_deref().unwrap_or_else(|| config.exporter_command()),
        args.work_dir.unwrap_or_else(|| config.work_dir()),
    );

    println!();
    println!("{}", "Onyx model uploader".bold().cyan());
    println!("  {} models -> bucket {}", catalog.len(), store_config.bucket.cyan());
    println!();

    let models = ModelsLayout::new(args.models_dir.unwrap_or_else(|| config.models_dir()));
    let reports =
        UploadPipeline::new(&exporter, &store, models, public_url, config.update_statement(), &StdoutProgressSink)
            .run(&catalog)
            .await;

    let mut uploaded = 0usize;
    println!();
    for report in &reports {
        match &report.outcome {
            UploadOutcome::Uploaded { public_url, statement, .. } => {
                uploaded += 1;
                println!("{} {} -> {}", "✓".green(), report.model_id, public_url);
                println!("{statement}");
            }
            UploadOutcome::Failed(error) => {
                println!("{} {}: {}", "✗".red(), report.model_id, error.to_string().dimmed());
            }
        }
    }

    println!();
    println!("  {} {}", "Uploaded:".green(), uploaded);
    println!("  {} {}", "Failed:".red(), reports.len() - uploaded);
    println!();
    Ok(())
}
