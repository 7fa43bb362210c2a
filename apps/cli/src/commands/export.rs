//! Export command implementation.

use crate::commands::types::ExportArgs;
use crate::commands::{load_catalog, SilentProgressSink};
use crate::config::OnyxConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use onyx_catalog::{Catalog, ExportStatus, ModelsLayout, ProgressSink, StdoutProgressSink};
use onyx_export::{CatalogPipeline, HttpFetcher, LocalPublisher, UltralyticsExporter};
use serde_json::json;

pub async fn execute(config: &OnyxConfig, args: ExportArgs) -> Result<()> {
    let catalog_path = args.catalog.or_else(|| config.export_catalog());
    let catalog = load_catalog(catalog_path.as_deref(), Catalog::builtin_export)?;

    let models_dir = args.models_dir.unwrap_or_else(|| config.models_dir());
    let exporter = UltralyticsExporter::new(
        args.exporter.as_deref().unwrap_or_else(|| config.exporter_command()),
        args.work_dir.unwrap_or_else(|| config.work_dir()),
    );
    let publisher = LocalPublisher::new(ModelsLayout::new(models_dir.clone()));

    let progress: &dyn ProgressSink = if args.json { &SilentProgressSink } else { &StdoutProgressSink };

    if !args.json {
        println!();
        println!("{}", "Onyx model exporter".bold().cyan());
        println!(
            "  {} models ({} to export, {} pre-existing) -> {}",
            catalog.len(),
            catalog.to_export().count(),
            catalog.already_present().count(),
            models_dir.display().to_string().dimmed()
        );
        println!();
    }

    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let mut pipeline = CatalogPipeline::new(&exporter, publisher, progress);
    if !args.offline {
        pipeline = pipeline.with_fetcher(&fetcher);
    }

    let run = pipeline
        .run(&catalog)
        .await
        .with_context(|| format!("Export run aborted (models dir: {})", models_dir.display()))?;
    let summary = run.summary();

    if args.json {
        let out = json!({
            "summary": summary,
            "metadataPath": run.metadata_path,
            "results": run.results,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", "Summary".bold().cyan());
    println!("{}", "─".repeat(50));
    println!("  {} {}", "Succeeded:".green(), summary.succeeded);
    println!("  {} {}", "Failed:".red(), summary.failed);
    println!("  Total size: {:.2} MB", summary.total_megabytes());
    for result in run.results.iter().filter(|r| r.status == ExportStatus::Failed) {
        println!(
            "    {} {}: {}",
            "✗".red(),
            result.id(),
            result.error_detail.as_deref().unwrap_or("unknown error").dimmed()
        );
    }
    println!();
    println!("  Models in:   {}", models_dir.display().to_string().dimmed());
    println!("  Metadata in: {}", run.metadata_path.display().to_string().dimmed());
    println!();
    Ok(())
}
