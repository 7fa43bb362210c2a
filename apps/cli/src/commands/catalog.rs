//! Catalog inspection commands.

use crate::commands::load_catalog;
use crate::commands::types::CatalogCommand;
use crate::config::OnyxConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use onyx_catalog::Catalog;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub fn execute(config: &OnyxConfig, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::List { catalog, upload, json } => {
            let path = catalog.or_else(|| if upload { config.upload_catalog() } else { config.export_catalog() });
            let builtin = if upload { Catalog::builtin_upload } else { Catalog::builtin_export };
            list(&load_catalog(path.as_deref(), builtin)?, json)
        }
        CatalogCommand::Check { path } => check(&path),
    }
}

fn list(catalog: &Catalog, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Catalog ({} models)", catalog.len()).bold().cyan());
    let opset = catalog.export.opset.map_or_else(|| "default".to_string(), |o| o.to_string());
    println!(
        "  format={} opset={} simplify={}",
        catalog.export.format, opset, catalog.export.simplify
    );
    println!();

    let rows: Vec<ModelRow> = catalog
        .models
        .iter()
        .map(|model| ModelRow {
            id: model.id.clone(),
            source: if model.already_present {
                if model.url.is_some() { "(download)" } else { "(on disk)" }.to_string()
            } else {
                model.source_ref.clone()
            },
            input: format!("{}x{}", model.input_shape.width, model.input_shape.height),
            task: model.display.technical.clone().unwrap_or_else(|| "-".to_string()),
            name: model.display.name.clone(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
    println!();
    Ok(())
}

fn check(path: &std::path::Path) -> Result<()> {
    let catalog = Catalog::load(path).with_context(|| format!("Invalid catalog: {}", path.display()))?;
    println!(
        "{} {}: {} models ({} to export, {} pre-existing)",
        "✓".green(),
        path.display(),
        catalog.len(),
        catalog.to_export().count(),
        catalog.already_present().count()
    );
    Ok(())
}
