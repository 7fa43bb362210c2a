//! CLI configuration loading and merging.
//!
//! Configuration precedence:
//! 1. CLI arguments (handled by clap)
//! 2. Environment variables (`ONYX_*`)
//! 3. Local config file (./onyx.toml)
//! 4. Global config file (~/.onyx/config.toml)
//! 5. Defaults

use anyhow::{Context, Result};
use onyx_export::{S3StoreConfig, UpdateStatement};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_EXPORTER: &str = "yolo";
pub const DEFAULT_BUCKET: &str = "visionhub-models";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnyxConfig {
    /// Destination of exported artifacts and metadata.json
    #[serde(default)]
    pub models_dir: Option<String>,

    /// Catalog used by `onyx export` instead of the built-in one
    #[serde(default)]
    pub export_catalog: Option<String>,

    /// Catalog used by `onyx upload` instead of the built-in one
    #[serde(default)]
    pub upload_catalog: Option<String>,

    #[serde(default)]
    pub exporter: ExporterConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub statement: StatementConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Export tool to run (default: `yolo`)
    #[serde(default)]
    pub command: Option<String>,

    /// Directory the tool runs in; checkpoints are downloaded here
    #[serde(default)]
    pub work_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    /// Public base URL objects are served from
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementConfig {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub url_column: Option<String>,
    #[serde(default)]
    pub slug_column: Option<String>,
}

/// Environment variables and the setting each one overrides.
const ENV_OVERRIDES: &[(&str, fn(&mut OnyxConfig, String))] = &[
    ("ONYX_MODELS_DIR", |c, v| c.models_dir = Some(v)),
    ("ONYX_EXPORT_CATALOG", |c, v| c.export_catalog = Some(v)),
    ("ONYX_UPLOAD_CATALOG", |c, v| c.upload_catalog = Some(v)),
    ("ONYX_EXPORTER", |c, v| c.exporter.command = Some(v)),
    ("ONYX_WORK_DIR", |c, v| c.exporter.work_dir = Some(v)),
    ("ONYX_R2_ACCOUNT_ID", |c, v| c.storage.account_id = Some(v)),
    ("ONYX_R2_ENDPOINT", |c, v| c.storage.endpoint = Some(v)),
    ("ONYX_R2_BUCKET", |c, v| c.storage.bucket = Some(v)),
    ("ONYX_R2_PUBLIC_URL", |c, v| c.storage.public_url = Some(v)),
    ("ONYX_R2_ACCESS_KEY", |c, v| c.storage.access_key = Some(v)),
    ("ONYX_R2_SECRET_KEY", |c, v| c.storage.secret_key = Some(v)),
];

fn merge_opt(target: &mut Option<String>, other: &Option<String>) {
    if let Some(value) = other {
        *target = Some(value.clone());
    }
}

impl OnyxConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".onyx").join("config.toml"))
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from("onyx.toml")
    }

    /// Load the global then the local config file (local wins), ignoring
    /// files that do not exist. Files that exist but do not parse are errors.
    pub fn discover_and_load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(global) = Self::default_global_path().filter(|p| p.exists()) {
            config.merge(&Self::load_from_file(&global)?);
        }

        let local = Self::default_local_path();
        if local.exists() {
            config.merge(&Self::load_from_file(&local)?);
        }

        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        merge_opt(&mut self.models_dir, &other.models_dir);
        merge_opt(&mut self.export_catalog, &other.export_catalog);
        merge_opt(&mut self.upload_catalog, &other.upload_catalog);
        merge_opt(&mut self.exporter.command, &other.exporter.command);
        merge_opt(&mut self.exporter.work_dir, &other.exporter.work_dir);
        merge_opt(&mut self.storage.account_id, &other.storage.account_id);
        merge_opt(&mut self.storage.endpoint, &other.storage.endpoint);
        merge_opt(&mut self.storage.region, &other.storage.region);
        merge_opt(&mut self.storage.bucket, &other.storage.bucket);
        merge_opt(&mut self.storage.public_url, &other.storage.public_url);
        merge_opt(&mut self.storage.access_key, &other.storage.access_key);
        merge_opt(&mut self.storage.secret_key, &other.storage.secret_key);
        merge_opt(&mut self.statement.table, &other.statement.table);
        merge_opt(&mut self.statement.url_column, &other.statement.url_column);
        merge_opt(&mut self.statement.slug_column, &other.statement.slug_column);
    }

    /// Apply `ONYX_*` overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for &(name, apply) in ENV_OVERRIDES {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                apply(self, value);
            }
        }
    }

    pub fn models_dir(&self) -> PathBuf {
        PathBuf::from(self.models_dir.as_deref().unwrap_or(DEFAULT_MODELS_DIR))
    }

    pub fn export_catalog(&self) -> Option<PathBuf> {
        self.export_catalog.as_deref().map(PathBuf::from)
    }

    pub fn upload_catalog(&self) -> Option<PathBuf> {
        self.upload_catalog.as_deref().map(PathBuf::from)
    }

    pub fn exporter_command(&self) -> &str {
        self.exporter.command.as_deref().unwrap_or(DEFAULT_EXPORTER)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.exporter
            .work_dir
            .as_deref()
            .map_or_else(|| PathBuf::from(".onyx").join("staging"), PathBuf::from)
    }

    pub fn store_config(&self) -> S3StoreConfig {
        let storage = &self.storage;
        S3StoreConfig {
            account_id: storage.account_id.clone(),
            endpoint: storage.endpoint.clone(),
            bucket: storage.bucket.clone().unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            access_key: storage.access_key.clone().unwrap_or_default(),
            secret_key: storage.secret_key.clone().unwrap_or_default(),
            region: storage.region.clone(),
        }
    }

    pub fn update_statement(&self) -> UpdateStatement {
        let defaults = UpdateStatement::default();
        UpdateStatement {
            table: self.statement.table.clone().unwrap_or(defaults.table),
            url_column: self.statement.url_column.clone().unwrap_or(defaults.url_column),
            slug_column: self.statement.slug_column.clone().unwrap_or(defaults.slug_column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = OnyxConfig::default();
        assert_eq!(config.models_dir(), PathBuf::from("models"));
        assert_eq!(config.exporter_command(), "yolo");
        assert_eq!(config.store_config().bucket, "visionhub-models");
        assert_eq!(config.update_statement(), UpdateStatement::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("onyx.toml");
        std::fs::write(
            &path,
            r#"
models_dir = "out/models"

[exporter]
command = "/opt/venv/bin/yolo"

[storage]
account_id = "abc123"
public_url = "https://pub-xxx.r2.dev"

[statement]
url_column = "model_url"
"#,
        )
        .unwrap();

        let config = OnyxConfig::load_from_file(&path).unwrap();
        assert_eq!(config.models_dir(), PathBuf::from("out/models"));
        assert_eq!(config.exporter_command(), "/opt/venv/bin/yolo");
        assert_eq!(config.storage.public_url.as_deref(), Some("https://pub-xxx.r2.dev"));
        assert_eq!(config.update_statement().url_column, "model_url");
        assert_eq!(config.update_statement().table, "models");
    }

    #[test]
    fn test_load_from_file_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("onyx.toml");
        std::fs::write(&path, "models_dir = [").unwrap();

        let err = OnyxConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse configuration file"));
    }

    #[test]
    fn test_merge_prefers_other_when_set() {
        let mut base = OnyxConfig { models_dir: Some("a".to_string()), ..OnyxConfig::default() };
        base.storage.bucket = Some("bucket-a".to_string());

        let mut other = OnyxConfig::default();
        other.storage.bucket = Some("bucket-b".to_string());
        base.merge(&other);

        assert_eq!(base.models_dir.as_deref(), Some("a"));
        assert_eq!(base.storage.bucket.as_deref(), Some("bucket-b"));
    }

    #[test]
    fn test_export_and_upload_catalogs_are_separate() {
        let mut config: OnyxConfig = toml::from_str("export_catalog = \"my-export.toml\"\n").unwrap();
        assert_eq!(config.export_catalog(), Some(PathBuf::from("my-export.toml")));
        assert_eq!(config.upload_catalog(), None);

        let env: HashMap<&str, &str> = HashMap::from([("ONYX_UPLOAD_CATALOG", "my-upload.toml")]);
        config.apply_env(|name| env.get(name).map(|v| (*v).to_string()));
        assert_eq!(config.export_catalog(), Some(PathBuf::from("my-export.toml")));
        assert_eq!(config.upload_catalog(), Some(PathBuf::from("my-upload.toml")));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = OnyxConfig::default();
        config.storage.access_key = Some("from-file".to_string());

        let env: HashMap<&str, &str> = HashMap::from([
            ("ONYX_R2_ACCESS_KEY", "from-env"),
            ("ONYX_R2_SECRET_KEY", "secret"),
            ("ONYX_MODELS_DIR", ""),
        ]);
        config.apply_env(|name| env.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.storage.access_key.as_deref(), Some("from-env"));
        assert_eq!(config.store_config().secret_key, "secret");
        assert_eq!(config.models_dir(), PathBuf::from("models"));
    }
}
