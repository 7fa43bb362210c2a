//! Upload-mode publisher: S3-compatible object storage plus the database
//! statement that points a model row at its public URL.

use crate::error::{PipelineError, PublishFailure};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::path::Path;
use tracing::info;

/// Write-only object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Single-shot PUT of a local file under `key`. No retry.
    async fn put_file(&self, key: &str, path: &Path) -> Result<(), PublishFailure>;
}

/// Connection settings for an S3-compatible endpoint (Cloudflare R2 by default).
#[derive(Clone, Default)]
pub struct S3StoreConfig {
    /// R2 account; yields `https://{account_id}.r2.cloudflarestorage.com`.
    pub account_id: Option<String>,
    /// Explicit endpoint; wins over `account_id`.
    pub endpoint: Option<String>,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Defaults to `auto`, which is what R2 expects.
    pub region: Option<String>,
}

impl std::fmt::Debug for S3StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StoreConfig")
            .field("account_id", &self.account_id)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl S3StoreConfig {
    pub fn endpoint_url(&self) -> Result<String, PipelineError> {
        if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        match self.account_id.as_deref().filter(|a| !a.trim().is_empty()) {
            Some(account) => Ok(format!("https://{account}.r2.cloudflarestorage.com")),
            None => Err(PipelineError::Store("either an endpoint or an account id is required".to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bucket.trim().is_empty() {
            return Err(PipelineError::Store("bucket name is required".to_string()));
        }
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(PipelineError::Store("access key and secret key are required".to_string()));
        }
        self.endpoint_url()?;
        Ok(())
    }
}

pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client with static credentials and SigV4 signing.
    pub async fn connect(config: &S3StoreConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        let region = config.region.clone().unwrap_or_else(|| "auto".to_string());

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "onyx-static",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .endpoint_url(endpoint.clone())
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared).force_path_style(true).build();

        info!(endpoint = %endpoint, bucket = %config.bucket, "Object store client ready");
        Ok(Self { client: S3Client::from_conf(s3_config), bucket: config.bucket.clone() })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<(), PublishFailure> {
        let upload_err = |message: String| PublishFailure::Upload { key: key.to_string(), message };

        let body = ByteStream::from_path(path).await.map_err(|e| upload_err(e.to_string()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| upload_err(DisplayErrorContext(&e).to_string()))?;

        info!(bucket = %self.bucket, key, "Uploaded artifact");
        Ok(())
    }
}

/// `{base}/{filename}` with exactly one separating slash.
#[must_use]
pub fn public_url(base: &str, filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), filename.trim_start_matches('/'))
}

/// Template of the statement printed for each uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub table: String,
    pub url_column: String,
    pub slug_column: String,
}

impl Default for UpdateStatement {
    fn default() -> Self {
        Self {
            table: "models".to_string(),
            url_column: "onnx_model_url".to_string(),
            slug_column: "slug".to_string(),
        }
    }
}

impl UpdateStatement {
    #[must_use]
    pub fn render(&self, public_url: &str, slug: &str) -> String {
        format!(
            "UPDATE {} SET {} = {} WHERE {} = {};",
            self.table,
            self.url_column,
            quote(public_url),
            self.slug_column,
            quote(slug)
        )
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_matches_template() {
        let sql = UpdateStatement::default().render("https://pub-xxx.r2.dev/yolov8n.onnx", "yolov8n");
        assert_eq!(
            sql,
            "UPDATE models SET onnx_model_url = 'https://pub-xxx.r2.dev/yolov8n.onnx' WHERE slug = 'yolov8n';"
        );
    }

    #[test]
    fn test_statement_escapes_quotes() {
        let sql = UpdateStatement::default().render("https://x/o'brien.onnx", "o'brien");
        assert!(sql.ends_with("WHERE slug = 'o''brien';"));
        assert!(sql.contains("'https://x/o''brien.onnx'"));
    }

    #[test]
    fn test_public_url_joins_with_single_slash() {
        assert_eq!(public_url("https://pub-xxx.r2.dev", "a.onnx"), "https://pub-xxx.r2.dev/a.onnx");
        assert_eq!(public_url("https://pub-xxx.r2.dev/", "a.onnx"), "https://pub-xxx.r2.dev/a.onnx");
    }

    #[test]
    fn test_endpoint_from_account_or_override() {
        let mut config = S3StoreConfig { account_id: Some("abc123".to_string()), ..S3StoreConfig::default() };
        assert_eq!(config.endpoint_url().unwrap(), "https://abc123.r2.cloudflarestorage.com");

        config.endpoint = Some("http://localhost:9000/".to_string());
        assert_eq!(config.endpoint_url().unwrap(), "http://localhost:9000");

        let empty = S3StoreConfig::default();
        assert!(empty.endpoint_url().is_err());
    }

    #[test]
    fn test_validate_requires_bucket_and_credentials() {
        let mut config = S3StoreConfig {
            account_id: Some("abc".to_string()),
            bucket: "visionhub-models".to_string(),
            ..S3StoreConfig::default()
        };
        assert!(config.validate().is_err());

        config.access_key = "key".to_string();
        config.secret_key = "secret".to_string();
        assert!(config.validate().is_ok());

        config.bucket = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let config = S3StoreConfig { secret_key: "hunter2".to_string(), ..S3StoreConfig::default() };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_connect_builds_client_without_network() {
        let config = S3StoreConfig {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            bucket: "visionhub-models".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            ..S3StoreConfig::default()
        };
        let store = S3ObjectStore::connect(&config).await.unwrap();
        assert_eq!(store.bucket(), "visionhub-models");
    }
}
