//! Object storage for migrated logs.

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::debug;

use crate::config::S3Config;
use crate::error::{MigrateError, Result};

/// Region assumed for custom endpoints when `AWS_REGION` is unset.
const DEFAULT_REGION: &str = "us-east-1";

/// Blob upload capability.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()>;
}

/// Object key of a step log: `/<prefix>/<step id>`.
///
/// Empty segments are dropped, so an empty prefix yields `/<step id>`.
pub fn log_key(prefix: &str, step_id: i64) -> String {
    let mut key = String::from("/");
    for segment in prefix.split('/').filter(|s| !s.is_empty()) {
        key.push_str(segment);
        key.push('/');
    }
    key.push_str(&step_id.to_string());
    key
}

/// [`BlobStore`] backed by an S3 bucket.
///
/// Credentials come from the usual AWS environment variables, profile or
/// instance metadata.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
}

impl S3BlobStore {
    pub fn new(config: &S3Config) -> Result<Self> {
        let region = match &config.endpoint {
            Some(endpoint) if !endpoint.is_empty() => Region::Custom {
                region: std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.into()),
                endpoint: endpoint.clone(),
            },
            _ => Region::from_default_env().map_err(|e| MigrateError::Storage(e.to_string()))?,
        };
        let credentials =
            Credentials::default().map_err(|e| MigrateError::Storage(e.to_string()))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| MigrateError::Storage(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }
        Ok(Self { bucket })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        let response = self
            .bucket
            .put_object(key, data)
            .await
            .map_err(|e| MigrateError::Storage(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(MigrateError::Storage(format!(
                "upload of {} failed with status {}",
                key, status
            )));
        }
        debug!(key, bytes = data.len(), "Uploaded object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_key() {
        assert_eq!(log_key("", 42), "/42");
        assert_eq!(log_key("logs", 42), "/logs/42");
        assert_eq!(log_key("/drone/logs/", 7), "/drone/logs/7");
    }
}
