use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use reqwest::Url;
use tracing::{debug, instrument};

use super::{KeyPage, ObjectStore, StoreError};
use crate::config::StorageSnapshot;

/// S3-compatible backend (Cloudflare R2, MinIO, AWS S3).
///
/// The SDK's own retry layer is disabled: a failed call surfaces immediately
/// and the operator decides whether to try again.
#[derive(Clone)]
pub struct R2Store {
    s3_client: S3Client,
}

impl R2Store {
    pub fn new(s3_client: S3Client) -> Self {
        Self { s3_client }
    }

    /// Build an S3 client from static credentials.
    pub fn from_snapshot(snapshot: &StorageSnapshot) -> Result<Self, StoreError> {
        let endpoint = validate_endpoint(&snapshot.endpoint)?;

        if snapshot.access_key.trim().is_empty() {
            return Err(StoreError::Configuration("access key is empty".to_string()));
        }
        if snapshot.secret_key.is_empty() {
            return Err(StoreError::Configuration("secret key is empty".to_string()));
        }

        let credentials = Credentials::new(
            snapshot.access_key.trim(),
            &snapshot.secret_key,
            None,
            None,
            "r2",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("auto"))
            .endpoint_url(endpoint)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();

        debug!("Built S3 client for endpoint {}", snapshot.endpoint);
        Ok(Self::new(S3Client::from_conf(s3_config)))
    }
}

/// Require an absolute http(s) URL. Returns it without a trailing slash.
fn validate_endpoint(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| {
        StoreError::Configuration(format!("malformed endpoint '{}': {}", raw, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(StoreError::Configuration(format!(
            "endpoint '{}' must use http or https",
            raw
        )));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl ObjectStore for R2Store {
    #[instrument(skip(self, continuation), level = "debug")]
    async fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<KeyPage, StoreError> {
        let mut request = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix);

        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }

        let output = request.send().await.map_err(|e| {
            StoreError::Backend(format!(
                "R2 list_objects error: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        let keys: Vec<String> = output
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| obj.key)
            .collect();

        let next = if output.is_truncated.unwrap_or(false) {
            output.next_continuation_token
        } else {
            None
        };

        debug!("Listed {} keys under prefix {}", keys.len(), prefix);
        Ok(KeyPage { keys, next })
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StoreError::Backend(format!(
                    "R2 delete_object error: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    #[instrument(skip(self, body), level = "debug", fields(body_len = body.len()))]
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .send()
            .await
            .map_err(|e| {
                StoreError::Backend(format!("R2 put_object error: {}", DisplayErrorContext(&e)))
            })?;
        Ok(())
    }
}
