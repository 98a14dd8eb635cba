//! S3-compatible client implementation.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::SdkConfig;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectMetadata, ObjectStore};

/// S3 caps a single listing page at 1000 keys.
const MAX_PAGE_SIZE: usize = 1000;

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name
    pub bucket_name: String,
    /// Custom endpoint (R2, MinIO, GCS interop). `None` uses AWS.
    pub endpoint_url: Option<String>,
    /// Region ("auto" works for R2)
    pub region: String,
    /// Static credentials. When absent the default AWS chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Path-style addressing, needed by most non-AWS endpoints
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let endpoint_url = std::env::var("STORAGE_ENDPOINT_URL").ok();
        Ok(Self {
            bucket_name: std::env::var("STORAGE_BUCKET")
                .map_err(|_| StorageError::config_error("STORAGE_BUCKET not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY").ok(),
            force_path_style: std::env::var("STORAGE_FORCE_PATH_STYLE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(endpoint_url.is_some()),
            endpoint_url,
        })
    }
}

/// Object store backed by an S3-compatible bucket.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a new client from configuration.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let base = load_sdk_config().await;
        let mut builder = Builder::from(&base)
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .force_path_style(config.force_path_style);

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        match (config.access_key_id, config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials = Credentials::new(key_id, secret, None, None, "clinicvid");
                builder = builder.credentials_provider(credentials);
            }
            (None, None) => {}
            _ => {
                return Err(StorageError::config_error(
                    "STORAGE_ACCESS_KEY_ID and STORAGE_SECRET_ACCESS_KEY must be set together",
                ))
            }
        }

        info!(bucket = %config.bucket_name, "Configured S3 object store");

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = StorageConfig::from_env()?;
        Self::new(config).await
    }
}

async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_objects(
        &self,
        prefix: &str,
        max_results: Option<usize>,
    ) -> StorageResult<Vec<String>> {
        debug!("Listing objects with prefix: {}", prefix);

        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page_size = match max_results {
                Some(max) => (max - keys.len()).min(MAX_PAGE_SIZE),
                None => MAX_PAGE_SIZE,
            };

            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .max_keys(page_size as i32);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::list_failed(DisplayErrorContext(&e).to_string()))?;

            let truncated = response.is_truncated().unwrap_or(false);
            let page = response
                .contents
                .unwrap_or_default()
                .into_iter()
                .filter_map(|obj| obj.key);

            continuation_token = accumulate_page(
                &mut keys,
                page,
                truncated,
                response.next_continuation_token,
                max_results,
            );
            if continuation_token.is_none() {
                break;
            }
        }

        debug!("Listed {} objects under {}", keys.len(), prefix);
        Ok(keys)
    }

    async fn read_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| get_object_error(key, e))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    async fn write_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
        metadata: Option<&ObjectMetadata>,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", content.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .set_metadata(metadata.cloned())
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

/// Fold one listing page into `keys`.
///
/// Returns the continuation token for the next request, or `None` when the
/// listing is done: the backend reported no more pages, `max_results` was
/// reached, or a truncated page came back without a token.
fn accumulate_page(
    keys: &mut Vec<String>,
    page: impl IntoIterator<Item = String>,
    truncated: bool,
    next_token: Option<String>,
    max_results: Option<usize>,
) -> Option<String> {
    keys.extend(page);

    if let Some(max) = max_results {
        if keys.len() >= max {
            keys.truncate(max);
            return None;
        }
    }

    match next_token {
        Some(token) if truncated => Some(token),
        None if truncated => {
            warn!(
                listed = keys.len(),
                "Listing page truncated without a continuation token, stopping"
            );
            None
        }
        _ => None,
    }
}

fn get_object_error(key: &str, err: SdkError<GetObjectError>) -> StorageError {
    if err.as_service_error().is_some_and(GetObjectError::is_no_such_key) {
        StorageError::not_found(key)
    } else {
        StorageError::DownloadFailed(DisplayErrorContext(&err).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::http::HttpResponse;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::primitives::SdkBody;
    use aws_sdk_s3::types::error::NoSuchKey;

    fn http_response(status: u16) -> HttpResponse {
        HttpResponse::new(status.try_into().unwrap(), SdkBody::empty())
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_key_maps_to_not_found() {
        let err = SdkError::service_error(
            GetObjectError::NoSuchKey(NoSuchKey::builder().build()),
            http_response(404),
        );

        let mapped = get_object_error("bundles/c1/d1/bundle.json", err);

        assert!(mapped.is_not_found());
        assert_eq!(mapped.to_string(), "Not found: bundles/c1/d1/bundle.json");
    }

    #[test]
    fn test_other_service_errors_are_download_failures() {
        let err = SdkError::service_error(
            GetObjectError::generic(ErrorMetadata::builder().code("AccessDenied").build()),
            http_response(403),
        );

        let mapped = get_object_error("bundles/c1/d1/bundle.json", err);

        assert!(matches!(mapped, StorageError::DownloadFailed(_)));
        assert!(mapped.to_string().contains("AccessDenied"));
    }

    #[test]
    fn test_accumulate_follows_continuation_token() {
        let mut listed = Vec::new();

        let next = accumulate_page(&mut listed, keys(&["a", "b"]), true, Some("t1".into()), None);
        assert_eq!(next.as_deref(), Some("t1"));

        let next = accumulate_page(&mut listed, keys(&["c"]), false, None, None);
        assert_eq!(next, None);
        assert_eq!(listed, keys(&["a", "b", "c"]));
    }

    #[test]
    fn test_accumulate_stops_on_truncated_page_without_token() {
        let mut listed = Vec::new();

        let next = accumulate_page(&mut listed, keys(&["a"]), true, None, None);

        assert_eq!(next, None);
        assert_eq!(listed, keys(&["a"]));
    }

    #[test]
    fn test_accumulate_ignores_token_on_final_page() {
        let mut listed = Vec::new();

        let next = accumulate_page(&mut listed, keys(&["a"]), false, Some("stale".into()), None);

        assert_eq!(next, None);
    }

    #[test]
    fn test_accumulate_caps_at_max_results() {
        let mut listed = keys(&["a"]);

        let next = accumulate_page(&mut listed, keys(&["b", "c"]), true, Some("t2".into()), Some(2));

        assert_eq!(next, None);
        assert_eq!(listed, keys(&["a", "b"]));
    }
}
