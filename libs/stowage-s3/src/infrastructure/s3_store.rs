//! S3 Object Store Implementation
//!
//! This module implements the `StorageBackend` trait on top of any
//! S3-compatible object store (AWS S3, MinIO, COS/OSS S3 gateways). Each
//! upload is a single `put_object` of the whole asset under its storage key.

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use bytes::Bytes;
use stowage_domain::{
    ingestion::{AssetStream, IngestionError, StorageKey, StorageStage},
    policy::{join_url, Policy, RemoteCredentials},
    ports::{ensure_declared_length, StorageBackend},
};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, instrument};

/// Region used for request signing when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Remote endpoint split into the API endpoint and the bucket name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEndpoint {
    /// `<scheme>://<host>[:port]`, where the S3 API is served
    pub api_endpoint: String,
    /// Bucket named by the first path segment
    pub bucket: String,
}

impl BucketEndpoint {
    /// Parse a path-style bucket URL such as `https://store.example/bucket`
    ///
    /// # Errors
    ///
    /// Returns `IngestionError::Config` if the URL has no scheme, no host, or
    /// does not name exactly one bucket.
    pub fn parse(endpoint: &str) -> Result<Self, IngestionError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let invalid = |why: &str| {
            IngestionError::config(format!(
                "Remote endpoint '{}' {}; expected <scheme>://<host>/<bucket>",
                endpoint, why
            ))
        };

        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| invalid("has no scheme"))?;
        if scheme.is_empty() {
            return Err(invalid("has no scheme"));
        }

        let (host, bucket) = rest
            .split_once('/')
            .ok_or_else(|| invalid("names no bucket"))?;
        if host.is_empty() {
            return Err(invalid("has no host"));
        }
        if bucket.is_empty() || bucket.contains('/') {
            return Err(invalid("must name exactly one bucket"));
        }

        Ok(Self {
            api_endpoint: format!("{}://{}", scheme, host),
            bucket: bucket.to_string(),
        })
    }
}

/// S3-based implementation of the StorageBackend port
///
/// Objects are stored under their storage key as-is, so the public URL of an
/// object is the bucket URL followed by the key.
///
/// ## Error Handling
///
/// Every SDK failure becomes `IngestionError::StorageIo` with stage
/// `Upload` and the SDK error as cause. Nothing is retried here.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_endpoint: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store from a configured client
    ///
    /// # Arguments
    ///
    /// * `client` - Configured AWS S3 client
    /// * `bucket` - Name of the bucket to write to
    /// * `public_endpoint` - Public bucket URL that object keys are appended to
    pub fn new(client: Client, bucket: String, public_endpoint: String) -> Self {
        info!(bucket = %bucket, endpoint = %public_endpoint, "Initializing S3ObjectStore");
        Self {
            client,
            bucket,
            public_endpoint,
        }
    }

    /// Build a client for the path-style bucket URL `endpoint` with static keys
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use stowage_domain::RemoteCredentials;
    /// use stowage_s3::infrastructure::S3ObjectStore;
    ///
    /// # async fn example() -> Result<(), stowage_domain::IngestionError> {
    /// let credentials = RemoteCredentials::new("AKIDEXAMPLE", "secret");
    /// let store = S3ObjectStore::connect("http://minio:9000/avatars", &credentials, None).await?;
    /// assert_eq!(store.bucket(), "avatars");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(
        endpoint: &str,
        credentials: &RemoteCredentials,
        region: Option<&str>,
    ) -> Result<Self, IngestionError> {
        let BucketEndpoint {
            api_endpoint,
            bucket,
        } = BucketEndpoint::parse(endpoint)?;
        let region = region
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_string();

        debug!(api_endpoint = %api_endpoint, region = %region, "Configuring S3 client");

        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "stowage-static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .endpoint_url(api_endpoint)
            .credentials_provider(provider)
            .load()
            .await;

        // Path-style addressing keeps `<endpoint>/<bucket>/<key>` URLs valid (MinIO too)
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self::new(
            Client::from_conf(s3_config),
            bucket,
            endpoint.trim().to_string(),
        ))
    }

    /// Build the remote store described by `policy`
    ///
    /// # Errors
    ///
    /// Returns `IngestionError::Config` if the policy does not configure both
    /// a remote endpoint and complete credentials, or the endpoint is malformed.
    pub async fn from_policy(policy: &Policy) -> Result<Self, IngestionError> {
        let (endpoint, credentials) = policy.remote().ok_or_else(|| {
            IngestionError::config("Remote endpoint and credentials are not configured")
        })?;
        Self::connect(endpoint, credentials, policy.remote_region.as_deref()).await
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl StorageBackend for S3ObjectStore {
    #[instrument(skip(self, content), fields(key = %key, declared_length = content.declared_length()))]
    fn put(
        &self,
        key: &StorageKey,
        content: AssetStream,
    ) -> impl std::future::Future<Output = Result<(), IngestionError>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = key.to_string();

        async move {
            let declared = content.declared_length();
            let mut data = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));

            content
                .into_reader()
                .take(declared.saturating_add(1))
                .read_to_end(&mut data)
                .await
                .map_err(|err| {
                    error!(key = %key, error = ?err, "Failed to read asset content");
                    IngestionError::storage_io(StorageStage::Upload, err)
                })?;
            ensure_declared_length(StorageStage::Upload, data.len() as u64, declared)?;

            debug!(key = %key, bucket = %bucket, "Uploading asset to S3");

            let length = data.len();
            let body = ByteStream::from(Bytes::from(data));

            match client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .content_length(i64::try_from(length).unwrap_or(i64::MAX))
                .body(body)
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, size = length, "Successfully uploaded asset to S3");
                    Ok(())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to upload asset to S3");
                    Err(IngestionError::storage_io(StorageStage::Upload, err))
                }
            }
        }
    }

    fn resolve_url(&self, key: &StorageKey) -> String {
        join_url(&self.public_endpoint, key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> RemoteCredentials {
        RemoteCredentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI")
    }

    #[test]
    fn test_parse_bucket_endpoint() {
        let parsed = BucketEndpoint::parse("https://store.example/bucket").unwrap();
        assert_eq!(parsed.api_endpoint, "https://store.example");
        assert_eq!(parsed.bucket, "bucket");

        let parsed = BucketEndpoint::parse("http://minio:9000/avatars/").unwrap();
        assert_eq!(parsed.api_endpoint, "http://minio:9000");
        assert_eq!(parsed.bucket, "avatars");
    }

    #[test]
    fn test_parse_rejects_malformed_endpoints() {
        for bad in [
            "store.example/bucket",
            "https://store.example",
            "https://store.example/",
            "https:///bucket",
            "https://store.example/bucket/prefix",
            "://store.example/bucket",
        ] {
            let err = BucketEndpoint::parse(bad).unwrap_err();
            assert!(matches!(err, IngestionError::Config(_)), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_resolve_url_appends_key_to_bucket_url() {
        let store = S3ObjectStore::connect("https://store.example/bucket", &credentials(), None)
            .await
            .unwrap();
        let key = StorageKey::new("images/babies/baby-avatar_20240101_000000.jpg");

        assert_eq!(store.bucket(), "bucket");
        assert_eq!(
            store.resolve_url(&key),
            "https://store.example/bucket/images/babies/baby-avatar_20240101_000000.jpg"
        );
    }

    #[tokio::test]
    async fn test_resolve_url_is_slash_idempotent() {
        let store = S3ObjectStore::connect("https://store.example/bucket/", &credentials(), Some("eu-west-1"))
            .await
            .unwrap();
        let key = StorageKey::new("images/users/user-avatar_20240101_000000.png");

        assert_eq!(
            store.resolve_url(&key),
            "https://store.example/bucket/images/users/user-avatar_20240101_000000.png"
        );
    }

    #[tokio::test]
    async fn test_from_policy_requires_remote_configuration() {
        let err = S3ObjectStore::from_policy(&Policy::default()).await.err().unwrap();
        assert!(matches!(err, IngestionError::Config(_)));

        let policy = Policy {
            remote_endpoint: Some("https://store.example/bucket".to_string()),
            remote_credentials: Some(credentials()),
            ..Policy::default()
        };
        let store = S3ObjectStore::from_policy(&policy).await.unwrap();
        let key = StorageKey::new("images/users/a.png");
        assert_eq!(store.resolve_url(&key), policy.public_url(key.as_str()));
    }
}
