//! Process-wide storage backend
//!
//! Chosen once at startup from the policy and injected into the ingestion
//! service. Requests never re-evaluate the choice.

use stowage_domain::{
    ingestion::{AssetStream, IngestionError, StorageKey},
    ports::StorageBackend,
    Policy,
};
use stowage_fs::LocalFsStorage;
use stowage_s3::S3ObjectStore;
use tracing::info;

/// The one storage backend active for the lifetime of the process
pub enum ActiveBackend {
    Local(LocalFsStorage),
    Remote(S3ObjectStore),
}

impl ActiveBackend {
    /// Remote store iff the policy has both endpoint and credentials, local otherwise
    pub async fn from_policy(policy: &Policy) -> Result<Self, IngestionError> {
        let backend = if policy.uses_remote() {
            Self::Remote(S3ObjectStore::from_policy(policy).await?)
        } else {
            Self::Local(LocalFsStorage::from_policy(policy))
        };
        info!(backend = backend.kind(), "Selected storage backend");
        Ok(backend)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }
}

impl StorageBackend for ActiveBackend {
    fn put(
        &self,
        key: &StorageKey,
        content: AssetStream,
    ) -> impl std::future::Future<Output = Result<(), IngestionError>> + Send {
        async move {
            match self {
                Self::Local(local) => local.put(key, content).await,
                Self::Remote(remote) => remote.put(key, content).await,
            }
        }
    }

    fn resolve_url(&self, key: &StorageKey) -> String {
        match self {
            Self::Local(local) => local.resolve_url(key),
            Self::Remote(remote) => remote.resolve_url(key),
        }
    }
}
