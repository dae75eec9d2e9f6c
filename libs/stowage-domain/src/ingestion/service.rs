//! Ingestion service - Business logic orchestration
//!
//! Validator, key deriver, storage backend and URL synthesis, in that order.
//! The service keeps no state between calls, so one instance can serve any
//! number of concurrent uploads.

use chrono::{DateTime, Utc};

use super::key::{derive_key, file_extension};
use super::validator::validate;
use super::{IngestionError, IngestionRequest, IngestionResult};
use crate::policy::Policy;
use crate::ports::StorageBackend;

/// Service accepting uploaded assets into the active storage backend
///
/// Business rules enforced here:
/// - Empty or missing content is refused before anything else
/// - Policy and category checks run before any storage I/O
/// - The backend is called exactly once per accepted upload
///
/// ## Static Dispatch
///
/// Generic over the `StorageBackend` chosen at startup. The backend is
/// injected, never looked up at call time.
pub struct IngestionService<B> {
    backend: B,
    policy: Policy,
}

impl<B> IngestionService<B>
where
    B: StorageBackend,
{
    /// Create a new IngestionService over `backend`, enforcing `policy`
    pub fn new(backend: B, policy: Policy) -> Self {
        Self { backend, policy }
    }

    /// Validate, name and store an uploaded asset
    ///
    /// # Errors
    ///
    /// - `IngestionError::InvalidInput` if the content is missing or empty
    /// - `IngestionError::PolicyRejected` if type or size is outside the policy
    /// - `IngestionError::UnsupportedCategory` if the category tag is unknown
    /// - `IngestionError::StorageIo` if the backend fails to store the bytes
    pub async fn upload(&self, request: IngestionRequest) -> Result<IngestionResult, IngestionError> {
        self.upload_at(request, Utc::now()).await
    }

    /// Same as [`upload`](Self::upload) with an explicit clock reading
    pub async fn upload_at(
        &self,
        request: IngestionRequest,
        now: DateTime<Utc>,
    ) -> Result<IngestionResult, IngestionError> {
        let IngestionRequest {
            content,
            content_type,
            category,
            owner_reference,
        } = request;

        // Business rule: nothing to store means nothing to do
        let content = match content {
            Some(content) if !content.is_empty() => content,
            _ => return Err(IngestionError::invalid_input("File cannot be empty")),
        };

        let extension = file_extension(content.filename()).unwrap_or_default();
        validate(
            &content_type,
            &extension,
            content.declared_length(),
            &self.policy,
        )?;

        let derived = derive_key(
            &category,
            owner_reference.as_deref(),
            content.filename(),
            now,
        )?;

        let size_bytes = content.declared_length();
        self.backend.put(&derived.storage_key, content).await?;

        Ok(IngestionResult {
            url: self.backend.resolve_url(&derived.storage_key),
            storage_key: derived.storage_key.into(),
            filename: derived.filename,
            size_bytes,
        })
    }

    /// Get the policy this service enforces
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Get the active storage backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
