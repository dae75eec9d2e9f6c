//! DTOs for upload endpoints

use serde::{Deserialize, Serialize};
use stowage_domain::IngestionResult;
use utoipa::ToSchema;

/// Multipart form accepted by the upload endpoint
///
/// Only used to describe the request in the OpenAPI document; the handler
/// reads the parts directly.
#[allow(dead_code)]
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadForm {
    /// The file to store
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Asset category tag
    #[serde(rename = "type")]
    #[schema(example = "user-avatar")]
    pub category: String,
    /// Identifier of the record owning the asset
    #[schema(example = "42")]
    pub related_id: Option<String>,
}

/// Response body for a stored asset
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Public URL of the stored asset
    #[schema(example = "http://localhost:8080/uploads/images/users/user-avatar_42_20240101_000000.png")]
    pub url: String,
    /// Backend-agnostic storage key
    #[schema(example = "images/users/user-avatar_42_20240101_000000.png")]
    pub storage_key: String,
    /// Stored filename
    #[schema(example = "user-avatar_42_20240101_000000.png")]
    pub filename: String,
    /// Size in bytes
    #[schema(example = 20480)]
    pub size: u64,
}

impl From<IngestionResult> for UploadResponse {
    fn from(result: IngestionResult) -> Self {
        Self {
            url: result.url,
            storage_key: result.storage_key,
            filename: result.filename,
            size: result.size_bytes,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "File cannot be empty")]
    pub error: String,
}
