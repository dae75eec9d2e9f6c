//! # Stowage Domain Layer
//!
//! Pure business logic for accepting uploaded assets. It follows hexagonal
//! architecture principles:
//!
//! - **Policy**: immutable validation and addressing rules
//! - **Entities**: upload requests, results, storage keys
//! - **Ports**: the `StorageBackend` trait the adapters implement
//! - **Services**: `IngestionService` orchestration
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (S3, HTTP,
//! filesystem writes). Backends live in `stowage-fs` and `stowage-s3`.
//!
//! ## Example
//!
//! ```rust
//! use stowage_domain::{AssetStream, IngestionRequest, IngestionService, StorageBackend};
//!
//! async fn example<B: StorageBackend>(service: IngestionService<B>) {
//!     let content = AssetStream::from_bytes("avatar.png", vec![0x89, 0x50, 0x4E, 0x47]);
//!     let request = IngestionRequest::new(content, "user-avatar").with_owner("42");
//!     let result = service.upload(request).await.unwrap();
//!     println!("Stored at {}", result.url);
//! }
//! ```

pub mod ingestion;
pub mod policy;
pub mod ports;

// Re-export commonly used types
pub use ingestion::{
    AssetCategory, AssetStream, IngestionError, IngestionRequest, IngestionResult,
    IngestionService, StorageKey, StorageStage,
};
pub use policy::{Policy, RemoteCredentials};
pub use ports::StorageBackend;
