//! Ingestion domain module
//!
//! Categories, key derivation, policy validation and the service that ties
//! them to a storage backend.

mod category;
mod entity;
mod error;
mod key;
mod service;
pub mod validator;

pub use category::AssetCategory;
pub use entity::{AssetStream, IngestionRequest, IngestionResult};
pub use error::{BoxError, IngestionError, PolicyViolation, Result, StorageStage};
pub use key::{
    derive_key, derive_key_for, file_extension, DerivedKey, StorageKey, DEFAULT_EXTENSION,
    KEY_NAMESPACE,
};
pub use service::IngestionService;
