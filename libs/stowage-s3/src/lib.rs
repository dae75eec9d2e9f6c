//! # Stowage S3 Adapter
//!
//! `StorageBackend` implementation for S3-compatible object stores.

pub mod infrastructure;

pub use infrastructure::S3ObjectStore;
