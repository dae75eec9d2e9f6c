//! # Stowage Local Filesystem Adapter
//!
//! `StorageBackend` implementation that writes assets below a local storage
//! root, for deployments without a remote object store.

pub mod infrastructure;

pub use infrastructure::LocalFsStorage;
