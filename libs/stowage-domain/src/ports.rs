//! Ports (trait definitions) for external dependencies
//!
//! The domain says what it needs from a storage backend; the adapter crates
//! provide it. Exactly one implementation is active in a running process.
//!
//! ## Static Dispatch
//!
//! Native async trait methods with `impl Future` return types, no
//! `async_trait`. The service is monomorphized over the backend type.

use std::future::Future;

use crate::ingestion::{AssetStream, IngestionError, StorageKey, StorageStage};

/// Port for persisting asset bytes
///
/// Implementations must:
/// - Consume the stream exactly once and store all of it under `key`
/// - Fail when the stream's length differs from its declared length
/// - Report every failure as `IngestionError::StorageIo` naming the stage
/// - Never retry on their own
pub trait StorageBackend: Send + Sync {
    /// Durably store `content` under `key`
    ///
    /// Storing under an existing key replaces the previous bytes.
    ///
    /// # Errors
    ///
    /// Returns `IngestionError::StorageIo` if any step of the write fails, or
    /// `IngestionError::InvalidInput` if `key` cannot be addressed by this
    /// backend.
    fn put(
        &self,
        key: &StorageKey,
        content: AssetStream,
    ) -> impl Future<Output = Result<(), IngestionError>> + Send;

    /// Public URL under which the object stored at `key` is reachable
    fn resolve_url(&self, key: &StorageKey) -> String;
}

/// Fail with a storage error if `actual` bytes were seen instead of `declared`
pub fn ensure_declared_length(
    stage: StorageStage,
    actual: u64,
    declared: u64,
) -> Result<(), IngestionError> {
    if actual == declared {
        return Ok(());
    }
    Err(IngestionError::storage_io(
        stage,
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "content length mismatch: declared {} bytes, read {}",
                declared, actual
            ),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_declared_length() {
        assert!(ensure_declared_length(StorageStage::Copy, 10, 10).is_ok());

        let err = ensure_declared_length(StorageStage::Upload, 11, 10).unwrap_err();
        assert!(matches!(
            err,
            IngestionError::StorageIo {
                stage: StorageStage::Upload,
                ..
            }
        ));
        assert!(err.to_string().contains("declared 10 bytes, read 11"));
    }
}
