//! Domain errors for asset ingestion
//!
//! Every failure an upload can end in is one of these variants. None of them
//! is retried inside the service; `is_retryable` tells callers which ones may
//! be retried unchanged.

use std::fmt;

use thiserror::Error;

/// Boxed error carried as the cause of a storage failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while ingesting an asset
#[derive(Error, Debug)]
pub enum IngestionError {
    /// The content is missing or empty, or a caller-supplied value is malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The asset's type or size falls outside the configured policy
    #[error("Rejected by upload policy: {0}")]
    PolicyRejected(#[from] PolicyViolation),

    /// The category tag is not one of the known categories
    #[error("Unsupported asset category: {0}")]
    UnsupportedCategory(String),

    /// The active storage backend failed to persist the bytes
    #[error("Storage {stage} failed: {source}")]
    StorageIo {
        stage: StorageStage,
        #[source]
        source: BoxError,
    },

    /// The policy snapshot cannot be turned into a working backend
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestionError {
    /// Create an invalid input error with a message
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unsupported category error for the given tag
    pub fn unsupported_category(tag: impl Into<String>) -> Self {
        Self::UnsupportedCategory(tag.into())
    }

    /// Create a storage failure at `stage` caused by `source`
    pub fn storage_io(stage: StorageStage, source: impl Into<BoxError>) -> Self {
        Self::StorageIo {
            stage,
            source: source.into(),
        }
    }

    /// Create a config error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether repeating the identical call may succeed
    ///
    /// Only storage failures can be transient. Everything else is decided by
    /// the input alone and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageIo { .. })
    }
}

/// Why the upload policy refused an asset
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// The filename extension is not implied by any accepted content type
    #[error("Unsupported file type '{extension}' (allowed: {})", .allowed.join(", "))]
    UnsupportedFileType {
        extension: String,
        allowed: Vec<String>,
    },

    /// The asset is larger than the policy allows
    #[error("File size ({size} bytes) exceeds limit ({max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// The step of a backend write that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStage {
    /// Creating the directories that contain the target file
    CreateDir,
    /// Opening the (temporary) destination file
    CreateFile,
    /// Streaming the content into the destination
    Copy,
    /// Moving the finished file into its final place
    Commit,
    /// Sending the object to the remote store
    Upload,
}

impl fmt::Display for StorageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateDir => "directory creation",
            Self::CreateFile => "file creation",
            Self::Copy => "content copy",
            Self::Commit => "commit",
            Self::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_io_error_names_stage() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = IngestionError::storage_io(StorageStage::Copy, cause);
        assert!(matches!(
            err,
            IngestionError::StorageIo {
                stage: StorageStage::Copy,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Storage content copy failed: disk full");
    }

    #[test]
    fn test_too_large_error() {
        let err = IngestionError::from(PolicyViolation::TooLarge { size: 501, max: 500 });
        assert!(matches!(err, IngestionError::PolicyRejected(_)));
        assert!(err.to_string().contains("501"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_unsupported_file_type_lists_allowed() {
        let violation = PolicyViolation::UnsupportedFileType {
            extension: ".exe".to_string(),
            allowed: vec![".png".to_string(), ".jpg".to_string()],
        };
        assert_eq!(
            violation.to_string(),
            "Unsupported file type '.exe' (allowed: .png, .jpg)"
        );
    }

    #[test]
    fn test_only_storage_failures_are_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "timeout");
        assert!(IngestionError::storage_io(StorageStage::Upload, io).is_retryable());
        assert!(!IngestionError::invalid_input("empty").is_retryable());
        assert!(!IngestionError::unsupported_category("x").is_retryable());
        assert!(!IngestionError::from(PolicyViolation::TooLarge { size: 2, max: 1 }).is_retryable());
    }
}
