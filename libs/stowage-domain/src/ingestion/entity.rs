//! Domain entities for asset ingestion
//!
//! An `IngestionRequest` lives for exactly one upload call. The
//! `IngestionResult` handed back is the only record of the upload the service
//! produces; keeping it is the caller's business.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

/// Single-read byte source with its declared filename and length
///
/// The reader is consumed once, front to back, by whichever backend stores it.
pub struct AssetStream {
    filename: String,
    declared_length: u64,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl AssetStream {
    /// Wrap a reader that will yield exactly `declared_length` bytes
    pub fn new(
        filename: impl Into<String>,
        declared_length: u64,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            filename: filename.into(),
            declared_length,
            reader: Box::new(reader),
        }
    }

    /// Stream over an in-memory buffer, length taken from the buffer
    pub fn from_bytes(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self::new(filename, len, std::io::Cursor::new(bytes))
    }

    /// Filename as declared by the uploader
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Length in bytes as declared by the uploader
    pub fn declared_length(&self) -> u64 {
        self.declared_length
    }

    pub fn is_empty(&self) -> bool {
        self.declared_length == 0
    }

    /// Give up the reader for consumption
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStream")
            .field("filename", &self.filename)
            .field("declared_length", &self.declared_length)
            .finish_non_exhaustive()
    }
}

/// One upload as received from the caller
#[derive(Debug)]
pub struct IngestionRequest {
    /// The asset bytes; `None` when the caller sent no file at all
    pub content: Option<AssetStream>,
    /// Client-declared MIME type, informational only
    pub content_type: String,
    /// Category tag, e.g. `"user-avatar"`
    pub category: String,
    /// Identifier of the record owning the asset
    pub owner_reference: Option<String>,
}

impl IngestionRequest {
    pub fn new(content: AssetStream, category: impl Into<String>) -> Self {
        Self {
            content: Some(content),
            content_type: String::new(),
            category: category.into(),
            owner_reference: None,
        }
    }

    pub fn with_owner(mut self, owner_reference: impl Into<String>) -> Self {
        self.owner_reference = Some(owner_reference.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Access descriptor of a stored asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Publicly resolvable URL
    pub url: String,
    /// Backend-agnostic key the bytes were written under
    pub storage_key: String,
    /// Derived filename (last key segment)
    pub filename: String,
    /// Number of bytes stored
    pub size_bytes: u64,
}
