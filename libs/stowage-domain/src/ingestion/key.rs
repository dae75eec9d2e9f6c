//! Storage key derivation
//!
//! A pure mapping from (category, owner, original filename, time) to the key
//! both backends address and the filename reported back to the caller.
//!
//! Two uploads with the same category and owner in the same second derive the
//! same key, and the later one replaces the earlier. Nothing here adds
//! randomness to avoid that.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingestion::category::AssetCategory;
use crate::ingestion::error::{IngestionError, Result};

/// Fixed top-level namespace shared by every backend
pub const KEY_NAMESPACE: &str = "images";

/// Extension used when the original filename has none
pub const DEFAULT_EXTENSION: &str = ".jpg";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Backend-agnostic relative path of a stored asset
///
/// Always of the form `images/<category-subpath>/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wrap an already-derived key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `/`-separated segments of the key
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

/// Output of key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    pub storage_key: StorageKey,
    pub filename: String,
}

/// Extension of `filename` including the leading dot, as written
///
/// Everything from the last `.` of the final path component, so a name that
/// is only a suffix (`.png`) is its own extension. A lone trailing `.` counts
/// as no extension.
pub fn file_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    name.rfind('.')
        .map(|dot| &name[dot..])
        .filter(|ext| *ext != ".")
        .map(String::from)
}

/// Derive the storage key and display filename for a category tag
///
/// Unknown tags fail with `UnsupportedCategory` before anything is derived.
pub fn derive_key(
    category_tag: &str,
    owner_reference: Option<&str>,
    original_filename: &str,
    now: DateTime<Utc>,
) -> Result<DerivedKey> {
    let category: AssetCategory = category_tag.parse()?;
    derive_key_for(category, owner_reference, original_filename, now)
}

/// Derive the storage key and display filename for a known category
pub fn derive_key_for(
    category: AssetCategory,
    owner_reference: Option<&str>,
    original_filename: &str,
    now: DateTime<Utc>,
) -> Result<DerivedKey> {
    let extension =
        file_extension(original_filename).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    let mut prefix = category.tag().to_string();
    if let Some(owner) = owner_reference.filter(|o| !o.is_empty()) {
        check_owner_reference(owner)?;
        prefix.push('_');
        prefix.push_str(owner);
    }

    let filename = format!("{}_{}{}", prefix, now.format(TIMESTAMP_FORMAT), extension);
    let storage_key = StorageKey(format!(
        "{}/{}/{}",
        KEY_NAMESPACE,
        category.subpath(),
        filename
    ));

    Ok(DerivedKey {
        storage_key,
        filename,
    })
}

// The owner reference lands inside a path segment.
fn check_owner_reference(owner: &str) -> Result<()> {
    if owner.contains(['/', '\\']) || owner.contains("..") {
        return Err(IngestionError::invalid_input(format!(
            "Owner reference '{}' must not contain path separators",
            owner
        )));
    }
    Ok(())
}
