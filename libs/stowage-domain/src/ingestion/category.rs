use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ingestion::error::IngestionError;

/// Logical kind of an uploaded asset
///
/// The set is closed: every category owns a fixed directory segment, and an
/// unknown tag is refused rather than mapped to some default directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    /// Profile picture of an account holder
    UserAvatar,
    /// Profile picture of a baby tracked by an account
    BabyAvatar,
}

impl AssetCategory {
    /// Every known category
    pub const ALL: [AssetCategory; 2] = [AssetCategory::UserAvatar, AssetCategory::BabyAvatar];

    /// The wire tag, also used as the filename prefix
    pub fn tag(&self) -> &'static str {
        match self {
            Self::UserAvatar => "user-avatar",
            Self::BabyAvatar => "baby-avatar",
        }
    }

    /// Directory segment below the `images/` namespace
    pub fn subpath(&self) -> &'static str {
        match self {
            Self::UserAvatar => "users",
            Self::BabyAvatar => "babies",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AssetCategory {
    type Err = IngestionError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.tag() == tag)
            .ok_or_else(|| IngestionError::unsupported_category(tag))
    }
}
