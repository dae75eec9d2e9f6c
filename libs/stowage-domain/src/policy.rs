//! Upload policy snapshot
//!
//! The `Policy` is assembled once by the process that hosts the service and is
//! never mutated afterwards. Every component reads from it; none of them knows
//! where the values came from.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// URL path prefix under which the local storage root is served
pub const LOCAL_URL_PREFIX: &str = "uploads";

/// Access key pair for the remote object store
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl RemoteCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Both halves of the pair are present
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.trim().is_empty() && !self.secret_access_key.trim().is_empty()
    }
}

// Never print the secret half.
impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// Validation and addressing rules for uploaded assets
#[derive(Debug, Clone)]
pub struct Policy {
    /// Largest accepted asset, in bytes
    pub max_bytes: u64,
    /// Accepted MIME types; each implies one filename extension
    pub accepted_content_types: BTreeSet<String>,
    /// Directory the local backend writes under
    pub storage_root: PathBuf,
    /// Base URL of the HTTP server that serves `storage_root` at `/uploads`
    pub public_base_url: String,
    /// Public path-style bucket URL of the remote object store
    pub remote_endpoint: Option<String>,
    /// Credentials for the remote object store
    pub remote_credentials: Option<RemoteCredentials>,
    /// Signing region for the remote object store
    pub remote_region: Option<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024, // 10MB
            accepted_content_types: ["image/jpeg", "image/png", "image/gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            storage_root: PathBuf::from("uploads"),
            public_base_url: "http://localhost:8080".to_string(),
            remote_endpoint: None,
            remote_credentials: None,
            remote_region: None,
        }
    }
}

impl Policy {
    /// Remote endpoint and credentials, when both are configured
    ///
    /// This is the single rule deciding which backend a process uses.
    pub fn remote(&self) -> Option<(&str, &RemoteCredentials)> {
        let endpoint = self
            .remote_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())?;
        let credentials = self
            .remote_credentials
            .as_ref()
            .filter(|c| c.is_complete())?;
        Some((endpoint, credentials))
    }

    /// Whether this policy selects the remote object store
    pub fn uses_remote(&self) -> bool {
        self.remote().is_some()
    }

    /// Public URL of a stored asset, rebuilt from its key and this policy alone
    pub fn public_url(&self, storage_key: &str) -> String {
        match self.remote() {
            Some((endpoint, _)) => join_url(endpoint, storage_key),
            None => local_public_url(&self.public_base_url, storage_key),
        }
    }
}

/// Join `base` and `path` with exactly one `/` at the seam
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// URL under which the local backend's file for `storage_key` is served
pub fn local_public_url(public_base_url: &str, storage_key: &str) -> String {
    join_url(
        public_base_url,
        &join_url(LOCAL_URL_PREFIX, storage_key),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_policy(endpoint: &str) -> Policy {
        Policy {
            remote_endpoint: Some(endpoint.to_string()),
            remote_credentials: Some(RemoteCredentials::new("AKID", "secret")),
            ..Policy::default()
        }
    }

    #[test]
    fn test_join_url_is_slash_idempotent() {
        let expected = "https://cdn.example/images/a.png";
        assert_eq!(join_url("https://cdn.example", "images/a.png"), expected);
        assert_eq!(join_url("https://cdn.example/", "images/a.png"), expected);
        assert_eq!(join_url("https://cdn.example/", "/images/a.png"), expected);
        assert_eq!(join_url("https://cdn.example", "/images/a.png"), expected);
    }

    #[test]
    fn test_local_public_url() {
        let key = "images/users/user-avatar_20240101_000000.png";
        let expected = "http://localhost:8080/uploads/images/users/user-avatar_20240101_000000.png";
        assert_eq!(local_public_url("http://localhost:8080", key), expected);
        assert_eq!(local_public_url("http://localhost:8080/", key), expected);
    }

    #[test]
    fn test_remote_requires_endpoint_and_credentials() {
        assert!(!Policy::default().uses_remote());
        assert!(remote_policy("https://store.example/bucket").uses_remote());

        let mut no_creds = remote_policy("https://store.example/bucket");
        no_creds.remote_credentials = None;
        assert!(!no_creds.uses_remote());

        let mut half_creds = remote_policy("https://store.example/bucket");
        half_creds.remote_credentials = Some(RemoteCredentials::new("AKID", ""));
        assert!(!half_creds.uses_remote());

        assert!(!remote_policy("   ").uses_remote());
    }

    #[test]
    fn test_public_url_follows_backend_selection() {
        let key = "images/babies/baby-avatar_20240101_000000.jpg";
        assert_eq!(
            remote_policy("https://store.example/bucket/").public_url(key),
            "https://store.example/bucket/images/babies/baby-avatar_20240101_000000.jpg"
        );
        assert_eq!(
            Policy::default().public_url(key),
            "http://localhost:8080/uploads/images/babies/baby-avatar_20240101_000000.jpg"
        );
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = RemoteCredentials::new("AKID", "super-secret");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("AKID"));
        assert!(!printed.contains("super-secret"));
    }
}
