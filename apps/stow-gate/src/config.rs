//! Process configuration
//!
//! Read once at startup from the environment (after `.env` is loaded). The
//! resulting `Policy` is handed to the domain as an immutable snapshot.

use anyhow::{Context, Result};
use std::path::PathBuf;
use stowage_domain::{Policy, RemoteCredentials};
use tracing::info;

/// Everything the gateway needs to start
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub policy: Policy,
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Policy::default();

        let max_bytes = match get("STOWAGE_MAX_BYTES") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("STOWAGE_MAX_BYTES must be a byte count, got '{}'", raw))?,
            None => defaults.max_bytes,
        };

        let accepted_content_types = match get("STOWAGE_ALLOWED_TYPES") {
            Some(raw) => raw
                .split(',')
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => defaults.accepted_content_types,
        };

        let storage_root = get("STOWAGE_STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);
        let public_base_url = get("STOWAGE_PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url);

        let remote_credentials = match (
            get("STOWAGE_REMOTE_ACCESS_KEY_ID"),
            get("STOWAGE_REMOTE_SECRET_ACCESS_KEY"),
        ) {
            (Some(id), Some(secret)) => Some(RemoteCredentials::new(id, secret)),
            _ => None,
        };

        let policy = Policy {
            max_bytes,
            accepted_content_types,
            storage_root,
            public_base_url,
            remote_endpoint: get("STOWAGE_REMOTE_ENDPOINT"),
            remote_credentials,
            remote_region: get("STOWAGE_REMOTE_REGION"),
        };

        let host = get("STOW_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("STOW_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("STOW_PORT must be a port number, got '{}'", raw))?,
            None => 8080,
        };

        info!(
            max_bytes = policy.max_bytes,
            allowed_types = ?policy.accepted_content_types,
            remote = policy.uses_remote(),
            "Loaded upload policy"
        );

        Ok(Self { policy, host, port })
    }

    /// `host:port` to bind the HTTP listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.policy.max_bytes, 10 * 1024 * 1024);
        assert!(config.policy.accepted_content_types.contains("image/png"));
        assert_eq!(config.policy.storage_root, PathBuf::from("uploads"));
        assert!(!config.policy.uses_remote());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOWAGE_MAX_BYTES", "500"),
            ("STOWAGE_ALLOWED_TYPES", "image/PNG, image/webp ,"),
            ("STOWAGE_STORAGE_ROOT", "/srv/assets"),
            ("STOWAGE_PUBLIC_BASE_URL", "https://api.example"),
            ("STOW_PORT", "9000"),
        ])
        .unwrap();

        assert_eq!(config.policy.max_bytes, 500);
        let types: Vec<_> = config.policy.accepted_content_types.iter().cloned().collect();
        assert_eq!(types, vec!["image/png", "image/webp"]);
        assert_eq!(config.policy.storage_root, PathBuf::from("/srv/assets"));
        assert_eq!(config.policy.public_base_url, "https://api.example");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_remote_needs_both_credentials() {
        let partial = load(&[
            ("STOWAGE_REMOTE_ENDPOINT", "https://store.example/bucket"),
            ("STOWAGE_REMOTE_ACCESS_KEY_ID", "AKID"),
            ("STOWAGE_REMOTE_SECRET_ACCESS_KEY", "  "),
        ])
        .unwrap();
        assert!(!partial.policy.uses_remote());

        let full = load(&[
            ("STOWAGE_REMOTE_ENDPOINT", "https://store.example/bucket"),
            ("STOWAGE_REMOTE_ACCESS_KEY_ID", "AKID"),
            ("STOWAGE_REMOTE_SECRET_ACCESS_KEY", "secret"),
            ("STOWAGE_REMOTE_REGION", "ap-guangzhou"),
        ])
        .unwrap();
        assert!(full.policy.uses_remote());
        assert_eq!(full.policy.remote_region.as_deref(), Some("ap-guangzhou"));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(load(&[("STOWAGE_MAX_BYTES", "ten megs")]).is_err());
        assert!(load(&[("STOW_PORT", "99999")]).is_err());
    }
}
