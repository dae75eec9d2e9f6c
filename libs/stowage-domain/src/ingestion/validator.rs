//! Upload policy checks
//!
//! The declared MIME type comes from the client and is not trusted. The file
//! suffix is compared against the extensions implied by the policy's
//! accepted MIME types instead.

use std::collections::BTreeSet;

use crate::ingestion::error::PolicyViolation;
use crate::policy::Policy;

/// Canonical filename extension for each supported MIME type
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
];

/// Canonical extension of a MIME type, if it is one we know
pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let content_type = content_type.trim().to_ascii_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Extensions implied by the policy's accepted MIME types
///
/// Unknown MIME types in the policy contribute nothing.
pub fn accepted_extensions(policy: &Policy) -> BTreeSet<&'static str> {
    policy
        .accepted_content_types
        .iter()
        .filter_map(|mime| extension_for_mime(mime))
        .collect()
}

/// Check an asset's extension and size against `policy`
///
/// `extension` may be given with or without its leading dot and in any case.
/// It is otherwise compared byte for byte; surrounding whitespace fails.
/// `content_type` is the client's claim and does not influence the outcome.
pub fn validate(
    _content_type: &str,
    extension: &str,
    size_bytes: u64,
    policy: &Policy,
) -> Result<(), PolicyViolation> {
    let extension = normalize_extension(extension);
    let allowed = accepted_extensions(policy);

    if !allowed.contains(extension.as_str()) {
        return Err(PolicyViolation::UnsupportedFileType {
            extension,
            allowed: allowed.into_iter().map(String::from).collect(),
        });
    }

    if size_bytes > policy.max_bytes {
        return Err(PolicyViolation::TooLarge {
            size: size_bytes,
            max: policy.max_bytes,
        });
    }

    Ok(())
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_ascii_lowercase();
    if lower.is_empty() || lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
