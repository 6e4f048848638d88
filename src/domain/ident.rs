//! Identifier convention for menu entries.
//!
//! Internal entries reuse the id of the content they link to. External
//! entries get `{prefix}{hash8}-{millis}`: the first 32 bits of the URL's
//! SHA-256 plus the creation time in milliseconds, so two links to the same
//! URL created in one session still differ.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::domain::entities::LinkTarget;

/// Prefix used when none is configured.
pub const DEFAULT_EXTERNAL_PREFIX: &str = "ext-";

/// Compute 8-character hex hash of content (first 32 bits of SHA-256).
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    // First 4 bytes = 8 hex characters
    hex::encode(&result[..4])
}

/// Identifier for a new external-link entry.
pub fn external_link_id(prefix: &str, url: &str, created_at: DateTime<Utc>) -> String {
    format!(
        "{}{}-{}",
        prefix,
        content_hash(url.as_bytes()),
        created_at.timestamp_millis()
    )
}

/// Identifier for a new entry pointing at `link`.
pub fn id_for_link(prefix: &str, link: &LinkTarget, created_at: DateTime<Utc>) -> String {
    match link {
        LinkTarget::Content(content_id) => content_id.clone(),
        LinkTarget::External(url) => external_link_id(prefix, url, created_at),
    }
}
