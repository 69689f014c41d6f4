//! URL normalization and frontier key derivation
//!
//! Every target admitted to the frontier is identified by a hash of its
//! normalized URL, so that syntactic variants of the same address (trailing
//! slash, fragment, query parameter ordering) collapse to one unit of work.

mod normalize;

pub use normalize::normalize_url;

use sha2::{Digest, Sha256};
use url::Url;

/// Computes the deduplication key for a normalized URL
///
/// The key is the hex-encoded SHA-256 digest of the normalized URL string.
/// Two URLs that normalize identically always produce the same key, which is
/// a deliberate precision/recall trade-off: `https://example.com/a#intro`
/// and `https://example.com/a` are treated as the same target.
pub fn frontier_key(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
