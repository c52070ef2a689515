//! Request-identity cache key generation.

use sha2::{Digest, Sha256};

/// Compute the key a request is stored under: method plus normalized absolute URL.
///
/// `url` must already be normalized (see [`crate::uri::normalize`]).
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
