//! Utilities for generating cache keys for upstream lookups

use sha2::{Digest, Sha256};

/// Generate the cache key for a location-scoped lookup
///
/// Locations are trimmed, lower-cased and whitespace-collapsed first so
/// "  New   York " and "new york" share an entry.
pub fn location_key(location: &str) -> String {
    let normalized = location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    hash_string(&normalized)
}

/// Hash a string to a hex string using SHA256
fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}
