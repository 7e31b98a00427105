//! Request-keyed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// Only the method and the canonical URL participate; headers never vary the key.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "https://shop.test/api/categories");
        let hash2 = compute_cache_key("GET", "https://shop.test/api/categories");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_method_case_insensitive() {
        let upper = compute_cache_key("GET", "https://shop.test/");
        let lower = compute_cache_key("get", "https://shop.test/");
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_cache_key("GET", "https://shop.test/");
        let head = compute_cache_key("HEAD", "https://shop.test/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_hash_query_is_significant() {
        let all = compute_cache_key("GET", "https://shop.test/api/products");
        let featured = compute_cache_key("GET", "https://shop.test/api/products?featured=true");
        assert_ne!(all, featured);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", "https://shop.test/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
