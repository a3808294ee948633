//! Deterministic cache key derivation.
//!
//! Keys combine a domain prefix with 32-bit FNV-1a digests of the
//! content and the JSON-serialized parameters, hashed separately so
//! that changing either part changes the key. This is cache-correctness
//! hashing, not a security boundary.

use serde::Serialize;

/// Key prefix for the content scoring domain.
pub const SCORE_PREFIX: &str = "score";
/// Key prefix for the optimal timing domain.
pub const TIMING_PREFIX: &str = "timing";

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Derives the cache key for `(prefix, content, params)`.
///
/// Identical inputs always produce identical keys; `params` is
/// serialized to JSON before hashing so structurally equal values hash
/// equally regardless of how the caller constructed them.
pub fn derive_key<P: Serialize>(prefix: &str, content: &str, params: &P) -> String {
    let params_json = serde_json::to_string(params).unwrap_or_default();
    format!(
        "{}:{:08x}:{:08x}",
        prefix,
        fnv1a_32(content.as_bytes()),
        fnv1a_32(params_json.as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_inputs_yield_identical_keys() {
        let params = json!({"platform": "instagram", "audience": "b2c"});
        let a = derive_key(SCORE_PREFIX, "launch day!", &params);
        let b = derive_key(SCORE_PREFIX, "launch day!", &params);
        assert_eq!(a, b);
    }

    #[test]
    fn varying_any_component_changes_the_key() {
        let params = json!({"platform": "instagram"});
        let base = derive_key(SCORE_PREFIX, "hello", &params);

        assert_ne!(base, derive_key(TIMING_PREFIX, "hello", &params));
        assert_ne!(base, derive_key(SCORE_PREFIX, "hello!", &params));
        assert_ne!(
            base,
            derive_key(SCORE_PREFIX, "hello", &json!({"platform": "linkedin"}))
        );
    }

    #[test]
    fn key_is_prefixed_and_fixed_width() {
        let key = derive_key("trend", "content", &json!({}));
        let parts: Vec<&str> = key.split(':').collect();
        assert_eq!(parts[0], "trend");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn unserializable_params_still_produce_a_deterministic_key() {
        // A map with non-string keys fails JSON serialization; the key
        // falls back to hashing the empty string, deterministically.
        let mut params = std::collections::HashMap::new();
        params.insert(vec![1u8], "x");
        let a = derive_key("p", "c", &params);
        let b = derive_key("p", "c", &params);
        assert_eq!(a, b);
    }
}
