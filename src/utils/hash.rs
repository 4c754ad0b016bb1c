//! Spec fingerprints.

use xxhash_rust::xxh3::xxh3_64;

/// 64-bit xxh3 digest of `data`.
#[must_use]
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Fixed-width hex rendering of [`content_hash`], suitable for annotations.
#[must_use]
pub fn fingerprint_hex(data: &[u8]) -> String {
    format!("{:016x}", content_hash(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        let spec = br#"{"name":"req-3-operationgenerate-0"}"#;
        assert_eq!(fingerprint_hex(spec), fingerprint_hex(spec));
        assert_ne!(
            fingerprint_hex(spec),
            fingerprint_hex(br#"{"name":"req-3-operationgenerate-1"}"#)
        );
    }

    #[test]
    fn test_fingerprint_width() {
        assert_eq!(fingerprint_hex(b"").len(), 16);
        assert!(fingerprint_hex(b"spec").chars().all(|c| c.is_ascii_hexdigit()));
    }
}
