//! SHA-256 fingerprint of migration file content.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of raw file bytes
pub fn compute_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let sql = b"CREATE TABLE orgs (id INT);";
        assert_eq!(compute_fingerprint(sql), compute_fingerprint(sql));
    }

    #[test]
    fn test_fingerprint_known_value() {
        assert_eq!(
            compute_fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_differs_on_content_change() {
        assert_ne!(
            compute_fingerprint(b"CREATE TABLE a (id INT);"),
            compute_fingerprint(b"CREATE TABLE a (id BIGINT);")
        );
    }
}
