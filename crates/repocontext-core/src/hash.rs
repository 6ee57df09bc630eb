//! Checksums and deterministic chunk IDs.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of raw file bytes.
pub fn checksum_bytes(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// `"chunk_" || first_16_hex(SHA256(path))`.
pub fn chunk_id_for_path(path: &str) -> String {
    let full = format!("{:x}", Sha256::digest(path.as_bytes()));
    format!("chunk_{}", &full[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable() {
        let a = checksum_bytes(b"package main\n");
        let b = checksum_bytes(b"package main\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn checksum_changes_with_content() {
        let a = checksum_bytes(b"package main\n");
        let b = checksum_bytes(b"package other\n");
        assert_ne!(a, b);
    }

    #[test]
    fn chunk_id_is_deterministic_and_prefixed() {
        let a = chunk_id_for_path("internal/service/process.go");
        let b = chunk_id_for_path("internal/service/process.go");
        assert_eq!(a, b);
        assert!(a.starts_with("chunk_"));
        assert_eq!(a.len(), "chunk_".len() + 16);
    }

    #[test]
    fn chunk_id_differs_by_path() {
        let a = chunk_id_for_path("a.go");
        let b = chunk_id_for_path("b.go");
        assert_ne!(a, b);
    }
}
