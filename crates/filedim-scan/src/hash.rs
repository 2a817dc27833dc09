//! Streaming content hashing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use filedim_core::{ContentHash, HashError};

/// Read size per chunk. Memory use is independent of file size.
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Computes the content digest of a file.
///
/// Behind a trait so the reconciler can be instrumented in tests (the
/// skip-rehash policy is verified by counting calls).
pub trait ContentHasher: Send + Sync {
    /// Hash the entire byte stream of the file at `path`.
    fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError>;
}

/// BLAKE3 hasher reading fixed-size chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl ContentHasher for Blake3Hasher {
    fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError> {
        let mut file = File::open(path).map_err(|source| HashError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; HASH_CHUNK_SIZE];
        loop {
            let n = file.read(&mut buffer).map_err(|source| HashError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(ContentHash::new(*hasher.finalize().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_chunked_hash_matches_one_shot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.bin");
        // Spans multiple chunks so the streaming path is exercised.
        let content: Vec<u8> = (0..HASH_CHUNK_SIZE * 3 + 123)
            .map(|i| (i % 251) as u8)
            .collect();
        fs::write(&path, &content).unwrap();

        let streamed = Blake3Hasher.hash_file(&path).unwrap();
        let one_shot = blake3::hash(&content);
        assert_eq!(streamed.0, *one_shot.as_bytes());
    }

    #[test]
    fn test_empty_file_hashes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty");
        fs::write(&path, b"").unwrap();

        let hash = Blake3Hasher.hash_file(&path).unwrap();
        assert_eq!(hash.0, *blake3::hash(b"").as_bytes());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = Blake3Hasher
            .hash_file(&temp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, HashError::Read { .. }));
    }
}
