//! Filesystem metadata extraction.

use std::path::Path;
use std::time::SystemTime;

use filedim_core::{EntryMetadata, InodeInfo, MetaError};

/// Read the attributes of a single filesystem entry.
///
/// Symlinks are not followed; symlinks and special files (sockets, devices,
/// FIFOs) are reported as `Unsupported` and never stored.
pub fn read_metadata(path: &Path) -> Result<EntryMetadata, MetaError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| MetaError::io(path, e))?;
    let file_type = metadata.file_type();

    if !file_type.is_file() && !file_type.is_dir() {
        return Err(MetaError::Unsupported {
            path: path.to_path_buf(),
        });
    }

    let is_directory = file_type.is_dir();
    let modified_at = metadata
        .modified()
        .map(unix_seconds)
        .map_err(|e| MetaError::io(path, e))?;

    Ok(EntryMetadata {
        is_directory,
        size: if is_directory {
            None
        } else {
            Some(metadata.len())
        },
        inode: Some(InodeInfo::new(get_dev(&metadata), get_ino(&metadata))),
        modified_at,
        mime_type: if is_directory {
            None
        } else {
            mime_guess::from_path(path).first_raw().map(str::to_owned)
        },
    })
}

/// Convert a SystemTime to unix seconds (negative before the epoch).
fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

// Cross-platform metadata helpers

/// Get the device ID from metadata.
#[cfg(unix)]
fn get_dev(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.dev()
}

#[cfg(not(unix))]
fn get_dev(_metadata: &std::fs::Metadata) -> u64 {
    0 // Windows doesn't have device IDs in the same way
}

/// Get the inode number from metadata.
#[cfg(unix)]
fn get_ino(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn get_ino(_metadata: &std::fs::Metadata) -> u64 {
    0 // Windows doesn't have inodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.txt");
        fs::write(&path, "hello").unwrap();

        let meta = read_metadata(&path).unwrap();
        assert!(!meta.is_directory);
        assert_eq!(meta.size, Some(5));
        assert_eq!(meta.mime_type.as_deref(), Some("text/plain"));
        assert!(meta.modified_at > 0);
        #[cfg(unix)]
        assert!(meta.inode.unwrap().inode > 0);
    }

    #[test]
    fn test_directory_metadata() {
        let temp = TempDir::new().unwrap();
        let meta = read_metadata(temp.path()).unwrap();
        assert!(meta.is_directory);
        assert!(meta.size.is_none());
        assert!(meta.mime_type.is_none());
    }

    #[test]
    fn test_vanished_path() {
        let temp = TempDir::new().unwrap();
        let err = read_metadata(&temp.path().join("gone")).unwrap_err();
        assert!(matches!(err, MetaError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_unsupported() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target.txt");
        let link = temp.path().join("link.txt");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = read_metadata(&link).unwrap_err();
        assert!(matches!(err, MetaError::Unsupported { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_unsupported() {
        use std::process::Command;
        let temp = TempDir::new().unwrap();
        let fifo = temp.path().join("pipe");
        let status = Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        let err = read_metadata(&fifo).unwrap_err();
        assert!(matches!(err, MetaError::Unsupported { .. }));
    }

    #[test]
    fn test_unknown_extension_has_no_mime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.zzzz");
        fs::write(&path, "data").unwrap();
        let meta = read_metadata(&path).unwrap();
        assert!(meta.mime_type.is_none());
    }
}
