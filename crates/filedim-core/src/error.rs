//! Error and warning types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading filesystem metadata for a single entry.
///
/// All variants are recovered locally by the reconciler: the entry is
/// skipped with a warning and the scan continues.
#[derive(Debug, Error)]
pub enum MetaError {
    /// Permission denied on stat.
    #[error("Permission denied: {path}")]
    Access { path: PathBuf },

    /// Path vanished between discovery and stat.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Special files (sockets, devices, FIFOs) and symlinks; never stored.
    #[error("Unsupported entry type: {path}")]
    Unsupported { path: PathBuf },

    /// Any other I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MetaError {
    /// Create a metadata error with path context from an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::Access { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Error while streaming file content through the hasher.
#[derive(Debug, Error)]
pub enum HashError {
    /// File became unreadable mid-stream. Only the affected entry is lost;
    /// it is stored with a null hash and retried on the next scan.
    #[error("Read failed while hashing {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Path vanished mid-walk.
    Vanished,
    /// Non-regular-file, non-directory entry was skipped.
    Unsupported,
    /// Error reading a file or directory.
    ReadError,
}

/// Non-fatal warning encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Warning for a failed metadata read.
    pub fn from_meta_error(err: &MetaError) -> Self {
        let (path, kind) = match err {
            MetaError::Access { path } => (path, WarningKind::PermissionDenied),
            MetaError::NotFound { path } => (path, WarningKind::Vanished),
            MetaError::Unsupported { path } => (path, WarningKind::Unsupported),
            MetaError::Io { path, .. } => (path, WarningKind::ReadError),
        };
        Self {
            path: path.clone(),
            message: err.to_string(),
            kind,
        }
    }

    /// Warning for a read failure during hashing.
    pub fn from_hash_error(err: &HashError) -> Self {
        let HashError::Read { path, .. } = err;
        Self {
            path: path.clone(),
            message: err.to_string(),
            kind: WarningKind::ReadError,
        }
    }

    /// Warning for a directory whose listing failed.
    pub fn listing_failed(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            std::io::ErrorKind::NotFound => WarningKind::Vanished,
            _ => WarningKind::ReadError,
        };
        Self {
            message: format!("Cannot list {}: {error}", path.display()),
            path,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_error_io_mapping() {
        let err = MetaError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MetaError::Access { .. }));

        let err = MetaError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MetaError::NotFound { .. }));
    }

    #[test]
    fn test_warning_from_meta_error() {
        let err = MetaError::Access {
            path: PathBuf::from("/locked"),
        };
        let warning = ScanWarning::from_meta_error(&err);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("Permission denied"));
    }

    #[test]
    fn test_listing_failed_kind() {
        let warning = ScanWarning::listing_failed(
            "/gone",
            &std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(warning.kind, WarningKind::Vanished);
    }
}
