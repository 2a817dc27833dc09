//! Scan-level error type.

use std::path::PathBuf;

use thiserror::Error;

use filedim_store::StoreError;

/// Errors that abort one root's walk.
///
/// Per-entry failures (stat, hashing) are downgraded to warnings inside the
/// reconciler; only store failures and an unusable root surface here.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The store failed; reconciliation of this root cannot continue.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Root path could not be resolved.
    #[error("Cannot access scan root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
