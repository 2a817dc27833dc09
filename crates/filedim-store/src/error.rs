//! Store error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the tree store.
///
/// Store failures are fatal to the current root's walk (reconciliation
/// cannot safely continue without a working store) but must not abort other
/// roots in the same run.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Paths entering the store must be absolute.
    #[error("Path must be absolute: {path}")]
    RelativePath { path: PathBuf },

    /// An entry id was expected to exist but did not.
    #[error("No entry with id {id}")]
    MissingEntry { id: i64 },
}
