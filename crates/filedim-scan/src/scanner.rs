//! Scan orchestration across one or more roots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use filedim_core::{ScanConfig, ScanReport};
use filedim_store::TreeStore;

use crate::error::ScanError;
use crate::hash::{Blake3Hasher, ContentHasher};
use crate::reconcile::Reconciler;

/// Drives the reconciler across configured root paths.
pub struct Scanner<'a, H: ContentHasher = Blake3Hasher> {
    store: &'a TreeStore,
    hasher: H,
}

impl<'a> Scanner<'a> {
    /// Create a scanner with the default BLAKE3 hasher.
    pub fn new(store: &'a TreeStore) -> Self {
        Self {
            store,
            hasher: Blake3Hasher,
        }
    }
}

impl<'a, H: ContentHasher> Scanner<'a, H> {
    /// Create a scanner with a custom hasher.
    pub fn with_hasher(store: &'a TreeStore, hasher: H) -> Self {
        Self { store, hasher }
    }

    /// Reconcile a single root path against the store.
    ///
    /// The root's directory chain is created in the tree if absent, so each
    /// configured root maps to its own node under the global root entry.
    pub fn scan(&self, root: &Path, config: &ScanConfig) -> Result<ScanReport, ScanError> {
        let root = root.canonicalize().map_err(|source| ScanError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        let mut path_cache = HashMap::new();
        let root_id = self.store.ensure_path(&root, &mut path_cache)?;

        let mut report = ScanReport::new();
        let reconciler = Reconciler::new(
            self.store,
            &self.hasher,
            config.prune,
            config.max_entries,
        );
        reconciler.reconcile(&root, root_id, &mut report)?;

        info!(
            root = %root.display(),
            visited = report.entries_visited,
            inserted = report.entries_inserted,
            updated = report.entries_updated,
            deleted = report.entries_deleted,
            skipped = report.entries_skipped,
            truncated = report.truncated,
            "scan finished"
        );
        Ok(report)
    }

    /// Scan every configured root sequentially.
    ///
    /// A failure in one root's walk does not abort the others.
    pub fn scan_all(&self, config: &ScanConfig) -> Vec<(PathBuf, Result<ScanReport, ScanError>)> {
        config
            .roots
            .iter()
            .map(|root| {
                let result = self.scan(root, config);
                if let Err(err) = &result {
                    error!(root = %root.display(), "scan failed: {err}");
                }
                (root.clone(), result)
            })
            .collect()
    }
}
