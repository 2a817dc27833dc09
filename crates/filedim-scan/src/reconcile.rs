//! Synchronized walk of a live directory tree against the stored tree.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use filedim_core::{
    EntryId, EntryMetadata, FileEntry, FileEntryDraft, MetaError, ScanReport, ScanWarning,
    WarningKind,
};
use filedim_store::{StoreError, TreeStore};

use crate::hash::ContentHasher;
use crate::meta::read_metadata;

/// A file whose content needs (re)hashing before upsert.
struct PendingFile {
    name: String,
    path: PathBuf,
    meta: EntryMetadata,
    was_stored: bool,
}

/// Walks one root and emits the minimal inserts/updates/deletes.
///
/// Per-directory hashing work fans out on the rayon pool; all store writes
/// are issued serially by the walking thread.
pub(crate) struct Reconciler<'a, H: ContentHasher> {
    store: &'a TreeStore,
    hasher: &'a H,
    prune: bool,
    max_entries: Option<u64>,
}

impl<'a, H: ContentHasher> Reconciler<'a, H> {
    pub fn new(
        store: &'a TreeStore,
        hasher: &'a H,
        prune: bool,
        max_entries: Option<u64>,
    ) -> Self {
        Self {
            store,
            hasher,
            prune,
            max_entries,
        }
    }

    /// Reconcile the directory at `dir_path` (stored as `dir_id`) and
    /// recurse into subdirectories until done or the budget is spent.
    pub fn reconcile(
        &self,
        dir_path: &Path,
        dir_id: EntryId,
        report: &mut ScanReport,
    ) -> Result<(), StoreError> {
        let stored: HashMap<String, FileEntry> = self
            .store
            .list_children(dir_id)?
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect();

        let listing = match fs::read_dir(dir_path) {
            Ok(rd) => rd,
            Err(err) => {
                // A failed listing must never trigger deletion below it.
                warn!(path = %dir_path.display(), "cannot list directory: {err}");
                report.warnings.push(ScanWarning::listing_failed(dir_path, &err));
                return Ok(());
            }
        };

        // Names persist through the TEXT column. Lossy conversion could make
        // two distinct non-UTF-8 siblings collide under (parent_id, name),
        // so such names are skipped with a warning instead.
        let mut live: Vec<(String, PathBuf)> = Vec::new();
        for entry in listing.filter_map(|entry| entry.ok()) {
            match entry.file_name().into_string() {
                Ok(name) => live.push((name, entry.path())),
                Err(raw) => {
                    warn!(path = %entry.path().display(), "skipping non-UTF-8 name");
                    report.warnings.push(ScanWarning::new(
                        entry.path(),
                        format!("Non-UTF-8 name not indexed: {}", raw.to_string_lossy()),
                        WarningKind::Unsupported,
                    ));
                    report.entries_skipped += 1;
                }
            }
        }
        live.sort();

        let mut seen: HashSet<String> = HashSet::new();
        let mut pending: Vec<PendingFile> = Vec::new();
        let mut subdirs: Vec<(PathBuf, EntryId)> = Vec::new();
        let mut listing_complete = true;

        for (name, path) in live {
            if self.budget_exhausted(report) {
                report.truncated = true;
                listing_complete = false;
                break;
            }

            let meta = match read_metadata(&path) {
                Ok(meta) => meta,
                Err(MetaError::NotFound { .. }) => {
                    // Vanished between listing and stat: nothing to do this
                    // run. The entry stays exempt from pruning; the next
                    // complete listing will omit it.
                    debug!(path = %path.display(), "entry vanished mid-walk");
                    seen.insert(name);
                    report.entries_skipped += 1;
                    continue;
                }
                Err(MetaError::Unsupported { .. }) => {
                    debug!(path = %path.display(), "skipping special file");
                    seen.insert(name);
                    report.entries_skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(path = %path.display(), "cannot stat entry: {err}");
                    report.warnings.push(ScanWarning::from_meta_error(&err));
                    seen.insert(name);
                    report.entries_skipped += 1;
                    continue;
                }
            };

            seen.insert(name.clone());
            report.entries_visited += 1;

            if meta.is_directory {
                let child_id = match stored.get(&name) {
                    Some(existing)
                        if existing.is_directory
                            && existing.modified_at == Some(meta.modified_at) =>
                    {
                        report.entries_skipped += 1;
                        existing.id
                    }
                    existing => {
                        let was_stored = existing.is_some();
                        let entry = self.store.upsert(&FileEntryDraft::directory(
                            dir_id,
                            name,
                            Some(meta.modified_at),
                        ))?;
                        if was_stored {
                            report.entries_updated += 1;
                        } else {
                            report.entries_inserted += 1;
                        }
                        entry.id
                    }
                };
                subdirs.push((path, child_id));
            } else {
                // A directory replaced by a same-named file converts in
                // place, but its stored descendants must not outlive it.
                if let Some(old_dir) = stored.get(&name).filter(|e| e.is_directory) {
                    for child in self.store.list_children(old_dir.id)? {
                        report.entries_deleted += self.store.delete_subtree(child.id)?;
                    }
                }
                let unchanged = stored.get(&name).is_some_and(|e| {
                    !e.is_directory
                        && e.content_hash.is_some()
                        && e.modified_at == Some(meta.modified_at)
                });
                if unchanged {
                    report.entries_skipped += 1;
                    continue;
                }
                pending.push(PendingFile {
                    was_stored: stored.contains_key(&name),
                    name,
                    path,
                    meta,
                });
            }
        }

        // Hash changed and new files in parallel, then upsert serially.
        // Only the hasher crosses threads; the store connection stays here.
        let hasher = self.hasher;
        let hashed: Vec<_> = pending
            .into_par_iter()
            .map(|file| {
                let result = hasher.hash_file(&file.path);
                (file, result)
            })
            .collect();

        for (file, result) in hashed {
            let hash = match result {
                Ok(hash) => Some(hash),
                Err(err) => {
                    // Stored with a null hash; retried on the next scan.
                    warn!(path = %file.path.display(), "hashing failed: {err}");
                    report.warnings.push(ScanWarning::from_hash_error(&err));
                    None
                }
            };
            self.store
                .upsert(&FileEntryDraft::file(dir_id, file.name, &file.meta, hash))?;
            if file.was_stored {
                report.entries_updated += 1;
            } else {
                report.entries_inserted += 1;
            }
        }

        for (path, child_id) in subdirs {
            if self.budget_exhausted(report) {
                report.truncated = true;
                break;
            }
            self.reconcile(&path, child_id, report)?;
        }

        // Pruning requires a complete listing: entries with a failed stat
        // were marked seen above, and a truncated listing prunes nothing.
        if self.prune && listing_complete {
            for (name, entry) in &stored {
                if !seen.contains(name) {
                    debug!(name = %name, id = entry.id.0, "pruning stale entry");
                    report.entries_deleted += self.store.delete_subtree(entry.id)?;
                }
            }
        }

        Ok(())
    }

    fn budget_exhausted(&self, report: &ScanReport) -> bool {
        self.max_entries
            .is_some_and(|max| report.entries_visited >= max)
    }
}
