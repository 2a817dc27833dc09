//! Duplicate group detection over the stored dimension table.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use filedim_core::ContentHash;
use filedim_store::{StoreError, TreeStore};

/// A group of distinct physical files sharing one content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Full paths of the duplicates, sorted. Hard links of one physical
    /// file are collapsed to a single representative beforehand.
    pub paths: Vec<PathBuf>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Number of distinct physical files in this group.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// How many files could be deleted while keeping one copy.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// One line of the JSONL duplicate report.
    pub fn report_line(&self) -> ReportLine {
        ReportLine {
            hash: self.hash.to_hex(),
            count: self.paths.len(),
            wasted_space: self.wasted_bytes,
            filenames: self
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Serialized form of one duplicate group in the JSONL report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub hash: String,
    pub count: usize,
    pub wasted_space: u64,
    pub filenames: Vec<String>,
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups of duplicate files, sorted by wasted space descending.
    pub groups: Vec<DuplicateGroup>,

    /// Total wasted space across all groups (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of files that have duplicates.
    pub files_with_duplicates: u64,

    /// Number of duplicate groups.
    pub group_count: usize,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Finds genuine content duplicates in the store.
pub struct DedupeFinder {
    /// Maximum number of groups to report (0 = unlimited).
    max_groups: usize,
}

impl DedupeFinder {
    /// Finder reporting all duplicate groups.
    pub fn new() -> Self {
        Self { max_groups: 0 }
    }

    /// Finder reporting at most `max_groups` groups.
    pub fn with_limit(max_groups: usize) -> Self {
        Self { max_groups }
    }

    /// Group stored file entries by content hash, collapse hard links, and
    /// report groups where 2+ distinct physical files remain.
    pub fn find_duplicates(&self, store: &TreeStore) -> Result<DuplicateReport, StoreError> {
        let mut path_cache = HashMap::new();
        let mut groups = Vec::new();

        for (hash, entries) in store.group_duplicate_hashes()? {
            // Entries sharing a (device, inode) pair are the same physical
            // file; keep the lowest-id row as representative.
            let mut seen_inodes: HashSet<(u64, u64)> = HashSet::new();
            let mut physical = Vec::new();
            for entry in entries {
                match entry.physical_key() {
                    Some(key) if !seen_inodes.insert(key) => {
                        debug!(id = entry.id.0, "collapsing hard link alias");
                    }
                    _ => physical.push(entry),
                }
            }
            if physical.len() < 2 {
                continue;
            }

            let size = physical[0].size.unwrap_or(0);
            let mut paths = Vec::with_capacity(physical.len());
            for entry in &physical {
                paths.push(store.full_path(entry.id, &mut path_cache)?);
            }
            paths.sort();

            let wasted_bytes = size * (paths.len() as u64 - 1);
            groups.push(DuplicateGroup {
                hash,
                size,
                paths,
                wasted_bytes,
            });
        }

        groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));
        if self.max_groups > 0 && groups.len() > self.max_groups {
            groups.truncate(self.max_groups);
        }

        let total_wasted_space = groups.iter().map(|g| g.wasted_bytes).sum();
        let files_with_duplicates = groups.iter().map(|g| g.paths.len() as u64).sum();
        let group_count = groups.len();

        Ok(DuplicateReport {
            groups,
            total_wasted_space,
            files_with_duplicates,
            group_count,
        })
    }
}

impl Default for DedupeFinder {
    fn default() -> Self {
        Self::new()
    }
}
