//! Scan result accounting.

use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// Aggregate counts and warnings for one root's reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Entries whose metadata was successfully read this run.
    pub entries_visited: u64,
    /// New rows created in the store.
    pub entries_inserted: u64,
    /// Existing rows whose fields changed.
    pub entries_updated: u64,
    /// Rows removed by pruning, descendants included.
    pub entries_deleted: u64,
    /// Entries skipped: unchanged entries and unreadable ones.
    pub entries_skipped: u64,
    /// The walk stopped early because the entry budget was exceeded.
    pub truncated: bool,
    /// Non-fatal warnings encountered during the walk.
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the run changed the store at all.
    pub fn is_noop(&self) -> bool {
        self.entries_inserted == 0 && self.entries_updated == 0 && self.entries_deleted == 0
    }

    /// Check if there were any warnings during the scan.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_default_is_noop() {
        let report = ScanReport::new();
        assert!(report.is_noop());
        assert!(!report.truncated);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_report_noop_tracking() {
        let mut report = ScanReport::new();
        report.entries_visited = 10;
        report.entries_skipped = 10;
        assert!(report.is_noop());

        report.entries_updated = 1;
        assert!(!report.is_noop());
    }
}
