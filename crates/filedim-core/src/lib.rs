//! Core types for filedim.
//!
//! This crate provides the fundamental data structures shared across the
//! filedim ecosystem: the persisted file entry row, filesystem metadata,
//! scan configuration, and the error/warning taxonomy.

mod config;
mod entry;
mod error;
mod report;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use entry::{ContentHash, EntryId, EntryMetadata, FileEntry, FileEntryDraft, InodeInfo};
pub use error::{HashError, MetaError, ScanWarning, WarningKind};
pub use report::ScanReport;

/// Current wall-clock time as unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
