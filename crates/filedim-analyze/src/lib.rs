//! Duplicate analysis for filedim.
//!
//! Reads only from the tree store, after one or more scans have populated
//! it. Distinguishes true content duplicates from hard-link aliases of the
//! same physical file.

mod dupes;

pub use dupes::{DedupeFinder, DuplicateGroup, DuplicateReport, ReportLine};
