//! Filesystem reconciliation engine for filedim.
//!
//! Walks live directory trees against the stored dimension table and emits
//! the minimal set of inserts, updates, and deletes to bring the store in
//! sync. Hashing of changed files runs in parallel across siblings; all
//! writes serialize through the store.

mod error;
mod hash;
mod meta;
mod reconcile;
mod scanner;

pub use error::ScanError;
pub use hash::{Blake3Hasher, ContentHasher, HASH_CHUNK_SIZE};
pub use meta::read_metadata;
pub use scanner::Scanner;
