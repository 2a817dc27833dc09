//! SQLite-backed tree store for filedim.
//!
//! Persists the hierarchical dimension table described in filedim-core and
//! exposes the lookup, upsert, subtree-delete, and duplicate-grouping
//! operations the scanner and the dedupe finder build on. All mutations are
//! transactional; the store is the single serialization point between
//! concurrent scan workers.

mod error;
mod schema;
mod store;

pub use error::StoreError;
pub use store::TreeStore;
