//! Schema for the dimension table.
//!
//! One table, `dim_file`, holds the whole tree: every row references its
//! parent by id, the single root has `parent_id IS NULL`. A partial unique
//! index enforces exactly one root, and an AFTER UPDATE trigger guarantees
//! `updated_at` is refreshed on every row update regardless of which fields
//! changed (the upsert SQL also sets it; the double-write is idempotent).

use rusqlite::Connection;

use crate::error::StoreError;

pub const SCHEMA_VERSION: &str = "1";

const CREATE_SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    ) WITHOUT ROWID;

    CREATE TABLE IF NOT EXISTS dim_file (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id    INTEGER REFERENCES dim_file(id) ON DELETE CASCADE,
        name         TEXT    NOT NULL,
        is_directory INTEGER NOT NULL DEFAULT 0,
        content_hash BLOB,
        size         INTEGER,
        device_id    INTEGER,
        inode        INTEGER,
        mime_type    TEXT,
        modified_at  INTEGER,
        created_at   INTEGER NOT NULL,
        updated_at   INTEGER NOT NULL,
        UNIQUE (parent_id, name)
    );

    -- SQLite treats NULLs as distinct in UNIQUE constraints, so the single
    -- root needs its own partial unique index over a constant expression.
    CREATE UNIQUE INDEX IF NOT EXISTS idx_dim_file_single_root
        ON dim_file ((parent_id IS NULL)) WHERE parent_id IS NULL;

    CREATE INDEX IF NOT EXISTS idx_dim_file_parent
        ON dim_file (parent_id);

    CREATE INDEX IF NOT EXISTS idx_dim_file_hash
        ON dim_file (content_hash) WHERE content_hash IS NOT NULL;

    CREATE INDEX IF NOT EXISTS idx_dim_file_inode
        ON dim_file (device_id, inode) WHERE inode IS NOT NULL;

    CREATE TRIGGER IF NOT EXISTS trg_dim_file_touch
    AFTER UPDATE ON dim_file
    FOR EACH ROW
    WHEN NEW.updated_at = OLD.updated_at
    BEGIN
        UPDATE dim_file
           SET updated_at = CAST(strftime('%s', 'now') AS INTEGER)
         WHERE id = NEW.id;
    END;
";

/// Apply per-connection pragmas. WAL keeps long scans from blocking
/// concurrent duplicate queries; foreign keys drive the cascade on
/// subtree deletes.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;",
    )?;
    Ok(())
}

/// Create tables, indexes, and triggers if they don't exist.
pub fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}
