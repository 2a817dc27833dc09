//! Tree store operations over the dimension table.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use filedim_core::{ContentHash, EntryId, FileEntry, FileEntryDraft, InodeInfo, unix_now};

use crate::error::StoreError;
use crate::schema;

/// Name of the single NULL-parent root entry.
const ROOT_NAME: &str = "/";

const ENTRY_COLUMNS: &str = "id, parent_id, name, is_directory, content_hash, \
     size, device_id, inode, mime_type, modified_at, created_at, updated_at";

/// Handle to the dimension table.
///
/// Owns a single connection; WAL mode allows readers (the dedupe finder) to
/// run while a scan is writing through another handle on the same file.
pub struct TreeStore {
    conn: Connection,
}

impl TreeStore {
    /// Open (or create) a store at the given database path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        schema::apply_pragmas(&conn)?;
        schema::create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::apply_pragmas(&conn)?;
        schema::create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Id of the root entry, if the store has been seeded.
    pub fn root_id(&self) -> Result<Option<EntryId>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM dim_file WHERE parent_id IS NULL",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(EntryId::new))
    }

    /// Seed the single root entry if absent and return its id.
    pub fn ensure_root(&self) -> Result<EntryId, StoreError> {
        if let Some(id) = self.root_id()? {
            return Ok(id);
        }
        let now = unix_now();
        self.conn.execute(
            "INSERT INTO dim_file (parent_id, name, is_directory, created_at, updated_at)
             VALUES (NULL, ?1, 1, ?2, ?2)",
            params![ROOT_NAME, now],
        )?;
        debug!("seeded root entry");
        Ok(EntryId::new(self.conn.last_insert_rowid()))
    }

    /// Look up a child by `(parent_id, name)`.
    pub fn find_child(&self, parent: EntryId, name: &str) -> Result<Option<FileEntry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM dim_file WHERE parent_id = ?1 AND name = ?2"
        );
        let entry = self
            .conn
            .query_row(&sql, params![parent.0, name], entry_from_row)
            .optional()?;
        Ok(entry)
    }

    /// List all direct children of an entry, ordered by name.
    pub fn list_children(&self, parent: EntryId) -> Result<Vec<FileEntry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM dim_file WHERE parent_id = ?1 ORDER BY name"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let entries = stmt
            .query_map(params![parent.0], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Insert or update an entry, keyed atomically on `(parent_id, name)`.
    ///
    /// On conflict the content fields are replaced and `updated_at` bumped;
    /// `id` and `created_at` are preserved from the first successful insert.
    pub fn upsert(&self, draft: &FileEntryDraft) -> Result<FileEntry, StoreError> {
        let now = unix_now();
        let hash_blob = draft.content_hash.as_ref().map(|h| h.0.to_vec());
        let (device_id, inode) = match draft.inode {
            Some(info) => (Some(info.device as i64), Some(info.inode as i64)),
            None => (None, None),
        };
        self.conn.execute(
            "INSERT INTO dim_file (
                 parent_id, name, is_directory, content_hash, size,
                 device_id, inode, mime_type, modified_at, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT (parent_id, name) DO UPDATE SET
                 is_directory = excluded.is_directory,
                 content_hash = excluded.content_hash,
                 size         = excluded.size,
                 device_id    = excluded.device_id,
                 inode        = excluded.inode,
                 mime_type    = excluded.mime_type,
                 modified_at  = excluded.modified_at,
                 updated_at   = excluded.updated_at",
            params![
                draft.parent_id.0,
                draft.name,
                draft.is_directory,
                hash_blob,
                draft.size.map(|s| s as i64),
                device_id,
                inode,
                draft.mime_type,
                draft.modified_at,
                now,
            ],
        )?;
        self.find_child(draft.parent_id, &draft.name)?
            .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Delete an entry and, transitively, all of its descendants.
    ///
    /// Returns the number of rows removed. Count and delete run in one
    /// transaction, so the count matches the rows the cascade removes even
    /// with a concurrent writer on another connection.
    pub fn delete_subtree(&self, id: EntryId) -> Result<u64, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let count: i64 = tx.query_row(
            "WITH RECURSIVE subtree(id) AS (
                 SELECT id FROM dim_file WHERE id = ?1
                 UNION ALL
                 SELECT d.id FROM dim_file d JOIN subtree s ON d.parent_id = s.id
             )
             SELECT COUNT(*) FROM subtree",
            params![id.0],
            |row| row.get(0),
        )?;
        tx.execute("DELETE FROM dim_file WHERE id = ?1", params![id.0])?;
        tx.commit()?;
        Ok(count as u64)
    }

    /// All non-directory entries carrying the given content hash.
    pub fn find_by_hash(&self, hash: &ContentHash) -> Result<Vec<FileEntry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM dim_file
             WHERE content_hash = ?1 AND is_directory = 0
             ORDER BY id"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let entries = stmt
            .query_map(params![hash.0.to_vec()], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Hashes shared by two or more non-directory entries, with their rows.
    pub fn group_duplicate_hashes(
        &self,
    ) -> Result<Vec<(ContentHash, Vec<FileEntry>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT content_hash FROM dim_file
             WHERE is_directory = 0 AND content_hash IS NOT NULL
             GROUP BY content_hash HAVING COUNT(*) >= 2
             ORDER BY content_hash",
        )?;
        let blobs = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups = Vec::with_capacity(blobs.len());
        for blob in blobs {
            let Some(hash) = ContentHash::from_slice(&blob) else {
                continue;
            };
            let entries = self.find_by_hash(&hash)?;
            groups.push((hash, entries));
        }
        Ok(groups)
    }

    /// Ensure a directory path exists in the tree, creating missing
    /// directory rows as needed, and return the final directory's id.
    ///
    /// The cache maps already-resolved absolute paths to ids for the
    /// duration of a run.
    pub fn ensure_path(
        &self,
        path: &Path,
        cache: &mut HashMap<PathBuf, EntryId>,
    ) -> Result<EntryId, StoreError> {
        if !path.is_absolute() {
            return Err(StoreError::RelativePath {
                path: path.to_path_buf(),
            });
        }
        if let Some(id) = cache.get(path) {
            return Ok(*id);
        }

        let mut parent = self.ensure_root()?;
        let mut walked = PathBuf::from(ROOT_NAME);
        for component in path.components() {
            let Component::Normal(name) = component else {
                continue;
            };
            let name = name.to_string_lossy();
            walked.push(name.as_ref());
            if let Some(id) = cache.get(&walked) {
                parent = *id;
                continue;
            }
            parent = match self.find_child(parent, &name)? {
                Some(entry) => entry.id,
                None => {
                    debug!(name = %name, parent = parent.0, "creating directory entry");
                    self.upsert(&FileEntryDraft::directory(parent, name.as_ref(), None))?
                        .id
                }
            };
            cache.insert(walked.clone(), parent);
        }
        Ok(parent)
    }

    /// Reconstruct the absolute path of an entry by following parent links.
    pub fn full_path(
        &self,
        id: EntryId,
        cache: &mut HashMap<EntryId, PathBuf>,
    ) -> Result<PathBuf, StoreError> {
        if let Some(path) = cache.get(&id) {
            return Ok(path.clone());
        }
        let (parent_id, name): (Option<i64>, String) = self
            .conn
            .query_row(
                "SELECT parent_id, name FROM dim_file WHERE id = ?1",
                params![id.0],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(StoreError::MissingEntry { id: id.0 })?;

        let path = match parent_id {
            None => PathBuf::from(ROOT_NAME),
            Some(parent) => self.full_path(EntryId::new(parent), cache)?.join(name),
        };
        cache.insert(id, path.clone());
        Ok(path)
    }

    /// Total number of rows in the dimension table.
    pub fn entry_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dim_file", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Map a `dim_file` row to a `FileEntry`.
fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileEntry> {
    let hash_blob: Option<Vec<u8>> = row.get(4)?;
    let device_id: Option<i64> = row.get(6)?;
    let inode: Option<i64> = row.get(7)?;
    Ok(FileEntry {
        id: EntryId::new(row.get(0)?),
        parent_id: row.get::<_, Option<i64>>(1)?.map(EntryId::new),
        name: row.get(2)?,
        is_directory: row.get(3)?,
        content_hash: hash_blob.as_deref().and_then(ContentHash::from_slice),
        size: row.get::<_, Option<i64>>(5)?.map(|s| s as u64),
        inode: match (device_id, inode) {
            (Some(dev), Some(ino)) => Some(InodeInfo::new(dev as u64, ino as u64)),
            _ => None,
        },
        mime_type: row.get(8)?,
        modified_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
