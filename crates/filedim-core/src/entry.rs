//! Persisted file entry types.

use serde::{Deserialize, Serialize};

/// Unique identifier of a stored entry, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl EntryId {
    /// Create a new EntryId from a raw row id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

/// BLAKE3 content digest used as the content identity of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Reconstruct a hash from a stored blob; `None` if the length is wrong.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Filesystem-level identity of an entry, used for hard link detection.
///
/// Two entries with equal `(device, inode)` are the same underlying file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeInfo {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl InodeInfo {
    /// Create new inode info.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

/// Attributes read from the filesystem for a single entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Byte length; `None` for directories.
    pub size: Option<u64>,
    /// Device/inode identity, if the platform exposes it.
    pub inode: Option<InodeInfo>,
    /// Filesystem last-modification time, unix seconds.
    pub modified_at: i64,
    /// Best-effort MIME classification; `None` for directories or unknown types.
    pub mime_type: Option<String>,
}

/// One persisted row of the dimension table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Row id, immutable once assigned.
    pub id: EntryId,
    /// Owning directory; `None` exactly once, for the root.
    pub parent_id: Option<EntryId>,
    /// Name within the parent; `(parent_id, name)` is unique.
    pub name: String,
    /// Directory flag; directories carry no hash and no size.
    pub is_directory: bool,
    /// Content digest; `None` for directories and not-yet-hashed files.
    pub content_hash: Option<ContentHash>,
    /// Byte length; `None` for directories.
    pub size: Option<u64>,
    /// Device/inode identity.
    pub inode: Option<InodeInfo>,
    /// Best-effort MIME classification.
    pub mime_type: Option<String>,
    /// Filesystem mtime at the last verified state, unix seconds.
    pub modified_at: Option<i64>,
    /// Set once at first insertion, unix seconds.
    pub created_at: i64,
    /// Refreshed on every insert or update, unix seconds.
    pub updated_at: i64,
}

impl FileEntry {
    /// The `(device, inode)` key identifying the physical file, if known.
    pub fn physical_key(&self) -> Option<(u64, u64)> {
        self.inode.map(|i| (i.device, i.inode))
    }
}

/// Fields supplied when upserting an entry; ids and bookkeeping timestamps
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct FileEntryDraft {
    pub parent_id: EntryId,
    pub name: String,
    pub is_directory: bool,
    pub content_hash: Option<ContentHash>,
    pub size: Option<u64>,
    pub inode: Option<InodeInfo>,
    pub mime_type: Option<String>,
    pub modified_at: Option<i64>,
}

impl FileEntryDraft {
    /// Draft for a directory entry.
    pub fn directory(parent_id: EntryId, name: impl Into<String>, modified_at: Option<i64>) -> Self {
        Self {
            parent_id,
            name: name.into(),
            is_directory: true,
            content_hash: None,
            size: None,
            inode: None,
            mime_type: None,
            modified_at,
        }
    }

    /// Draft for a regular file from its observed metadata and hash.
    ///
    /// `content_hash` may be `None` when hashing failed; the row is then
    /// eligible for a retry on the next scan.
    pub fn file(
        parent_id: EntryId,
        name: impl Into<String>,
        meta: &EntryMetadata,
        content_hash: Option<ContentHash>,
    ) -> Self {
        Self {
            parent_id,
            name: name.into(),
            is_directory: false,
            content_hash,
            size: meta.size,
            inode: meta.inode,
            mime_type: meta.mime_type.clone(),
            modified_at: Some(meta.modified_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with("abab"));
    }

    #[test]
    fn test_content_hash_from_slice() {
        assert!(ContentHash::from_slice(&[0u8; 32]).is_some());
        assert!(ContentHash::from_slice(&[0u8; 31]).is_none());
        assert!(ContentHash::from_slice(&[]).is_none());
    }

    #[test]
    fn test_file_draft() {
        let meta = EntryMetadata {
            is_directory: false,
            size: Some(1024),
            inode: Some(InodeInfo::new(1, 42)),
            modified_at: 1_700_000_000,
            mime_type: Some("text/plain".to_string()),
        };
        let draft = FileEntryDraft::file(EntryId::new(1), "notes.txt", &meta, None);
        assert!(!draft.is_directory);
        assert_eq!(draft.size, Some(1024));
        assert_eq!(draft.modified_at, Some(1_700_000_000));
        assert!(draft.content_hash.is_none());
    }

    #[test]
    fn test_directory_draft_has_no_size() {
        let draft = FileEntryDraft::directory(EntryId::new(1), "src", Some(5));
        assert!(draft.is_directory);
        assert!(draft.size.is_none());
        assert!(draft.content_hash.is_none());
    }
}
