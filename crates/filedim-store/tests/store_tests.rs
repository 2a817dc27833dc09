//! Integration tests for the file-backed tree store.

use std::collections::HashMap;
use std::path::Path;

use tempfile::TempDir;

use filedim_core::{ContentHash, EntryMetadata, FileEntryDraft, InodeInfo};
use filedim_store::TreeStore;

fn sample_meta(size: u64, inode: u64) -> EntryMetadata {
    EntryMetadata {
        is_directory: false,
        size: Some(size),
        inode: Some(InodeInfo::new(1, inode)),
        modified_at: 1_700_000_000,
        mime_type: Some("application/octet-stream".to_string()),
    }
}

#[test]
fn test_store_persists_across_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("index.db");

    let id = {
        let store = TreeStore::open(&db_path).unwrap();
        let dir = store
            .ensure_path(Path::new("/data/photos"), &mut HashMap::new())
            .unwrap();
        let entry = store
            .upsert(&FileEntryDraft::file(
                dir,
                "cat.jpg",
                &sample_meta(2048, 77),
                Some(ContentHash::new([9u8; 32])),
            ))
            .unwrap();
        entry.id
    };

    let store = TreeStore::open(&db_path).unwrap();
    let mut cache = HashMap::new();
    assert_eq!(
        store.full_path(id, &mut cache).unwrap(),
        Path::new("/data/photos/cat.jpg")
    );
    let dir = store
        .ensure_path(Path::new("/data/photos"), &mut HashMap::new())
        .unwrap();
    let entry = store.find_child(dir, "cat.jpg").unwrap().unwrap();
    assert_eq!(entry.size, Some(2048));
    assert_eq!(entry.content_hash, Some(ContentHash::new([9u8; 32])));
}

#[test]
fn test_parent_chain_terminates_at_single_root() {
    let temp = TempDir::new().unwrap();
    let store = TreeStore::open(temp.path().join("index.db")).unwrap();

    let deep = store
        .ensure_path(Path::new("/a/b/c/d"), &mut HashMap::new())
        .unwrap();

    // Follow parent links upward; we must reach the NULL-parent root.
    let mut current = deep;
    let mut hops = 0;
    loop {
        let root = store.root_id().unwrap().unwrap();
        if current == root {
            break;
        }
        let mut cache = HashMap::new();
        let path = store.full_path(current, &mut cache).unwrap();
        let parent_path = path.parent().unwrap().to_path_buf();
        current = store.ensure_path(&parent_path, &mut HashMap::new()).unwrap();
        hops += 1;
        assert!(hops <= 5, "parent chain did not terminate");
    }
}

#[test]
fn test_delete_subtree_count_matches_rows_removed() {
    let store = TreeStore::open_in_memory().unwrap();
    let deep = store
        .ensure_path(Path::new("/a/b/c"), &mut HashMap::new())
        .unwrap();
    store
        .upsert(&FileEntryDraft::file(
            deep,
            "leaf.bin",
            &sample_meta(1, 9),
            None,
        ))
        .unwrap();

    let top = store.ensure_path(Path::new("/a"), &mut HashMap::new()).unwrap();
    let before = store.entry_count().unwrap();
    let removed = store.delete_subtree(top).unwrap();
    let after = store.entry_count().unwrap();
    assert_eq!(removed, 4); // a, b, c, leaf.bin
    assert_eq!(removed, before - after);
}

#[test]
fn test_find_by_hash_excludes_directories() {
    let store = TreeStore::open_in_memory().unwrap();
    let root = store.ensure_root().unwrap();
    let hash = ContentHash::new([3u8; 32]);

    store
        .upsert(&FileEntryDraft::file(
            root,
            "one.bin",
            &sample_meta(16, 1),
            Some(hash),
        ))
        .unwrap();
    store
        .upsert(&FileEntryDraft::directory(root, "somedir", None))
        .unwrap();

    let found = store.find_by_hash(&hash).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "one.bin");
    assert!(!found[0].is_directory);
}
