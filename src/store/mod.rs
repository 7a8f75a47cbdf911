//! Document identity store
//!
//! Maps paths to stable numeric ids and tracks the mtime each path was last
//! indexed at. Ids start at 1, are never reused within a process, and the
//! same path always resolves to the same id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;

pub type DocumentId = u64;

/// Per-document metadata owned by the store.
#[derive(Clone, Debug)]
pub struct DocumentMeta {
    pub doc_id: DocumentId,
    pub path: PathBuf,
    pub mtime: SystemTime,
}

#[derive(Default)]
struct Maps {
    by_path: HashMap<PathBuf, DocumentMeta>,
    by_id: HashMap<DocumentId, PathBuf>,
}

/// Thread-safe bidirectional path <-> doc_id map with mtime tracking.
pub struct DocumentStore {
    maps: RwLock<Maps>,
    next_id: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            maps: RwLock::new(Maps::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Return the existing id for `path`, or allocate a fresh one and
    /// register `(path, mtime)`. Under racing callers exactly one observes
    /// `created_new == true` for a given path.
    pub fn get_or_create(&self, path: &Path, mtime: SystemTime) -> (DocumentId, bool) {
        {
            let maps = self.maps.read();
            if let Some(meta) = maps.by_path.get(path) {
                return (meta.doc_id, false);
            }
        }

        let mut maps = self.maps.write();
        // Re-check under the write lock: another creator may have won.
        if let Some(meta) = maps.by_path.get(path) {
            return (meta.doc_id, false);
        }

        let doc_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let meta = DocumentMeta {
            doc_id,
            path: path.to_path_buf(),
            mtime,
        };
        maps.by_path.insert(path.to_path_buf(), meta);
        maps.by_id.insert(doc_id, path.to_path_buf());

        (doc_id, true)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.maps.read().by_path.contains_key(path)
    }

    /// True if `path` is unknown or was last indexed at an older mtime.
    pub fn needs_indexing(&self, path: &Path, mtime: SystemTime) -> bool {
        let maps = self.maps.read();
        match maps.by_path.get(path) {
            Some(meta) => mtime > meta.mtime,
            None => true,
        }
    }

    /// Overwrite the stored mtime; no-op if the path is unknown.
    pub fn update_mtime(&self, path: &Path, mtime: SystemTime) {
        let mut maps = self.maps.write();
        if let Some(meta) = maps.by_path.get_mut(path) {
            meta.mtime = mtime;
        }
    }

    pub fn path_for(&self, doc_id: DocumentId) -> Option<PathBuf> {
        self.maps.read().by_id.get(&doc_id).cloned()
    }

    pub fn doc_id_for(&self, path: &Path) -> Option<DocumentId> {
        self.maps.read().by_path.get(path).map(|m| m.doc_id)
    }

    /// Snapshot of every document's metadata; order unspecified.
    pub fn list_all(&self) -> Vec<DocumentMeta> {
        self.maps.read().by_path.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.maps.read().by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.read().by_path.is_empty()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}
