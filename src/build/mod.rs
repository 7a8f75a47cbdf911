//! Index building: scan -> tokenize -> upsert, fanned out over a worker pool.

mod coordinator;

pub use coordinator::{BuildCoordinator, BuildMode, LastBuild, StartOutcome};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::index::InvertedIndex;
use crate::pool::WorkerPool;
use crate::scan::{FileInfo, FileScanner};
use crate::store::DocumentStore;
use crate::tokenizer::Tokenizer;

/// Aggregate counters for one build pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub scanned_files: usize,
    pub indexed_files: usize,
    pub skipped_files: usize,
    pub errors: usize,
    pub elapsed_ms: u64,
}

#[derive(Default)]
struct Counters {
    indexed: usize,
    skipped: usize,
    errors: usize,
}

/// Drives a full or incremental pass over a dataset directory.
///
/// Each file becomes one pool task; the final index state is independent of
/// the thread count because each path appears at most once per scan and
/// document replacement is keyed by doc_id.
pub struct IndexBuilder {
    index: Arc<InvertedIndex>,
    store: Arc<DocumentStore>,
    tokenizer: Tokenizer,
    scanner: FileScanner,
}

impl IndexBuilder {
    pub fn new(index: Arc<InvertedIndex>, store: Arc<DocumentStore>, tokenizer: Tokenizer) -> Self {
        Self {
            index,
            store,
            tokenizer,
            scanner: FileScanner::new(ScanConfig::default()),
        }
    }

    pub fn with_scanner(mut self, scanner: FileScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Index every admitted file under `root`, replacing existing documents.
    pub fn build_from_directory(&self, root: impl AsRef<Path>, threads: usize) -> Result<BuildResult> {
        let files = self.scanner.scan(root);
        self.index_files(files, threads, false)
    }

    /// Incremental pass: files whose mtime is not newer than the stored one
    /// are skipped.
    pub fn update_from_directory(&self, root: impl AsRef<Path>, threads: usize) -> Result<BuildResult> {
        let files = self.scanner.scan(root);
        self.index_files(files, threads, true)
    }

    pub fn index_files(
        &self,
        files: Vec<FileInfo>,
        threads: usize,
        incremental: bool,
    ) -> Result<BuildResult> {
        let start = Instant::now();
        let scanned_files = files.len();

        let pool = WorkerPool::new(threads.max(1));
        let counters = Arc::new(Mutex::new(Counters::default()));

        let mut handles = Vec::with_capacity(files.len());
        for fi in files {
            let index = Arc::clone(&self.index);
            let store = Arc::clone(&self.store);
            let tokenizer = self.tokenizer.clone();
            let counters = Arc::clone(&counters);

            handles.push(pool.submit(move || {
                index_one_file(&index, &store, &tokenizer, &fi, incremental, &counters);
            })?);
        }

        for handle in handles {
            if handle.join().is_err() {
                counters.lock().errors += 1;
            }
        }
        pool.shutdown();

        let result = {
            let c = counters.lock();
            BuildResult {
                scanned_files,
                indexed_files: c.indexed,
                skipped_files: c.skipped,
                errors: c.errors,
                elapsed_ms: start.elapsed().as_millis() as u64,
            }
        };

        info!(
            scanned = result.scanned_files,
            indexed = result.indexed_files,
            skipped = result.skipped_files,
            errors = result.errors,
            elapsed_ms = result.elapsed_ms,
            "index build finished"
        );

        Ok(result)
    }
}

fn index_one_file(
    index: &InvertedIndex,
    store: &DocumentStore,
    tokenizer: &Tokenizer,
    fi: &FileInfo,
    incremental: bool,
    counters: &Mutex<Counters>,
) {
    if incremental && !store.needs_indexing(&fi.path, fi.mtime) {
        counters.lock().skipped += 1;
        return;
    }

    let bytes = match std::fs::read(&fi.path) {
        Ok(bytes) => bytes,
        Err(_) => {
            counters.lock().errors += 1;
            return;
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    let term_freq = tokenizer.term_frequencies(&text);
    let (doc_id, _created) = store.get_or_create(&fi.path, fi.mtime);
    index.upsert_document(doc_id, &term_freq);
    store.update_mtime(&fi.path, fi.mtime);

    counters.lock().indexed += 1;
}
