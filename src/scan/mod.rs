//! Directory scanner feeding the index builder.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::config::ScanConfig;

/// A candidate file discovered by [`FileScanner::scan`].
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub mtime: SystemTime,
    pub size_bytes: u64,
}

/// Walks a dataset directory and returns the admitted files in a stable
/// (lexicographic) order so builds are reproducible.
#[derive(Clone, Debug)]
pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn accept(&self, path: &Path) -> bool {
        if !self.config.only_txt {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    }

    /// Scan `root_dir`. A missing root or a non-directory root yields an
    /// empty list; unreadable entries are skipped here and surface later as
    /// per-file build errors if they reappear.
    pub fn scan(&self, root_dir: impl AsRef<Path>) -> Vec<FileInfo> {
        let root = root_dir.as_ref();
        if !root.is_dir() {
            return Vec::new();
        }

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut out = Vec::new();

        for entry in WalkDir::new(root)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if self.config.max_files > 0 && out.len() >= self.config.max_files {
                break;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.accept(entry.path()) {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            out.push(FileInfo {
                path: entry.path().to_path_buf(),
                mtime,
                size_bytes: meta.len(),
            });
        }

        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}
