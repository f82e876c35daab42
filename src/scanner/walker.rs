//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, a single-pass sequential
//! traversal that inventories every regular file under a root. It never
//! follows symbolic links, skips empty files, and prunes whole subtrees whose
//! directory name is in the configured [`ExcludeSet`].
//!
//! Any traversal error is fatal for the caller: [`Walker::walk_into`] stops at
//! the first one and returns it.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::config::ExcludeSet;
//! use dupescan::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), ExcludeSet::defaults());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, RunStats, ScanError};
use crate::config::ExcludeSet;
use crate::duplicates::BucketIndex;
use crate::progress::ProgressCallback;

/// Sequential directory walker.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Directory names to prune
    excludes: ExcludeSet,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("excludes", &self.excludes.patterns())
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `excludes` - Directory names whose subtrees are skipped
    #[must_use]
    pub fn new(path: &Path, excludes: ExcludeSet) -> Self {
        Self {
            root: path.to_path_buf(),
            excludes,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration as soon
    /// as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback, notified once per accepted file.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Whether a directory entry heads a pruned subtree.
    ///
    /// The root itself is never pruned, whatever its name.
    fn is_pruned(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self.excludes.is_excluded(&entry.file_name().to_string_lossy())
    }

    /// Walk the directory tree, yielding accepted files.
    ///
    /// Errors are yielded in place; callers decide whether to stop. The
    /// iterator ends early if the shutdown flag is raised.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| {
                if self.is_pruned(entry) {
                    log::debug!("Pruning excluded directory: {}", entry.path().display());
                    false
                } else {
                    true
                }
            })
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => Some(Err(self.handle_walkdir_error(e))),
            })
    }

    /// Walk the tree, recording every accepted file in `sizes` and `stats`.
    ///
    /// # Errors
    ///
    /// Returns the first traversal error; nothing after it is visited.
    pub fn walk_into(&self, sizes: &BucketIndex<u64, PathBuf>, stats: &RunStats) -> Result<(), ScanError> {
        for entry in self.walk() {
            let record = entry?;
            stats.record(record.size);
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(
                    stats.files_scanned() as usize,
                    record.path.to_string_lossy().as_ref(),
                );
            }
            sizes.append(record.size, record.path);
        }
        Ok(())
    }

    /// Turn a directory entry into a record, or drop it.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileRecord, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walkdir_error(e))),
        };

        let size = metadata.len();
        if size == 0 {
            log::trace!("Skipping empty file: {}", entry.path().display());
            return None;
        }

        Some(Ok(FileRecord::new(entry.into_path(), size)))
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        match error.into_io_error() {
            Some(source) => ScanError::from_io(&path, source),
            None => ScanError::Io {
                path,
                source: io::Error::other("filesystem loop detected"),
            },
        }
    }
}
