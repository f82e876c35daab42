//! Duplicate finder pipeline.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: inventory regular files into the size index
//! 2. **Select**: keep only files whose size is shared (see [`crate::duplicates::groups`])
//! 3. **Hash**: digest every candidate on a bounded worker pool
//! 4. **Verify** (optional): byte-for-byte confirmation of hash groups
//! 5. **Collect**: hash buckets with two or more members become groups
//!
//! The run is all-or-nothing. The first traversal or read error aborts it,
//! no further hash work is started, and no groups are returned.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::config::ScanConfig;
//! use dupescan::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(ScanConfig::default().with_max_concurrency(8));
//! let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{collect_duplicate_groups, select_candidates, DuplicateGroup};
use super::verify::verify_groups;
use super::BucketIndex;
use crate::config::ScanConfig;
use crate::error::FailFast;
use crate::progress::ProgressCallback;
use crate::scanner::{FileRecord, HashError, Hasher, RunStats, ScanError, Walker};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// Traversal failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Reading a candidate file failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The bounded worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for the hashing phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Maximum number of files hashed at the same time.
    pub max_concurrency: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            max_concurrency: crate::config::DEFAULT_MAX_CONCURRENCY,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the concurrency cap (clamped to at least 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
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
}

/// Statistics from the hashing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Files handed to the pool
    pub input_files: usize,
    /// Files fully hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Distinct digests observed
    pub distinct_digests: usize,
}

/// Hash every candidate on a pool of `max_concurrency` workers.
///
/// Each worker holds at most one open file, so the number of open files and
/// in-flight digests never exceeds the cap. Every finished digest is appended
/// to the returned hash index.
///
/// # Errors
///
/// The first [`HashError`] trips a shared latch: workers stop picking up new
/// files and that error is returned. Returns [`FinderError::Interrupted`] if
/// the shutdown flag is raised.
pub fn hash_candidates(
    candidates: Vec<FileRecord>,
    hasher: Hasher,
    config: &HashConfig,
) -> Result<(BucketIndex<String, FileRecord>, HashStats), FinderError> {
    let mut stats = HashStats {
        input_files: candidates.len(),
        ..Default::default()
    };
    let index = BucketIndex::new();

    if candidates.is_empty() {
        log::debug!("Hashing: No files to process");
        return Ok((index, stats));
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", candidates.len());
    }

    log::info!(
        "Hashing {} files with up to {} workers ({})",
        candidates.len(),
        config.max_concurrency,
        hasher.algorithm()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_concurrency)
        .thread_name(|i| format!("dupescan-hash-{i}"))
        .build()?;

    let latch: FailFast<HashError> = FailFast::new();
    let started = AtomicUsize::new(0);
    let hashed = AtomicUsize::new(0);
    let bytes = AtomicU64::new(0);

    pool.install(|| {
        // The Err(()) only short-circuits the iteration; the real error is in the latch.
        let _ = candidates.into_par_iter().try_for_each(|record| {
            if latch.is_tripped() {
                return Err(());
            }
            if config.is_shutdown_requested() {
                latch.cancel();
                return Err(());
            }

            if record.size > LARGE_FILE_THRESHOLD {
                log::debug!(
                    "Hashing large file ({} MB): {}",
                    record.size / (1024 * 1024),
                    record.path.display()
                );
            }

            let current = started.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(current, record.path.to_string_lossy().as_ref());
            }

            match hasher.hash_file(&record.path) {
                Ok(digest) => {
                    hashed.fetch_add(1, Ordering::Relaxed);
                    bytes.fetch_add(record.size, Ordering::Relaxed);
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_item_completed(record.size);
                    }
                    index.append(digest, record);
                    Ok(())
                }
                Err(e) => {
                    log::debug!("Failed to hash {}: {}", record.path.display(), e);
                    latch.fail(e);
                    Err(())
                }
            }
        });
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    if let Some(err) = latch.take() {
        return Err(FinderError::Hash(err));
    }
    if latch.is_tripped() || config.is_shutdown_requested() {
        log::info!("Hashing: Interrupted by shutdown signal");
        return Err(FinderError::Interrupted);
    }

    stats.hashed_files = hashed.into_inner();
    stats.bytes_hashed = bytes.into_inner();
    stats.distinct_digests = index.len();

    log::info!(
        "Hashing complete: {} files, {} read, {} distinct digests",
        stats.hashed_files,
        ByteSize::b(stats.bytes_hashed),
        stats.distinct_digests
    );

    Ok((index, stats))
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files accepted by the walker
    pub files_scanned: u64,
    /// Total size of accepted files in bytes
    pub total_bytes: u64,
    /// Files that shared a size with another file
    pub candidates: usize,
    /// Files actually opened and hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies across all groups
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_space: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl ScanSummary {
    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Duplicate finder that runs the whole pipeline for one root.
pub struct DuplicateFinder {
    config: ScanConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ScanConfig::default())
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn hash_config(&self) -> HashConfig {
        let mut config = HashConfig::default().with_max_concurrency(self.config.max_concurrency);
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(callback.clone());
        }
        config
    }

    /// Find all duplicate files under `path`.
    ///
    /// A regular file as `path` is scanned as a one-entry tree.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is unreadable
    /// - Any entry cannot be listed or stated during the walk
    /// - Any candidate file cannot be opened or read
    /// - The scan is interrupted by shutdown signal
    ///
    /// No partial result is ever returned.
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let stats = RunStats::new();

        std::fs::metadata(path).map_err(|e| ScanError::from_io(path, e))?;

        log::info!("Starting duplicate scan of {}", path.display());

        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Walk
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(path, self.config.excludes.clone());
        if let Some(ref flag) = self.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let sizes: BucketIndex<u64, PathBuf> = BucketIndex::new();
        let walked = walker.walk_into(&sizes, &stats);

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }
        walked?;

        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Found {} files ({} total)",
            stats.files_scanned(),
            ByteSize::b(stats.total_bytes())
        );

        let mut summary = ScanSummary {
            files_scanned: stats.files_scanned(),
            total_bytes: stats.total_bytes(),
            ..Default::default()
        };

        // Select
        let (candidates, selection) = select_candidates(sizes);
        summary.candidates = selection.candidates;

        if candidates.is_empty() {
            log::info!("No potential duplicates found after size filtering, scan complete");
            summary.elapsed = stats.elapsed();
            return Ok((Vec::new(), summary));
        }

        // Hash
        let hash_config = self.hash_config();
        let hasher = Hasher::new(self.config.algorithm);
        let (hashes, hash_stats) = hash_candidates(candidates, hasher, &hash_config)?;
        summary.hashed_files = hash_stats.hashed_files;
        summary.bytes_hashed = hash_stats.bytes_hashed;

        // Collect, then optionally confirm byte for byte
        let mut groups = collect_duplicate_groups(hashes);
        if self.config.paranoid && !groups.is_empty() {
            groups = verify_groups(groups, &hash_config)?;
        }

        summary.record_groups(&groups);
        summary.elapsed = stats.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            ByteSize::b(summary.reclaimable_space)
        );

        Ok((groups, summary))
    }
}
