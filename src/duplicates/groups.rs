//! Candidate selection and duplicate group collection.
//!
//! # Overview
//!
//! Files with different sizes cannot be duplicates. [`select_candidates`]
//! drains the size index and keeps only buckets holding two or more paths,
//! so files of unique size are never opened. After hashing,
//! [`collect_duplicate_groups`] turns every multi-member hash bucket into a
//! [`DuplicateGroup`].
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{select_candidates, BucketIndex};
//! use std::path::PathBuf;
//!
//! let sizes = BucketIndex::new();
//! sizes.append(100, PathBuf::from("/a.txt"));
//! sizes.append(100, PathBuf::from("/b.txt"));
//! sizes.append(200, PathBuf::from("/c.txt"));
//!
//! let (candidates, stats) = select_candidates(sizes);
//!
//! assert_eq!(candidates.len(), 2);
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use std::path::PathBuf;

use serde::Serialize;

use super::BucketIndex;
use crate::scanner::FileRecord;

/// A confirmed group of files with identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Hex-encoded content digest shared by every member
    pub digest: String,
    /// File size in bytes (shared by every member)
    pub size: u64,
    /// Member paths, sorted
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group; `paths` are sorted.
    #[must_use]
    pub fn new(digest: String, size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        Self {
            digest,
            size,
            paths,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (all members minus one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes that keeping a single copy would free.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Statistics from candidate selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Number of distinct file sizes seen by the walker
    pub unique_sizes: usize,
    /// Files dropped because nothing else shares their size
    pub eliminated_unique: usize,
    /// Files kept for hashing
    pub candidates: usize,
    /// Size buckets with two or more files
    pub candidate_buckets: usize,
}

impl SelectionStats {
    /// Percentage of files eliminated by size alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        let total = self.eliminated_unique + self.candidates;
        if total == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / total as f64) * 100.0
        }
    }
}

/// Keep only files that share their size with at least one other file.
///
/// Consumes the size index; the returned records are in no particular order.
#[must_use]
pub fn select_candidates(sizes: BucketIndex<u64, PathBuf>) -> (Vec<FileRecord>, SelectionStats) {
    let mut stats = SelectionStats {
        unique_sizes: sizes.len(),
        ..Default::default()
    };
    let mut candidates = Vec::new();

    for (size, paths) in sizes.into_buckets() {
        if paths.len() < 2 {
            stats.eliminated_unique += paths.len();
            if let Some(path) = paths.first() {
                log::trace!("Eliminated unique size {}: {}", size, path.display());
            }
            continue;
        }

        log::debug!("Size group {} bytes: {} candidates", size, paths.len());
        stats.candidate_buckets += 1;
        stats.candidates += paths.len();
        candidates.extend(paths.into_iter().map(|path| FileRecord::new(path, size)));
    }

    log::info!(
        "Size filter: {} candidates in {} buckets ({:.1}% eliminated)",
        stats.candidates,
        stats.candidate_buckets,
        stats.elimination_rate()
    );

    (candidates, stats)
}

/// Turn every hash bucket with two or more members into a duplicate group.
///
/// Groups are sorted by digest so that reports are stable across runs.
#[must_use]
pub fn collect_duplicate_groups(hashes: BucketIndex<String, FileRecord>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = hashes
        .into_buckets()
        .filter(|(_, records)| records.len() > 1)
        .map(|(digest, records)| {
            let size = records.first().map_or(0, |r| r.size);
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                digest,
                records.len(),
                size
            );
            DuplicateGroup::new(digest, size, records.into_iter().map(|r| r.path).collect())
        })
        .collect();

    groups.sort_by(|a, b| a.digest.cmp(&b.digest));
    groups
}
