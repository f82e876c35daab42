//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Concurrent size and hash indexes ([`BucketIndex`])
//! - Size-based candidate selection
//! - Bounded-concurrency content hashing
//! - Optional byte-for-byte verification
//! - Duplicate group management

pub mod finder;
pub mod groups;
pub mod index;
pub mod verify;

pub use finder::{hash_candidates, DuplicateFinder, FinderError, HashConfig, HashStats, ScanSummary};
pub use groups::{collect_duplicate_groups, select_candidates, DuplicateGroup, SelectionStats};
pub use index::BucketIndex;
pub use verify::{files_identical, verify_groups};
