//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "all_unique": false,
//!   "summary": {
//!     "files_scanned": 100,
//!     "total_size": 1048576,
//!     "candidates": 12,
//!     "hashed_files": 12,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 7,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "algorithm": "blake3",
//!     "verified": false,
//!     "exit_code": 0
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::HashAlgorithm;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Hex digest shared by every file
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Paths of all files in the group, sorted
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.digest.clone(),
            size: group.size,
            files: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of regular, non-empty files visited
    pub files_scanned: u64,
    /// Total size of visited files in bytes
    pub total_size: u64,
    /// Files that shared a size with another file
    pub candidates: usize,
    /// Files opened and hashed
    pub hashed_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies (every group member but one)
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Digest algorithm used
    pub algorithm: HashAlgorithm,
    /// Whether groups were confirmed byte for byte
    pub verified: bool,
    /// The process exit code for this run
    pub exit_code: i32,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// True when no duplicates were found
    pub all_unique: bool,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate groups and summary.
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::{DuplicateGroup, ScanSummary};
    /// use dupescan::output::json::JsonOutput;
    /// use dupescan::scanner::HashAlgorithm;
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     "ab12".to_string(),
    ///     1024,
    ///     vec![PathBuf::from("/file1.txt"), PathBuf::from("/file2.txt")],
    /// )];
    ///
    /// let output = JsonOutput::new(&groups, &ScanSummary::default(), HashAlgorithm::Blake3, false);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        summary: &ScanSummary,
        algorithm: HashAlgorithm,
        verified: bool,
    ) -> Self {
        Self {
            duplicates: groups.iter().map(JsonDuplicateGroup::from).collect(),
            all_unique: groups.is_empty(),
            summary: JsonSummary {
                files_scanned: summary.files_scanned,
                total_size: summary.total_bytes,
                candidates: summary.candidates,
                hashed_files: summary.hashed_files,
                duplicate_groups: summary.duplicate_groups,
                duplicate_files: summary.duplicate_files,
                reclaimable_space: summary.reclaimable_space,
                scan_duration_ms: u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
                algorithm,
                verified,
                exit_code: ExitCode::Success.as_i32(),
            },
        }
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
