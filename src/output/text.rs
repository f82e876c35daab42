//! Plain-text report.
//!
//! ```text
//! Duplicate files found:
//!
//! Hash: 2cf24d...
//!   /data/a.txt
//!   /data/b.txt
//!
//! Files scanned: 3
//! Total files size sum: 0 MB 0 KB
//! Time taken: 1.20ms
//! Duplicate groups: 1
//! ```

use std::io::{self, Write};

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Render a byte count as whole mebibytes plus the remaining whole kibibytes.
///
/// ```
/// use dupescan::output::text::format_size_mb_kb;
///
/// assert_eq!(format_size_mb_kb(3 * 1024 * 1024 + 5 * 1024 + 100), "3 MB 5 KB");
/// ```
#[must_use]
pub fn format_size_mb_kb(bytes: u64) -> String {
    let mb = bytes / 1024 / 1024;
    let kb = bytes / 1024 - mb * 1024;
    format!("{mb} MB {kb} KB")
}

/// Write the duplicate listing followed by the run summary.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_report<W: Write>(
    groups: &[DuplicateGroup],
    summary: &ScanSummary,
    out: &mut W,
) -> io::Result<()> {
    if groups.is_empty() {
        writeln!(out, "All files are unique")?;
    } else {
        writeln!(out, "Duplicate files found:")?;
        for group in groups {
            writeln!(out)?;
            writeln!(out, "Hash: {}", group.digest)?;
            for path in &group.paths {
                writeln!(out, "  {}", path.display())?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Files scanned: {}", summary.files_scanned)?;
    writeln!(
        out,
        "Total files size sum: {}",
        format_size_mb_kb(summary.total_bytes)
    )?;
    writeln!(out, "Time taken: {:.2?}", summary.elapsed)?;
    writeln!(out, "Duplicate groups: {}", summary.duplicate_groups)?;
    out.flush()
}
