//! Byte-for-byte confirmation of hash groups.
//!
//! Used when `--paranoid` is given. Each group is split into classes of
//! files that are truly identical; classes with a single member are dropped.
//! A split means two different files produced the same digest, which is
//! logged as a warning.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use rayon::prelude::*;

use super::finder::{FinderError, HashConfig};
use super::groups::DuplicateGroup;
use crate::error::FailFast;
use crate::scanner::hasher::CHUNK_SIZE;
use crate::scanner::HashError;

/// Compare two files byte for byte.
///
/// # Errors
///
/// Returns [`HashError`] if either file cannot be opened or read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, HashError> {
    let mut left = BufReader::with_capacity(
        CHUNK_SIZE,
        File::open(a).map_err(|e| HashError::from_io(a, e))?,
    );
    let mut right = BufReader::with_capacity(
        CHUNK_SIZE,
        File::open(b).map_err(|e| HashError::from_io(b, e))?,
    );

    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let n = read_full(&mut left, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
        let m = read_full(&mut right, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;
        if n != m || buf_a[..n] != buf_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF).
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Worker count for verification; each worker holds two open files.
fn verify_workers(max_concurrency: usize) -> usize {
    (max_concurrency / 2).max(1)
}

/// Split one hash group into classes of byte-identical files.
fn split_group(group: &DuplicateGroup) -> Result<Vec<Vec<PathBuf>>, HashError> {
    let mut classes: Vec<Vec<PathBuf>> = Vec::new();

    for path in &group.paths {
        let mut placed = false;
        for class in &mut classes {
            if files_identical(&class[0], path)? {
                class.push(path.clone());
                placed = true;
                break;
            }
        }
        if !placed {
            classes.push(vec![path.clone()]);
        }
    }

    if classes.len() > 1 {
        log::warn!(
            "Digest collision in group {}: {} files split into {} classes",
            group.digest,
            group.len(),
            classes.len()
        );
    }

    Ok(classes)
}

/// Confirm every group byte for byte.
///
/// The pool runs half as many workers as `max_concurrency` (at least one),
/// so open files stay within the cap except when the cap is 1, where a
/// single worker holds two.
///
/// # Errors
///
/// The first read error aborts verification and is returned. Returns
/// [`FinderError::Interrupted`] if the shutdown flag is raised.
pub fn verify_groups(
    groups: Vec<DuplicateGroup>,
    config: &HashConfig,
) -> Result<Vec<DuplicateGroup>, FinderError> {
    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("verifying", groups.len());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(verify_workers(config.max_concurrency))
        .thread_name(|i| format!("dupescan-verify-{i}"))
        .build()?;

    let latch: FailFast<HashError> = FailFast::new();
    let is_shutdown = || {
        config
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    };

    let verified: Vec<Vec<DuplicateGroup>> = pool.install(|| {
        groups
            .into_par_iter()
            .enumerate()
            .filter_map(|(i, group)| {
                if latch.is_tripped() {
                    return None;
                }
                if is_shutdown() {
                    latch.cancel();
                    return None;
                }
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(i + 1, &group.digest);
                }
                match split_group(&group) {
                    Ok(classes) => {
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_item_completed(group.wasted_space());
                        }
                        Some(
                            classes
                                .into_iter()
                                .filter(|class| class.len() > 1)
                                .map(|class| {
                                    DuplicateGroup::new(group.digest.clone(), group.size, class)
                                })
                                .collect(),
                        )
                    }
                    Err(e) => {
                        latch.fail(e);
                        None
                    }
                }
            })
            .collect()
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("verifying");
    }

    if let Some(err) = latch.take() {
        return Err(FinderError::Hash(err));
    }
    if latch.is_tripped() || is_shutdown() {
        return Err(FinderError::Interrupted);
    }

    let mut confirmed: Vec<DuplicateGroup> = verified.into_iter().flatten().collect();
    confirmed.sort_by(|a, b| a.digest.cmp(&b.digest).then_with(|| a.paths.cmp(&b.paths)));

    log::info!("Verification complete: {} groups confirmed", confirmed.len());
    Ok(confirmed)
}
