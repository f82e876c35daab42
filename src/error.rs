//! Exit codes and the cancellation latch shared by the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Exit codes for the dupescan binary.
///
/// - 0: Success (report printed, duplicates or not)
/// - 1: General error (usage error, traversal or read failure)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Scan completed and a report was printed.
    Success = 0,
    /// Any fatal error; nothing was reported.
    GeneralError = 1,
    /// Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// First-error latch used to cancel a run.
///
/// The first call to [`FailFast::fail`] stores its error and trips the latch;
/// later errors are dropped. Workers call [`FailFast::is_tripped`] before
/// starting new work. [`FailFast::cancel`] trips the latch without an error,
/// which is how Ctrl+C is surfaced.
#[derive(Debug)]
pub struct FailFast<E> {
    tripped: AtomicBool,
    first: Mutex<Option<E>>,
}

impl<E> Default for FailFast<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> FailFast<E> {
    /// Create an untripped latch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
            first: Mutex::new(None),
        }
    }

    /// Whether any error or cancellation has been recorded.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// Trip the latch without recording an error.
    pub fn cancel(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    /// Record `err` if it is the first one and trip the latch.
    ///
    /// Returns `true` when this call stored the error.
    pub fn fail(&self, err: E) -> bool {
        let mut slot = match self.first.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.tripped.store(true, Ordering::SeqCst);
        if slot.is_none() {
            *slot = Some(err);
            true
        } else {
            false
        }
    }

    /// Take the stored first error, if any.
    pub fn take(&self) -> Option<E> {
        match self.first.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}
