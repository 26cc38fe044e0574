//! Shared run counters. Increment-only from workers; read after the barrier.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct LoadCounters {
    lines: AtomicU64,
    errors: AtomicU64,
    written: AtomicU64,
    files_processed: AtomicU64,
    files_skipped: AtomicU64,
}

/// Plain copy of [`LoadCounters`] taken once every worker has been joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub lines: u64,
    pub errors: u64,
    pub written: u64,
    pub files_processed: u64,
    pub files_skipped: u64,
}

impl LoadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lines(&self, n: u64) {
        self.lines.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_errors(&self, n: u64) {
        self.errors.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_written(&self, n: u64) {
        self.written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn file_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Joins provide the happens-before edge, so relaxed loads are enough here.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            lines: self.lines.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
        }
    }
}
