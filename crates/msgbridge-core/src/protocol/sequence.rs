//! Thread-safe monotonically increasing counter.
//!
//! The bridge hands out a fresh number for every listener registration (so a
//! listener can later be removed by id) and numbers outbound frames in its
//! debug logs.  Both only need "unique and increasing", which a single
//! `AtomicU64` provides without a lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free counter that starts at a chosen value and increments by one.
///
/// # Examples
///
/// ```rust
/// use msgbridge_core::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    /// Creates a counter starting at 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter whose first [`next`](Self::next) returns `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            inner: AtomicU64::new(start),
        }
    }

    /// Returns the next value and advances the counter.
    ///
    /// `Relaxed` is enough: the values are identifiers, not a synchronisation
    /// point.  Wraps at `u64::MAX`.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
