//! Per-run scroll counters shared between the event pump and the renderer.

use crate::collector::ScrollDirection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Consistent view of the session counters at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub up: u64,
    pub down: u64,
}

impl SessionSnapshot {
    pub fn new(up: u64, down: u64) -> Self {
        Self { up, down }
    }

    /// Total ticks in either direction.
    pub fn total(&self) -> u64 {
        self.up + self.down
    }
}

/// Up/down counters for the current run.
///
/// Every read and write goes through one mutex, and the critical section is
/// a single increment or a copy of both counters.
#[derive(Debug, Default)]
pub struct SessionCounters {
    counts: Mutex<SessionSnapshot>,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one tick in the given direction.
    pub fn record_scroll(&self, direction: ScrollDirection) {
        let mut counts = self.lock();
        match direction {
            ScrollDirection::Up => counts.up += 1,
            ScrollDirection::Down => counts.down += 1,
        }
    }

    /// Read both counters under the same lock.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, SessionSnapshot> {
        // A panic while holding the lock cannot leave the two integers in a
        // torn state, so the data is still usable.
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Thread-safe shared session counters.
pub type SharedSessionCounters = Arc<SessionCounters>;
