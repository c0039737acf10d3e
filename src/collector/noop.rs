//! Fallback collector for targets without a global scroll hook.
//!
//! The crate still builds here so the store, dashboard and `stats` command
//! remain usable, but capture refuses to start.

use crate::collector::types::ScrollEvent;
use crate::collector::{CollectorError, CHANNEL_CAPACITY};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shown when [`check_permission`] fails.
pub const PERMISSION_HINT: &str = "\
Global scroll capture is only available on macOS and Windows.
Use 'scroll-tracker stats' to view previously recorded totals.";

/// A collector that cannot be started.
pub struct NoopCollector {
    _sender: Sender<ScrollEvent>,
    receiver: Receiver<ScrollEvent>,
    running: Arc<AtomicBool>,
}

impl NoopCollector {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            _sender: sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Always fails with [`CollectorError::Unsupported`].
    pub fn start(&mut self) -> Result<(), CollectorError> {
        Err(CollectorError::Unsupported)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn receiver(&self) -> &Receiver<ScrollEvent> {
        &self.receiver
    }
}

impl Default for NoopCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Global input cannot be observed on these targets.
pub fn check_permission() -> bool {
    false
}
