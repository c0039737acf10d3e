//! Scroll event collection.
//!
//! This module provides platform-specific implementations for capturing
//! global scroll wheel events. Every backend exposes the same surface
//! (`new`, `start`, `stop`, `is_running`, `receiver`) and is re-exported
//! under the [`Collector`] alias for the current target.

pub mod types;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub mod noop;

pub use types::{ScrollDirection, ScrollEvent};

#[cfg(target_os = "macos")]
pub use macos::{check_permission, MacOSCollector, PERMISSION_HINT};

/// Platform-agnostic collector type alias
#[cfg(target_os = "macos")]
pub type Collector = MacOSCollector;

#[cfg(target_os = "windows")]
pub use windows::{check_permission, WindowsCollector, PERMISSION_HINT};

/// Platform-agnostic collector type alias
#[cfg(target_os = "windows")]
pub type Collector = WindowsCollector;

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use noop::{check_permission, NoopCollector, PERMISSION_HINT};

/// Platform-agnostic collector type alias
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub type Collector = NoopCollector;

/// Capacity of the channel between the OS hook and the consumer.
///
/// Hooks use `try_send`, so a full channel drops ticks instead of stalling
/// the system input pipeline.
pub const CHANNEL_CAPACITY: usize = 10_000;

/// Errors that can occur during event collection.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    PermissionDenied,
    HookInstallationFailed,
    RunLoopSourceFailed,
    ThreadExited,
    /// No global scroll hook exists for this target.
    Unsupported,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::PermissionDenied => {
                write!(f, "Input Monitoring permission not granted")
            }
            CollectorError::HookInstallationFailed => {
                write!(f, "Failed to install global scroll hook")
            }
            CollectorError::RunLoopSourceFailed => {
                write!(f, "Failed to create run loop source")
            }
            CollectorError::ThreadExited => {
                write!(f, "Capture thread exited before it was ready")
            }
            CollectorError::Unsupported => {
                write!(f, "Global scroll capture is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for CollectorError {}
