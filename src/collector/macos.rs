//! macOS scroll capture using a CGEvent tap.
//!
//! The tap is listen-only and subscribes to `ScrollWheel` events alone. It
//! requires the Input Monitoring permission.

use crate::collector::types::ScrollEvent;
use crate::collector::{CollectorError, CHANNEL_CAPACITY};
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
    CallbackResult, EventField,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the run loop runs before re-checking the running flag.
const RUN_LOOP_SLICE: Duration = Duration::from_millis(100);

/// The macOS scroll collector.
pub struct MacOSCollector {
    sender: Sender<ScrollEvent>,
    receiver: Receiver<ScrollEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MacOSCollector {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);

        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start capturing in a background thread.
    ///
    /// Blocks until the tap is installed, so a missing permission is reported
    /// here rather than lost on the capture thread.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }

        let sender = self.sender.clone();
        let running = self.running.clone();
        let (ready_tx, ready_rx) = bounded(1);

        let handle = thread::spawn(move || {
            if let Err(e) = run_event_loop(sender, running.clone(), &ready_tx) {
                let _ = ready_tx.send(Err(e));
            }
            running.store(false, Ordering::SeqCst);
        });

        let ready = ready_rx
            .recv()
            .unwrap_or(Err(CollectorError::ThreadExited));
        if let Err(e) = ready {
            self.running.store(false, Ordering::SeqCst);
            let _ = handle.join();
            return Err(e);
        }

        self.thread_handle = Some(handle);
        tracing::debug!("CGEvent tap installed");
        Ok(())
    }

    /// Stop capturing events. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Scroll capture thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn receiver(&self) -> &Receiver<ScrollEvent> {
        &self.receiver
    }
}

impl Default for MacOSCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MacOSCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_event_loop(
    sender: Sender<ScrollEvent>,
    running: Arc<AtomicBool>,
    ready: &Sender<Result<(), CollectorError>>,
) -> Result<(), CollectorError> {
    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::ScrollWheel],
        move |_proxy, event_type, event| {
            if let Some(scroll) = process_cg_event(event_type, event) {
                let _ = sender.try_send(scroll);
            }
            CallbackResult::Keep
        },
    )
    .map_err(|_| CollectorError::PermissionDenied)?;

    let source = tap
        .mach_port()
        .create_runloop_source(0)
        .map_err(|_| CollectorError::RunLoopSourceFailed)?;

    let run_loop = CFRunLoop::get_current();
    unsafe {
        run_loop.add_source(&source, kCFRunLoopCommonModes);
    }
    tap.enable();
    let _ = ready.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(unsafe { kCFRunLoopCommonModes }, RUN_LOOP_SLICE, false);
    }

    // The tap is disabled when dropped
    Ok(())
}

fn process_cg_event(event_type: CGEventType, event: &CGEvent) -> Option<ScrollEvent> {
    match event_type {
        CGEventType::ScrollWheel => {
            let delta_y = event.get_integer_value_field(EventField::SCROLL_WHEEL_EVENT_DELTA_AXIS_1);
            ScrollEvent::from_vertical_delta(delta_y as f64)
        }
        _ => None,
    }
}

/// Shown when [`check_permission`] fails.
pub const PERMISSION_HINT: &str = "\
To grant permission:
1. Open System Settings > Privacy & Security > Input Monitoring
2. Add your terminal (or this binary) to the allowed list
3. Restart the application";

/// Check whether a listen-only tap can be created.
///
/// macOS has no direct query for Input Monitoring; tap creation fails when
/// the permission is missing.
pub fn check_permission() -> bool {
    CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::ScrollWheel],
        |_proxy, _type, _event| CallbackResult::Keep,
    )
    .is_ok()
}
