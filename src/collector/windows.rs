//! Windows scroll capture using a low-level mouse hook.
//!
//! `WH_MOUSE_LL` callbacks run on the thread that installed the hook, so the
//! hook lives on a dedicated thread pumping `GetMessageW`. Stopping posts
//! `WM_QUIT` to that thread.

use crate::collector::types::ScrollEvent;
use crate::collector::{CollectorError, CHANNEL_CAPACITY};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx,
    HHOOK, MSG, MSLLHOOKSTRUCT, WH_MOUSE_LL, WM_MOUSEWHEEL, WM_QUIT,
};

/// One wheel notch.
const WHEEL_DELTA: f64 = 120.0;

/// The Windows scroll collector.
pub struct WindowsCollector {
    sender: Sender<ScrollEvent>,
    receiver: Receiver<ScrollEvent>,
    running: Arc<AtomicBool>,
    hook_thread: Option<(u32, JoinHandle<()>)>,
}

impl WindowsCollector {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);

        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            hook_thread: None,
        }
    }

    /// Install the hook on a background thread.
    ///
    /// Blocks until the hook is installed so that failures surface here.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }

        let sender = self.sender.clone();
        let running = self.running.clone();
        let (ready_tx, ready_rx) = bounded::<Result<u32, CollectorError>>(1);

        let handle = thread::spawn(move || {
            if let Err(e) = run_hook_loop(sender, &ready_tx) {
                let _ = ready_tx.send(Err(e));
            }
            running.store(false, Ordering::SeqCst);
        });

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                self.hook_thread = Some((thread_id, handle));
                tracing::debug!("Low-level mouse hook installed");
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(CollectorError::ThreadExited)
            }
        }
    }

    /// Stop capturing events. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some((thread_id, handle)) = self.hook_thread.take() {
            let posted =
                unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
            if let Err(e) = posted {
                // Without WM_QUIT the message loop never returns; leave the
                // thread detached rather than hang shutdown.
                tracing::warn!("Could not signal hook thread: {e}");
                return;
            }
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

impl Default for WindowsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WindowsCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

thread_local! {
    static EVENT_SENDER: RefCell<Option<Sender<ScrollEvent>>> = const { RefCell::new(None) };
}

/// Signed wheel delta, in notches, from `MSLLHOOKSTRUCT::mouseData`.
fn wheel_notches(mouse_data: u32) -> f64 {
    ((mouse_data >> 16) & 0xFFFF) as u16 as i16 as f64 / WHEEL_DELTA
}

unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code >= 0 && w_param.0 as u32 == WM_MOUSEWHEEL {
        let mouse_struct = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        if let Some(event) = ScrollEvent::from_vertical_delta(wheel_notches(mouse_struct.mouseData))
        {
            EVENT_SENDER.with(|sender| {
                if let Some(ref s) = *sender.borrow() {
                    let _ = s.try_send(event);
                }
            });
        }
    }

    CallNextHookEx(HHOOK::default(), n_code, w_param, l_param)
}

fn run_hook_loop(
    sender: Sender<ScrollEvent>,
    ready: &Sender<Result<u32, CollectorError>>,
) -> Result<(), CollectorError> {
    EVENT_SENDER.with(|s| {
        *s.borrow_mut() = Some(sender);
    });

    let hook = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) }
        .map_err(|_| CollectorError::HookInstallationFailed)?;

    let thread_id = unsafe { GetCurrentThreadId() };
    let _ = ready.send(Ok(thread_id));

    let mut msg = MSG::default();
    loop {
        // 0 is WM_QUIT, -1 is an error
        let result = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        if result.0 <= 0 {
            break;
        }
    }

    unsafe {
        let _ = UnhookWindowsHookEx(hook);
    }
    EVENT_SENDER.with(|s| {
        s.borrow_mut().take();
    });

    Ok(())
}

/// Shown when [`check_permission`] fails.
pub const PERMISSION_HINT: &str = "\
The low-level mouse hook could not be installed.
Run scroll-tracker from an interactive desktop session.";

/// Check whether a low-level mouse hook can be installed.
pub fn check_permission() -> bool {
    unsafe {
        match SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) {
            Ok(hook) => {
                let _ = UnhookWindowsHookEx(hook);
                true
            }
            Err(_) => false,
        }
    }
}
