//! The running tracker: event pump, dashboard loop and shutdown merge.
//!
//! A [`Tracker`] owns everything a session shares between threads. The
//! collector's channel is drained by a pump thread into the session
//! counters, the main thread redraws the dashboard until the running flag
//! is cleared, and [`Tracker::finish`] folds the session into the lifetime
//! record and saves it. `finish` consumes the tracker, so a session is
//! persisted at most once.

use crate::collector::ScrollEvent;
use crate::dashboard::{render_frame, render_summary, DashboardMetrics};
use crate::session::{SessionCounters, SessionSnapshot, SharedSessionCounters};
use crate::store::{LifetimeRecord, StatsStore, StoreError};
use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// ANSI sequence clearing the screen and homing the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// How often the pump re-checks its stop flag while the channel is idle.
const PUMP_POLL: Duration = Duration::from_millis(50);

/// State of one tracking session.
pub struct Tracker {
    store: StatsStore,
    record: LifetimeRecord,
    session: SharedSessionCounters,
    running: Arc<AtomicBool>,
    started: Instant,
    refresh_interval: Duration,
    pump: Option<EventPump>,
}

impl Tracker {
    /// Start a session fed by `events`.
    ///
    /// `record` is the lifetime record as loaded from `store`; it is only
    /// modified by [`Tracker::finish`].
    pub fn new(
        store: StatsStore,
        record: LifetimeRecord,
        events: Receiver<ScrollEvent>,
        refresh_interval: Duration,
    ) -> Self {
        let session = Arc::new(SessionCounters::new());
        let pump = EventPump::spawn(events, session.clone());

        Self {
            store,
            record,
            session,
            running: Arc::new(AtomicBool::new(true)),
            started: Instant::now(),
            refresh_interval,
            pump: Some(pump),
        }
    }

    /// Flag cleared to end the dashboard loop, for use by signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the dashboard loop to exit after its current sleep.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn session(&self) -> &SharedSessionCounters {
        &self.session
    }

    /// The lifetime record as loaded, without the current session.
    pub fn record(&self) -> &LifetimeRecord {
        &self.record
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Metrics for a frame drawn now.
    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::compute(
            self.session.snapshot(),
            &self.record,
            self.elapsed().as_secs_f64(),
        )
    }

    /// Redraw the dashboard into `out` until the running flag is cleared.
    pub fn run_dashboard<W: Write>(&self, out: &mut W) -> io::Result<()> {
        while self.is_running() {
            let frame = render_frame(&self.metrics());
            write!(out, "{CLEAR_SCREEN}{frame}")?;
            out.flush()?;
            thread::sleep(self.refresh_interval);
        }
        tracing::debug!("Dashboard loop exited");
        Ok(())
    }

    /// End the session now and persist it.
    ///
    /// The collector feeding this tracker should already be stopped; events
    /// still queued in the channel are counted before the final snapshot.
    pub fn finish(self) -> Result<SessionReport, StoreError> {
        let elapsed = self.elapsed();
        self.finish_at(elapsed, Local::now())
    }

    /// End the session with an explicit duration and timestamp.
    pub fn finish_at(
        mut self,
        elapsed: Duration,
        now: DateTime<Local>,
    ) -> Result<SessionReport, StoreError> {
        self.stop();
        if let Some(pump) = self.pump.take() {
            pump.shutdown();
        }

        let session = self.session.snapshot();
        let elapsed_secs = elapsed.as_secs_f64();
        let mut record = std::mem::take(&mut self.record);
        record.fold_session(session, elapsed_secs, now);

        self.store.save(&record)?;
        tracing::info!(
            up = session.up,
            down = session.down,
            elapsed_secs,
            "Session saved to {}",
            self.store.path().display()
        );

        Ok(SessionReport {
            session,
            elapsed_secs,
            record,
            data_file: self.store.path().to_path_buf(),
        })
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.shutdown();
        }
    }
}

/// Outcome of a finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session: SessionSnapshot,
    pub elapsed_secs: f64,
    /// Lifetime record as saved, including this session.
    pub record: LifetimeRecord,
    pub data_file: PathBuf,
}

impl SessionReport {
    /// Human-readable summary for the terminal.
    pub fn summary(&self) -> String {
        render_summary(self.session, self.elapsed_secs, &self.data_file)
    }
}

/// Thread moving scroll events from the collector channel into the counters.
struct EventPump {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl EventPump {
    fn spawn(events: Receiver<ScrollEvent>, session: SharedSessionCounters) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::SeqCst) {
                match events.recv_timeout(PUMP_POLL) {
                    Ok(event) => session.record_scroll(event.direction),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            for event in events.try_iter() {
                session.record_scroll(event.direction);
            }
        });

        Self { stop, handle }
    }

    /// Stop after draining whatever is already queued.
    fn shutdown(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.handle.join().is_err() {
            tracing::warn!("Event pump thread panicked");
        }
    }
}
