//! Scroll Tracker - scroll wheel activity with session and all-time statistics.
//!
//! Global scroll wheel ticks are counted while the tracker runs, shown on a
//! live terminal dashboard, and folded into a small JSON file on shutdown
//! so the totals accumulate across runs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  channel  ┌─────────────┐  lock  ┌──────────────────┐
//! │  Collector   │──────────▶│ Event pump  │───────▶│ SessionCounters  │
//! │ (OS hook)    │           │  (thread)   │        └────────┬─────────┘
//! └──────────────┘           └─────────────┘                 │ snapshot
//!                                                            ▼
//! ┌──────────────┐   load    ┌─────────────┐  frame  ┌──────────────────┐
//! │  StatsStore  │──────────▶│   Tracker   │────────▶│    Dashboard     │
//! │ (JSON file)  │◀──────────│ (main loop) │         │  (pure render)   │
//! └──────────────┘   save    └─────────────┘         └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use scroll_tracker::{Collector, StatsStore, Tracker};
//! use std::time::Duration;
//!
//! let store = StatsStore::new("scroll_data.json");
//! let record = store.load();
//!
//! let mut collector = Collector::new();
//! let tracker = Tracker::new(store, record, collector.receiver().clone(), Duration::from_millis(250));
//! collector.start().expect("Failed to start collector");
//!
//! // ... later, from a signal handler: tracker.running_flag().store(false, ..)
//! collector.stop();
//! let report = tracker.finish().expect("Failed to save session");
//! println!("{}", report.summary());
//! ```

pub mod collector;
pub mod config;
pub mod dashboard;
pub mod session;
pub mod store;
pub mod tracker;

// Re-export key types at crate root for convenience
pub use collector::{Collector, CollectorError, ScrollDirection, ScrollEvent};
pub use config::{Config, ConfigError};
pub use dashboard::{format_duration, scroll_bar, scrolls_per_minute, DashboardMetrics};
pub use session::{SessionCounters, SessionSnapshot, SharedSessionCounters};
pub use store::{LifetimeRecord, StatsStore, StoreError};
pub use tracker::{SessionReport, Tracker};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
