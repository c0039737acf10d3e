//! Event types produced by the scroll collectors.

use chrono::{DateTime, Utc};

/// Vertical scroll direction of a single wheel tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Classify a raw vertical delta.
    ///
    /// Positive deltas scroll up, negative deltas scroll down. A zero (or NaN)
    /// delta is not a tick and yields `None`.
    pub fn from_vertical_delta(delta_y: f64) -> Option<Self> {
        if delta_y > 0.0 {
            Some(ScrollDirection::Up)
        } else if delta_y < 0.0 {
            Some(ScrollDirection::Down)
        } else {
            None
        }
    }
}

/// A single scroll tick as reported by the OS hook.
#[derive(Debug, Clone)]
pub struct ScrollEvent {
    pub timestamp: DateTime<Utc>,
    pub direction: ScrollDirection,
}

impl ScrollEvent {
    pub fn new(direction: ScrollDirection) -> Self {
        Self {
            timestamp: Utc::now(),
            direction,
        }
    }

    /// Build an event from a raw vertical delta, ignoring zero deltas.
    pub fn from_vertical_delta(delta_y: f64) -> Option<Self> {
        ScrollDirection::from_vertical_delta(delta_y).map(Self::new)
    }
}
