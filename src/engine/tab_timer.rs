//! Per-tab stopwatch state

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stopwatch for a single tab
///
/// `accumulated_seconds` only grows when an active interval is closed. While the
/// tab is running, live elapsed time is computed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabTimerState {
    pub accumulated_seconds: u64,
    pub is_active: bool,
    pub interval_started_at: Option<DateTime<Utc>>,
}

impl TabTimerState {
    /// Create an idle stopwatch seeded with prior accumulated time
    pub fn new(accumulated_seconds: u64) -> Self {
        Self {
            accumulated_seconds,
            is_active: false,
            interval_started_at: None,
        }
    }

    /// Open a new active interval at `now`
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.interval_started_at = Some(now);
    }

    /// Close the active interval, folding its elapsed time into the total.
    /// Returns the seconds added. Idle stopwatches are left as they are.
    pub fn stop(&mut self, now: DateTime<Utc>) -> u64 {
        let elapsed = self.running_seconds(now);
        self.accumulated_seconds = self.accumulated_seconds.saturating_add(elapsed);
        self.is_active = false;
        self.interval_started_at = None;
        elapsed
    }

    /// Whole seconds in the open interval, or 0 when idle
    pub fn running_seconds(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_active, self.interval_started_at) {
            (true, Some(started)) => elapsed_seconds(started, now),
            _ => 0,
        }
    }

    /// Accumulated plus open-interval seconds
    pub fn duration(&self, now: DateTime<Utc>) -> u64 {
        self.accumulated_seconds
            .saturating_add(self.running_seconds(now))
    }
}

impl Default for TabTimerState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Whole seconds between `started` and `now`, clamped at zero if the clock went backwards
pub fn elapsed_seconds(started: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let secs = (now - started).num_seconds();
    if secs < 0 {
        tracing::warn!("Clock moved backwards by {}s, clamping elapsed time to 0", -secs);
        0
    } else {
        secs as u64
    }
}
