//! Multi-tab elapsed-time tracker
//!
//! Keeps one stopwatch per tab with at most one running at a time. Accumulation
//! is written only when an interval closes (on a tab switch or when all timers
//! stop); every read computes the open interval on the fly.

use std::{collections::{BTreeMap, HashMap}, sync::Arc};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, TimingError};
use super::{Clock, SystemClock, TabTimerState};

/// Snapshot of per-tab durations keyed `"<tab>_duration"`
pub type TimingData = BTreeMap<String, u64>;

/// Key under which a tab's duration is persisted
pub fn timing_key(tab_id: &str) -> String {
    format!("{}_duration", tab_id)
}

/// Outcome of a tab switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabChange {
    /// Tab that was running before the switch, if any
    pub previous_tab: Option<String>,
    /// Seconds folded into the previous tab when its interval closed
    pub closed_seconds: u64,
    /// Tab that is now running
    pub active_tab: String,
}

/// Tab timing engine
#[derive(Debug)]
pub struct TabTimingEngine {
    tab_ids: Vec<String>,
    timers: HashMap<String, TabTimerState>,
    clock: Arc<dyn Clock>,
}

impl TabTimingEngine {
    /// Create an engine on the system clock
    pub fn new(tab_ids: Vec<String>, initial_timings: &TimingData) -> Result<Self> {
        Self::with_clock(tab_ids, initial_timings, Arc::new(SystemClock))
    }

    /// Create an engine reading time from `clock`
    ///
    /// Each tab is seeded from `initial_timings["<tab>_duration"]`, defaulting
    /// to 0. Keys that do not name a configured tab are ignored.
    pub fn with_clock(
        tab_ids: Vec<String>,
        initial_timings: &TimingData,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if tab_ids.is_empty() {
            return Err(TimingError::NoTabs);
        }

        let mut timers = HashMap::with_capacity(tab_ids.len());
        for tab_id in &tab_ids {
            let seconds = initial_timings.get(&timing_key(tab_id)).copied().unwrap_or(0);
            if timers.insert(tab_id.clone(), TabTimerState::new(seconds)).is_some() {
                return Err(TimingError::DuplicateTab(tab_id.clone()));
            }
        }

        for key in initial_timings.keys() {
            if !tab_ids.iter().any(|tab_id| timing_key(tab_id) == *key) {
                debug!("Ignoring initial timing for unknown key: {}", key);
            }
        }

        debug!("Timing engine created for tabs {:?}", tab_ids);
        Ok(Self { tab_ids, timers, clock })
    }

    /// Configured tabs in the caller's order
    pub fn tab_ids(&self) -> &[String] {
        &self.tab_ids
    }

    /// Position of a tab in the configured order
    pub fn tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tab_ids.iter().position(|id| id == tab_id)
    }

    /// Make `target` the running tab, closing whichever tab was running.
    ///
    /// Re-entering the running tab closes its interval and reopens it at the
    /// same instant. An unknown tab is rejected with no change to any timer.
    pub fn change_tab(&mut self, target: &str) -> Result<TabChange> {
        if !self.timers.contains_key(target) {
            return Err(TimingError::UnknownTab(target.to_string()));
        }

        let now = self.clock.now();
        let previous_tab = self.get_active_tab().map(str::to_string);
        let closed_seconds = match &previous_tab {
            Some(previous) => self.timers.get_mut(previous).map_or(0, |t| t.stop(now)),
            None => 0,
        };

        if let Some(timer) = self.timers.get_mut(target) {
            timer.start(now);
        }

        match &previous_tab {
            Some(previous) => debug!(
                "Switched tab {} -> {} ({}s closed)",
                previous, target, closed_seconds
            ),
            None => debug!("Started tab {}", target),
        }

        Ok(TabChange {
            previous_tab,
            closed_seconds,
            active_tab: target.to_string(),
        })
    }

    /// Reconcile the running tab with the host's current tab index.
    ///
    /// Switches only when the tab at `index` is not already running; returns
    /// `None` and leaves the open interval alone otherwise.
    pub fn change_tab_index(&mut self, index: usize) -> Result<Option<TabChange>> {
        let target = self
            .tab_ids
            .get(index)
            .cloned()
            .ok_or(TimingError::TabIndexOutOfRange { index, len: self.tab_ids.len() })?;

        if self.is_tab_active(&target) {
            return Ok(None);
        }
        self.change_tab(&target).map(Some)
    }

    /// Seconds spent on a tab, including the open interval if it is running
    pub fn get_tab_duration(&self, tab_id: &str) -> Option<u64> {
        let now = self.clock.now();
        self.timers.get(tab_id).map(|timer| timer.duration(now))
    }

    /// Read-only snapshot of every tab's duration, including the open interval
    pub fn get_current_timing_data(&self) -> TimingData {
        let now = self.clock.now();
        self.tab_ids
            .iter()
            .map(|tab_id| {
                let seconds = self.timers.get(tab_id).map_or(0, |t| t.duration(now));
                (timing_key(tab_id), seconds)
            })
            .collect()
    }

    /// Close every running interval. Returns whether anything was running.
    pub fn stop_all_timers(&mut self) -> bool {
        let now = self.clock.now();
        let mut stopped = false;
        for (tab_id, timer) in self.timers.iter_mut().filter(|(_, t)| t.is_active) {
            let closed = timer.stop(now);
            info!("Stopped tab {} ({}s closed, {}s total)", tab_id, closed, timer.accumulated_seconds);
            stopped = true;
        }
        stopped
    }

    /// The running tab, if any
    pub fn get_active_tab(&self) -> Option<&str> {
        self.tab_ids
            .iter()
            .find(|tab_id| self.is_tab_active(tab_id))
            .map(String::as_str)
    }

    /// Whether `tab_id` is running. Unknown tabs are never active.
    pub fn is_tab_active(&self, tab_id: &str) -> bool {
        self.timers.get(tab_id).is_some_and(|timer| timer.is_active)
    }

    /// Sum of all tab durations
    pub fn get_total_duration(&self) -> u64 {
        let now = self.clock.now();
        self.timers
            .values()
            .map(|timer| timer.duration(now))
            .fold(0, u64::saturating_add)
    }

    /// Clock the engine reads time from
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Stopwatch state of a tab
    pub fn timer(&self, tab_id: &str) -> Option<&TabTimerState> {
        self.timers.get(tab_id)
    }
}
