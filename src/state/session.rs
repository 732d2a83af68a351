//! Timing session owned by one mounted inspection form

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    engine::{tab_timer::elapsed_seconds, Clock, TabChange, TabTimingEngine, TimingData},
    error::{Result, TimingError},
    tasks::live_refresh_task,
};

/// Published when the session switches tabs by index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabChangeEvent {
    pub index: usize,
    pub tab: String,
}

/// Engine plus the channels the refresh task publishes through
#[derive(Debug)]
pub struct SessionShared {
    pub engine: Mutex<TabTimingEngine>,
    /// Latest timing snapshot, only updated when the value changes
    pub timing_tx: watch::Sender<TimingData>,
}

impl SessionShared {
    /// Lock the engine
    pub fn lock_engine(&self) -> Result<MutexGuard<'_, TabTimingEngine>> {
        self.engine.lock().map_err(|_| TimingError::LockPoisoned("timing engine"))
    }

    /// Publish the current snapshot if it differs from the last one.
    /// Returns whether anything was published.
    pub fn publish_snapshot(&self) -> Result<bool> {
        let snapshot = self.lock_engine()?.get_current_timing_data();
        Ok(self.timing_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        }))
    }
}

/// One inspection form's timing state and its live refresh
#[derive(Debug)]
pub struct TimingSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    shared: Arc<SessionShared>,
    clock: Arc<dyn Clock>,
    last_activity: Mutex<DateTime<Utc>>,
    tab_change_tx: broadcast::Sender<TabChangeEvent>,
    refresh: Mutex<Option<JoinHandle<()>>>,
    refresh_interval: Duration,
}

impl TimingSession {
    /// Wrap an engine in a new session
    pub fn new(engine: TabTimingEngine, refresh_interval: Duration) -> Self {
        let (timing_tx, _) = watch::channel(engine.get_current_timing_data());
        let (tab_change_tx, _) = broadcast::channel(32);
        let clock = engine.clock();
        let now = clock.now();

        Self {
            id: Uuid::new_v4(),
            created_at: now,
            shared: Arc::new(SessionShared {
                engine: Mutex::new(engine),
                timing_tx,
            }),
            clock,
            last_activity: Mutex::new(now),
            tab_change_tx,
            refresh: Mutex::new(None),
            refresh_interval,
        }
    }

    /// Build an engine from the host's construction input
    pub fn create(
        tab_ids: Vec<String>,
        initial_timings: &TimingData,
        clock: Arc<dyn Clock>,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let engine = TabTimingEngine::with_clock(tab_ids, initial_timings, clock)?;
        Ok(Self::new(engine, refresh_interval))
    }

    /// Switch to `tab_id`, closing the running tab
    pub fn change_tab(&self, tab_id: &str) -> Result<TabChange> {
        self.touch();
        let change = self.shared.lock_engine()?.change_tab(tab_id)?;
        self.after_change()?;
        Ok(change)
    }

    /// Reconcile with the host's current tab index.
    ///
    /// Re-sending the index of the running tab is a no-op and returns `None`.
    /// An actual switch publishes timings and a [`TabChangeEvent`].
    pub fn change_tab_index(&self, index: usize) -> Result<Option<TabChange>> {
        self.touch();
        let change = self.shared.lock_engine()?.change_tab_index(index)?;
        let Some(change) = change else {
            return Ok(None);
        };
        self.after_change()?;

        let event = TabChangeEvent { index, tab: change.active_tab.clone() };
        if let Err(e) = self.tab_change_tx.send(event) {
            debug!("No tab change subscribers: {}", e);
        }
        Ok(Some(change))
    }

    fn after_change(&self) -> Result<()> {
        self.shared.publish_snapshot()?;
        self.ensure_refresh()
    }

    /// Live duration of one tab
    pub fn get_tab_duration(&self, tab_id: &str) -> Result<u64> {
        self.shared
            .lock_engine()?
            .get_tab_duration(tab_id)
            .ok_or_else(|| TimingError::UnknownTab(tab_id.to_string()))
    }

    /// Snapshot of every tab, including the running interval
    pub fn get_current_timing_data(&self) -> Result<TimingData> {
        Ok(self.shared.lock_engine()?.get_current_timing_data())
    }

    /// Running tab, if any
    pub fn get_active_tab(&self) -> Result<Option<String>> {
        Ok(self.shared.lock_engine()?.get_active_tab().map(str::to_string))
    }

    pub fn is_tab_active(&self, tab_id: &str) -> Result<bool> {
        Ok(self.shared.lock_engine()?.is_tab_active(tab_id))
    }

    pub fn get_total_duration(&self) -> Result<u64> {
        Ok(self.shared.lock_engine()?.get_total_duration())
    }

    pub fn tab_ids(&self) -> Result<Vec<String>> {
        Ok(self.shared.lock_engine()?.tab_ids().to_vec())
    }

    /// Close all running intervals and cancel the live refresh
    pub fn stop_all_timers(&self) -> Result<bool> {
        self.touch();
        let stopped = self.shared.lock_engine()?.stop_all_timers();
        self.cancel_refresh();
        self.shared.publish_snapshot()?;
        Ok(stopped)
    }

    /// Stop everything and return the final snapshot
    pub fn teardown(&self) -> Result<TimingData> {
        self.stop_all_timers()?;
        info!("Timing session {} torn down", self.id);
        self.get_current_timing_data()
    }

    /// Subscribe to de-duplicated timing snapshots
    pub fn subscribe_timings(&self) -> watch::Receiver<TimingData> {
        self.shared.timing_tx.subscribe()
    }

    /// Record host activity at the current clock time
    pub fn touch(&self) {
        let now = self.clock.now();
        match self.last_activity.lock() {
            Ok(mut last) => *last = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    /// Seconds since the host last touched this session
    pub fn idle_seconds(&self) -> u64 {
        let last = match self.last_activity.lock() {
            Ok(last) => *last,
            Err(poisoned) => *poisoned.into_inner(),
        };
        elapsed_seconds(last, self.clock.now())
    }

    /// Subscribe to tab switches made through [`Self::change_tab_index`].
    ///
    /// Only actual switches are sent; reconciling to the tab that is already
    /// running, and switches by name, produce no event.
    pub fn subscribe_tab_changes(&self) -> broadcast::Receiver<TabChangeEvent> {
        self.tab_change_tx.subscribe()
    }

    /// Whether the live refresh task is running
    pub fn is_refresh_running(&self) -> bool {
        self.refresh
            .lock()
            .map(|handle| handle.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    fn ensure_refresh(&self) -> Result<()> {
        let mut refresh = self
            .refresh
            .lock()
            .map_err(|_| TimingError::LockPoisoned("refresh handle"))?;

        if refresh.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.shared);
                let period = self.refresh_interval;
                *refresh = Some(runtime.spawn(live_refresh_task(shared, period)));
                debug!("Live refresh started for session {}", self.id);
            }
            Err(_) => debug!("No async runtime, live refresh disabled for session {}", self.id),
        }
        Ok(())
    }

    fn cancel_refresh(&self) {
        let handle = match self.refresh.lock() {
            Ok(mut refresh) => refresh.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            debug!("Live refresh cancelled for session {}", self.id);
        }
    }
}

impl Drop for TimingSession {
    fn drop(&mut self) {
        if let Err(e) = self.shared.lock_engine().map(|mut engine| engine.stop_all_timers()) {
            warn!("Failed to stop timers for session {}: {}", self.id, e);
        }
        self.cancel_refresh();
    }
}
