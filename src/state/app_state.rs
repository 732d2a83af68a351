//! Main application state management

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tracing::{info, warn};
use uuid::Uuid;

use super::TimingSession;
use crate::{
    engine::{Clock, SystemClock, TimingData},
    error::{Result, TimingError},
    utils::format_duration,
};

/// Registry of open timing sessions plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Open sessions, one per mounted inspection form
    pub sessions: Mutex<HashMap<Uuid, Arc<TimingSession>>>,
    /// Tabs used when a session is created without its own list
    pub default_tabs: Vec<String>,
    /// Live refresh period for new sessions
    pub refresh_interval: Duration,
    pub clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    /// Create a new AppState on the system clock
    pub fn new(port: u16, host: String, default_tabs: Vec<String>, refresh_interval: Duration) -> Self {
        Self::with_clock(port, host, default_tabs, refresh_interval, Arc::new(SystemClock))
    }

    /// Create a new AppState whose sessions read time from `clock`
    pub fn with_clock(
        port: u16,
        host: String,
        default_tabs: Vec<String>,
        refresh_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            default_tabs,
            refresh_interval,
            clock,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    fn lock_sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Arc<TimingSession>>>> {
        self.sessions.lock().map_err(|_| TimingError::LockPoisoned("session registry"))
    }

    /// Open a session for a newly mounted form
    ///
    /// Falls back to the default tab list when `tabs` is `None`. When
    /// `current_tab_index` is given, that tab starts running immediately.
    /// The session stays registered until closed or swept as idle by
    /// [`Self::close_idle_sessions`].
    pub fn create_session(
        &self,
        tabs: Option<Vec<String>>,
        initial_timings: &TimingData,
        current_tab_index: Option<usize>,
    ) -> Result<Arc<TimingSession>> {
        let tabs = tabs.unwrap_or_else(|| self.default_tabs.clone());
        let session = TimingSession::create(
            tabs,
            initial_timings,
            Arc::clone(&self.clock),
            self.refresh_interval,
        )?;

        if let Some(index) = current_tab_index {
            session.change_tab_index(index)?;
        }

        let session = Arc::new(session);
        self.lock_sessions()?.insert(session.id, Arc::clone(&session));
        info!("Opened timing session {}", session.id);
        Ok(session)
    }

    /// Look up an open session
    pub fn get_session(&self, id: Uuid) -> Result<Arc<TimingSession>> {
        let session = self
            .lock_sessions()?
            .get(&id)
            .cloned()
            .ok_or(TimingError::SessionNotFound(id))?;
        session.touch();
        Ok(session)
    }

    /// Tear down and remove a session, returning its final timings
    pub fn close_session(&self, id: Uuid) -> Result<TimingData> {
        let session = self
            .lock_sessions()?
            .remove(&id)
            .ok_or(TimingError::SessionNotFound(id))?;
        let timings = session.teardown()?;
        info!("Closed timing session {}", id);
        Ok(timings)
    }

    /// Tear down every open session
    pub fn close_all_sessions(&self) {
        let sessions: Vec<_> = match self.lock_sessions() {
            Ok(mut sessions) => sessions.drain().map(|(_, s)| s).collect(),
            Err(e) => {
                warn!("Failed to close sessions: {}", e);
                return;
            }
        };

        for session in sessions {
            if let Err(e) = session.teardown() {
                warn!("Failed to tear down session {}: {}", session.id, e);
            }
        }
    }

    /// Tear down sessions the host has not touched for `max_idle_seconds`.
    /// Returns the ids that were closed.
    pub fn close_idle_sessions(&self, max_idle_seconds: u64) -> Result<Vec<Uuid>> {
        let idle: Vec<_> = {
            let mut sessions = self.lock_sessions()?;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.idle_seconds() >= max_idle_seconds)
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        let mut closed = Vec::with_capacity(idle.len());
        for session in idle {
            match session.teardown() {
                Ok(timings) => info!("Closed idle session {} with timings {:?}", session.id, timings),
                Err(e) => warn!("Failed to tear down idle session {}: {}", session.id, e),
            }
            closed.push(session.id);
        }
        Ok(closed)
    }

    /// Number of open sessions
    pub fn session_count(&self) -> usize {
        self.lock_sessions().map(|s| s.len()).unwrap_or(0)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_duration(self.start_time.elapsed().as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;

    fn state() -> (AppState, ManualClock) {
        let clock = ManualClock::at_epoch();
        let state = AppState::with_clock(
            0,
            "127.0.0.1".to_string(),
            vec!["info".to_string(), "pulling".to_string()],
            Duration::from_secs(1),
            Arc::new(clock.clone()),
        );
        (state, clock)
    }

    #[test]
    fn sessions_use_default_tabs() {
        let (state, _clock) = state();
        let session = state.create_session(None, &TimingData::new(), None).unwrap();
        assert_eq!(session.tab_ids().unwrap(), vec!["info", "pulling"]);
        assert_eq!(state.session_count(), 1);
    }

    #[test]
    fn current_tab_index_starts_that_tab() {
        let (state, _clock) = state();
        let session = state.create_session(None, &TimingData::new(), Some(1)).unwrap();
        assert_eq!(session.get_active_tab().unwrap().as_deref(), Some("pulling"));
    }

    #[test]
    fn invalid_session_is_not_registered() {
        let (state, _clock) = state();
        assert!(state.create_session(Some(vec![]), &TimingData::new(), None).is_err());
        assert!(state.create_session(None, &TimingData::new(), Some(5)).is_err());
        assert_eq!(state.session_count(), 0);
    }

    #[test]
    fn close_returns_final_timings() {
        let (state, clock) = state();
        let session = state.create_session(None, &TimingData::new(), Some(0)).unwrap();
        let id = session.id;
        clock.advance_secs(30);

        let timings = state.close_session(id).unwrap();
        assert_eq!(timings["info_duration"], 30);
        assert_eq!(state.get_session(id).unwrap_err(), TimingError::SessionNotFound(id));
        assert!(state.close_session(id).is_err());
    }

    #[test]
    fn idle_sessions_are_swept() {
        let (state, clock) = state();
        let stale = state.create_session(None, &TimingData::new(), Some(0)).unwrap();
        let fresh = state.create_session(None, &TimingData::new(), None).unwrap();

        clock.advance_secs(50);
        state.get_session(fresh.id).unwrap();
        clock.advance_secs(20);

        let closed = state.close_idle_sessions(60).unwrap();
        assert_eq!(closed, vec![stale.id]);
        assert_eq!(state.session_count(), 1);
        assert_eq!(stale.get_active_tab().unwrap(), None);
        assert_eq!(stale.get_tab_duration("info").unwrap(), 70);
        assert!(state.get_session(fresh.id).is_ok());
    }

    #[test]
    fn close_all_stops_everything() {
        let (state, clock) = state();
        let a = state.create_session(None, &TimingData::new(), Some(0)).unwrap();
        let b = state.create_session(None, &TimingData::new(), Some(1)).unwrap();
        clock.advance_secs(5);

        state.close_all_sessions();
        assert_eq!(state.session_count(), 0);
        assert_eq!(a.get_active_tab().unwrap(), None);
        assert_eq!(b.get_tab_duration("pulling").unwrap(), 5);
    }
}
