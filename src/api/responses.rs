//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    engine::{TabChange, TimingData},
    error::{Result, TimingError},
    state::TimingSession,
    utils::format_duration,
};

/// Body of POST /sessions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Ordered tab ids; the server default when absent
    #[serde(default)]
    pub tabs: Option<Vec<String>>,
    /// Prior `"<tab>_duration"` values from a saved draft
    #[serde(default)]
    pub initial_timings: TimingData,
    /// Tab the form is showing, started immediately when given
    #[serde(default)]
    pub current_tab_index: Option<usize>,
}

/// Body of POST /sessions/:id/tab, by name or by index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeTabRequest {
    Tab { tab: String },
    Index { index: usize },
}

/// Live view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub tabs: Vec<String>,
    pub active_tab: Option<String>,
    pub timings: TimingData,
    pub total_seconds: u64,
    pub created_at: DateTime<Utc>,
}

impl SessionResponse {
    /// Read the current state of a session
    pub fn from_session(session: &TimingSession) -> Result<Self> {
        Ok(Self {
            id: session.id,
            tabs: session.tab_ids()?,
            active_tab: session.get_active_tab()?,
            timings: session.get_current_timing_data()?,
            total_seconds: session.get_total_duration()?,
            created_at: session.created_at,
        })
    }
}

/// Response to a tab change
#[derive(Debug, Clone, Serialize)]
pub struct TabChangeResponse {
    /// `None` when the requested index was already the running tab
    pub change: Option<TabChange>,
    pub session: SessionResponse,
}

/// One row of a timing summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabSummary {
    pub tab: String,
    pub seconds: u64,
    pub formatted: String,
    pub active: bool,
}

/// Human-readable timing breakdown for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSummary {
    pub id: Uuid,
    pub tabs: Vec<TabSummary>,
    pub total_seconds: u64,
    pub total_formatted: String,
}

impl TimingSummary {
    pub fn from_session(session: &TimingSession) -> Result<Self> {
        let tabs = session
            .tab_ids()?
            .into_iter()
            .map(|tab| -> Result<TabSummary> {
                let seconds = session.get_tab_duration(&tab)?;
                let active = session.is_tab_active(&tab)?;
                Ok(TabSummary {
                    formatted: format_duration(seconds),
                    tab,
                    seconds,
                    active,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let total_seconds = tabs.iter().map(|t| t.seconds).fold(0, u64::saturating_add);

        Ok(Self {
            id: session.id,
            tabs,
            total_seconds,
            total_formatted: format_duration(total_seconds),
        })
    }
}

/// Final timings returned when a session is closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedSessionResponse {
    pub id: Uuid,
    pub timings: TimingData,
    pub timestamp: DateTime<Utc>,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &TimingError) -> Self {
        Self {
            status: "error".to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Server status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub open_sessions: usize,
    pub default_tabs: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
