//! Error types for the timing engine and its host sessions

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the timing engine and session registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    /// The engine needs at least one tab to account time against
    #[error("no tabs configured")]
    NoTabs,

    /// Tab identifiers must be unique
    #[error("duplicate tab identifier: {0}")]
    DuplicateTab(String),

    /// The tab is not one of the configured tabs
    #[error("unknown tab: {0}")]
    UnknownTab(String),

    /// The host supplied a tab index past the end of the tab list
    #[error("tab index {index} out of range ({len} tabs)")]
    TabIndexOutOfRange { index: usize, len: usize },

    /// No session is registered under this id
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// A mutex guarding shared state was poisoned by a panicking holder
    #[error("failed to lock {0}")]
    LockPoisoned(&'static str),
}

impl TimingError {
    /// Whether the error was caused by caller input rather than internal state
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NoTabs | Self::DuplicateTab(_) | Self::UnknownTab(_) | Self::TabIndexOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TimingError>;
