//! Quick Check timing - per-tab elapsed time tracking for inspection forms
//!
//! The core is [`engine::TabTimingEngine`], a set of per-tab stopwatches with at
//! most one running at a time. [`state::TimingSession`] wraps an engine for one
//! mounted form with change notifications and a live refresh task, and the
//! [`api`] module exposes sessions over HTTP.

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{TabTimingEngine, TimingData};
pub use error::TimingError;
pub use state::{AppState, TimingSession};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
