//! State management module
//!
//! Timing sessions and the registry that owns them.

pub mod app_state;
pub mod session;

pub use app_state::AppState;
pub use session::{SessionShared, TabChangeEvent, TimingSession};
