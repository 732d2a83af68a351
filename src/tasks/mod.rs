//! Background tasks module
//!
//! Tasks spawned alongside timing sessions.

pub mod live_refresh;
pub mod session_sweep;

pub use live_refresh::live_refresh_task;
pub use session_sweep::session_sweep_task;
