//! Tab timing engine
//!
//! Per-tab stopwatches for a multi-tab inspection form.

pub mod clock;
pub mod tab_timer;
pub mod timing_engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use tab_timer::TabTimerState;
pub use timing_engine::{timing_key, TabChange, TabTimingEngine, TimingData};
