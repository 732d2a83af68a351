//! Idle session sweep background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that closes sessions whose host stopped calling in
pub async fn session_sweep_task(state: Arc<AppState>, period: Duration, max_idle_seconds: u64) {
    info!("Starting session sweep task (idle timeout {}s)", max_idle_seconds);

    let mut interval = interval(period);

    loop {
        interval.tick().await;

        match state.close_idle_sessions(max_idle_seconds) {
            Ok(closed) if !closed.is_empty() => {
                info!("Swept {} idle session(s)", closed.len());
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to sweep idle sessions: {}", e),
        }
    }
}
