//! Live refresh background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use crate::state::SessionShared;

/// Periodically republish a session's timing snapshot so live displays can redraw.
///
/// Only reads the engine. Missed ticks are skipped; accumulation happens on tab
/// changes and stops, never here. Runs until aborted by its session.
pub async fn live_refresh_task(shared: Arc<SessionShared>, period: Duration) {
    debug!("Starting live refresh task ({}ms)", period.as_millis());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match shared.publish_snapshot() {
            Ok(true) => debug!("Live refresh published updated timings"),
            Ok(false) => {}
            Err(e) => {
                error!("Live refresh stopping: {}", e);
                break;
            }
        }
    }
}
