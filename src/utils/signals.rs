//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;

/// Wait for SIGTERM or SIGINT and return the signal received
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let handle = signals.handle();

    let signal = signals
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("signal stream closed"))?;
    handle.close();
    Ok(signal)
}
