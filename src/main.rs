//! Quick Check timing server
//!
//! Hosts one timing session per open inspection form.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

use quickcheck_timing::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::session_sweep_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("quickcheck_timing={},tower_http=info", config.log_level()))
        .init();

    info!("Starting quickcheck-timing server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tabs={:?}, refresh={}ms",
          config.host, config.port, config.tabs, config.refresh_interval().as_millis());

    // Create the session registry
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tabs.clone(),
        config.refresh_interval(),
    ));

    // Sweep sessions whose form was closed without submitting
    if config.session_idle_timeout_secs > 0 {
        let sweep_state = Arc::clone(&state);
        let max_idle = config.session_idle_timeout_secs;
        tokio::spawn(async move {
            session_sweep_task(sweep_state, Duration::from_secs(60), max_idle).await;
        });
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /sessions             - Open a timing session");
    info!("  GET    /sessions/:id         - Live timing snapshot");
    info!("  POST   /sessions/:id/tab     - Change tab");
    info!("  GET    /sessions/:id/summary - Formatted timing summary");
    info!("  POST   /sessions/:id/stop    - Stop all timers");
    info!("  DELETE /sessions/:id         - Submit and close session");
    info!("  GET    /status               - Server status");
    info!("  GET    /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => info!("Received signal {}, shutting down", signal),
                Err(e) => tracing::error!("Signal handling failed: {}", e),
            }
        }
    }

    // Stop every running timer before exiting
    state.close_all_sessions();
    info!("Server shutdown complete");
    Ok(())
}
