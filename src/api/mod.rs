//! HTTP API module
//!
//! Endpoints through which a host form drives its timing session.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/:id", get(get_session_handler).delete(close_session_handler))
        .route("/sessions/:id/tab", post(change_tab_handler))
        .route("/sessions/:id/summary", get(summary_handler))
        .route("/sessions/:id/stop", post(stop_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
