//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{error::TimingError, state::AppState};
use super::responses::{
    ChangeTabRequest, ClosedSessionResponse, CreateSessionRequest, ErrorResponse,
    HealthResponse, SessionResponse, StatusResponse, TabChangeResponse, TimingSummary,
};

/// Error wrapper that renders as a status code and JSON body
#[derive(Debug)]
pub struct ApiError(pub TimingError);

impl From<TimingError> for ApiError {
    fn from(error: TimingError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TimingError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (status, Json(ErrorResponse::new(&self.0))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Handle POST /sessions - Open a timing session for a form
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state.create_session(
        request.tabs,
        &request.initial_timings,
        request.current_tab_index,
    )?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from_session(&session)?)))
}

/// Handle GET /sessions/:id - Live timing snapshot
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionResponse> {
    let session = state.get_session(id)?;
    Ok(Json(SessionResponse::from_session(&session)?))
}

/// Handle POST /sessions/:id/tab - Navigate to another tab
pub async fn change_tab_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeTabRequest>,
) -> ApiResult<TabChangeResponse> {
    let session = state.get_session(id)?;
    let change = match request {
        ChangeTabRequest::Tab { tab } => Some(session.change_tab(&tab)?),
        ChangeTabRequest::Index { index } => session.change_tab_index(index)?,
    };

    Ok(Json(TabChangeResponse {
        change,
        session: SessionResponse::from_session(&session)?,
    }))
}

/// Handle GET /sessions/:id/summary - Formatted per-tab breakdown
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<TimingSummary> {
    let session = state.get_session(id)?;
    Ok(Json(TimingSummary::from_session(&session)?))
}

/// Handle POST /sessions/:id/stop - Stop all timers
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionResponse> {
    let session = state.get_session(id)?;
    if session.stop_all_timers()? {
        info!("Timers stopped for session {}", id);
    }
    Ok(Json(SessionResponse::from_session(&session)?))
}

/// Handle DELETE /sessions/:id - Submit the form and close its session
pub async fn close_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<ClosedSessionResponse> {
    let timings = state.close_session(id)?;
    Ok(Json(ClosedSessionResponse {
        id,
        timings,
        timestamp: Utc::now(),
    }))
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        open_sessions: state.session_count(),
        default_tabs: state.default_tabs.clone(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
