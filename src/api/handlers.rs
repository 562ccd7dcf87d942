//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    config::SchedulerConfig,
    state::AppState,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Handle POST /start - Start the work phase
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let (started, after) = state.perform("start", |scheduler| scheduler.start());
    if started {
        info!("Start endpoint called - work phase started");
        Json(ApiResponse::ok("Timer started".to_string(), after))
    } else {
        Json(ApiResponse::ignored("Timer already running".to_string(), after))
    }
}

/// Handle POST /stop - Stop the timer, ending any break
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let (stopped, after) = state.perform("stop", |scheduler| scheduler.stop());
    if stopped {
        info!("Stop endpoint called - timer stopped");
        Json(ApiResponse::ok("Timer stopped".to_string(), after))
    } else {
        Json(ApiResponse::ignored("Timer is not running".to_string(), after))
    }
}

/// Handle POST /toggle - Start when idle, stop otherwise
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let (phase, after) = state.perform("toggle", |scheduler| scheduler.toggle());
    let message = if phase.is_idle() { "Timer stopped" } else { "Timer started" };
    info!("Toggle endpoint called - {}", message.to_lowercase());
    Json(ApiResponse::ok(message.to_string(), after))
}

/// Handle POST /skip - End the current break early
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let (skipped, after) = state.perform("skip", |scheduler| scheduler.skip_break());
    if skipped {
        info!("Skip endpoint called - break skipped");
        Json(ApiResponse::ok("Break skipped".to_string(), after))
    } else {
        Json(ApiResponse::ignored("No break to skip".to_string(), after))
    }
}

/// Handle POST /quit - Request a graceful shutdown
pub async fn quit_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    info!("Quit endpoint called - shutting down");
    state.record_action("quit");
    state.request_quit();
    Json(ApiResponse::ok("Shutting down".to_string(), state.scheduler.state()))
}

/// Handle PUT /config - Replace the work and break durations while idle
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<SchedulerConfig>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    if let Err(e) = config.validate() {
        warn!("Rejected configuration: {}", e);
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(e.to_string(), state.scheduler.state())),
        ));
    }

    if !state.scheduler.set_config(config) {
        return Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "Durations can only change while the timer is stopped".to_string(),
                state.scheduler.state(),
            )),
        ));
    }

    state.record_action("config");
    Ok(Json(ApiResponse::ok(
        "Durations updated".to_string(),
        state.scheduler.state(),
    )))
}

/// Handle GET /status - Return current timer and overlay status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.scheduler.state().into(),
        overlays: state.overlays.overlay_count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
