//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Phase, TimerState};

/// Timer fields as the host displays them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: Phase,
    pub phase_label: String,
    pub menu_bar_label: String,
    pub seconds_remaining: u64,
    pub break_progress: f64,
    pub work_duration_seconds: u64,
    pub break_duration_seconds: u64,
}

impl From<TimerState> for TimerView {
    fn from(state: TimerState) -> Self {
        Self {
            phase: state.phase,
            phase_label: state.phase_label().to_string(),
            menu_bar_label: state.menu_bar_label(),
            seconds_remaining: state.seconds_remaining,
            break_progress: state.break_progress(),
            work_duration_seconds: state.work_duration_seconds,
            break_duration_seconds: state.break_duration_seconds,
        }
    }
}

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer: timer.into(),
        }
    }

    /// Create a success response
    pub fn ok(message: String, timer: TimerState) -> Self {
        Self::new("ok".to_string(), message, timer)
    }

    /// Create a response for a control that did not apply in the current phase
    pub fn ignored(message: String, timer: TimerState) -> Self {
        Self::new("ignored".to_string(), message, timer)
    }

    /// Create an error response
    pub fn error(message: String, timer: TimerState) -> Self {
        Self::new("error".to_string(), message, timer)
    }
}

/// Status response with overlay and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub overlays: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
