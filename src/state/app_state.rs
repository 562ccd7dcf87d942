//! Host application state shared with the control API

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tracing::debug;

use super::TimerState;
use crate::{
    overlay::OverlayCoordinator,
    scheduler::BreakScheduler,
    utils::format::format_uptime,
};

/// The wired-up scheduler and overlays plus server metadata
pub struct AppState {
    pub scheduler: Arc<BreakScheduler>,
    pub overlays: Arc<OverlayCoordinator>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    quit: Notify,
}

impl AppState {
    /// Create the host state, subscribing the overlays to break notifications
    pub fn new(
        scheduler: Arc<BreakScheduler>,
        overlays: Arc<OverlayCoordinator>,
        host: String,
        port: u16,
    ) -> Self {
        scheduler.subscribe(overlays.clone());

        Self {
            scheduler,
            overlays,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            quit: Notify::new(),
        }
    }

    /// Run a scheduler control and record it. Returns its outcome and the state after.
    pub fn perform<F, R>(&self, action: &str, control: F) -> (R, TimerState)
    where
        F: FnOnce(&Arc<BreakScheduler>) -> R,
        R: std::fmt::Debug,
    {
        let outcome = control(&self.scheduler);
        let after = self.scheduler.state();
        debug!("{}: {:?}, now {:?}", action, outcome, after.phase);

        self.record_action(action);
        (outcome, after)
    }

    /// Update last action tracking
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    /// Ask the host to shut down
    pub fn request_quit(&self) {
        self.quit.notify_one();
    }

    /// Resolves once `request_quit` has been called
    pub async fn quit_requested(&self) {
        self.quit.notified().await;
    }
}
