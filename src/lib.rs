//! Horizon - An eye-rest reminder
//!
//! Alternates a work interval with a short break and, during each break,
//! covers every connected display with a countdown overlay until the break
//! ends or is skipped.

pub mod api;
pub mod config;
pub mod overlay;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, SchedulerConfig};
pub use overlay::OverlayCoordinator;
pub use scheduler::{BreakEvent, BreakObserver, BreakScheduler};
pub use state::{AppState, Phase, TimerState};
pub use utils::signals::shutdown_signal;
