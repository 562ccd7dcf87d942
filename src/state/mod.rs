//! State management module
//!
//! Phase and snapshot types shared by the scheduler and its readers, plus
//! the host state the control API runs against.

pub mod app_state;
pub mod phase;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use phase::Phase;
pub use timer_state::TimerState;
