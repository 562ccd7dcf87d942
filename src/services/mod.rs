//! External side effects module
//!
//! Alert playback lives here; it is the only thing the scheduler reaches
//! outside the process for.

pub mod alerts;

// Re-export main types
pub use alerts::{Alert, AlertSink, CommandAlerts, LogAlerts};
