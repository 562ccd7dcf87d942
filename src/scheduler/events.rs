//! Break notifications and the observer seam

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::BreakScheduler;

/// Notification emitted at a break boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakEvent {
    BreakStarted,
    BreakEnded,
}

/// Receives break notifications synchronously, after the phase has changed
///
/// The emitting scheduler is passed in so observers need not hold their
/// own reference to it.
pub trait BreakObserver: Send + Sync {
    fn on_break_event(&self, scheduler: &Arc<BreakScheduler>, event: BreakEvent);
}

impl<F> BreakObserver for F
where
    F: Fn(&Arc<BreakScheduler>, BreakEvent) + Send + Sync,
{
    fn on_break_event(&self, scheduler: &Arc<BreakScheduler>, event: BreakEvent) {
        self(scheduler, event)
    }
}
