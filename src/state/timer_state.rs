//! Timer state snapshot published to readers

use serde::{Deserialize, Serialize};

use super::Phase;
use crate::utils::{format_break_label, format_clock, IDLE_GLYPH};

/// Read-only view of the scheduler at one instant
///
/// Published on every mutation; overlays and the status API render from
/// it and never write back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub seconds_remaining: u64,
    pub work_duration_seconds: u64,
    pub break_duration_seconds: u64,
}

impl TimerState {
    /// Create an idle timer state for the given durations
    pub fn idle(work_duration_seconds: u64, break_duration_seconds: u64) -> Self {
        Self {
            phase: Phase::Idle,
            seconds_remaining: 0,
            work_duration_seconds,
            break_duration_seconds,
        }
    }

    pub fn phase_label(&self) -> &'static str {
        self.phase.label()
    }

    /// Label for the menu bar / tray: idle glyph, `M:SS` or `<N>s`
    pub fn menu_bar_label(&self) -> String {
        match self.phase {
            Phase::Idle => IDLE_GLYPH.to_string(),
            Phase::Working => format_clock(self.seconds_remaining),
            Phase::Breaking => format_break_label(self.seconds_remaining),
        }
    }

    /// Fraction of the break elapsed, in `[0, 1]`; zero outside a break
    pub fn break_progress(&self) -> f64 {
        if self.phase != Phase::Breaking || self.break_duration_seconds == 0 {
            return 0.0;
        }
        let total = self.break_duration_seconds as f64;
        let elapsed = total - self.seconds_remaining.min(self.break_duration_seconds) as f64;
        (elapsed / total).clamp(0.0, 1.0)
    }
}
