//! What an overlay surface draws

use serde::Serialize;

use crate::state::TimerState;

pub const EYE_ICON: &str = "👁";
pub const INSTRUCTION: &str = "Look 20 meters away";
pub const SKIP_LABEL: &str = "Skip";
/// Cells in the text progress track
pub const TRACK_WIDTH: usize = 40;

/// One render of the break overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub icon: &'static str,
    pub instruction: &'static str,
    pub countdown: u64,
    /// Filled fraction of the progress track, `[0, 1]`
    pub progress: f64,
    pub skip_label: &'static str,
}

impl OverlayFrame {
    pub fn from_state(state: &TimerState) -> Self {
        Self {
            icon: EYE_ICON,
            instruction: INSTRUCTION,
            countdown: state.seconds_remaining,
            progress: state.break_progress(),
            skip_label: SKIP_LABEL,
        }
    }

    /// Cells of a `width`-wide track that are filled
    pub fn filled_cells(&self, width: usize) -> usize {
        ((width as f64 * self.progress.clamp(0.0, 1.0)).round() as usize).min(width)
    }

    /// Horizontal track filled in proportion to progress
    pub fn progress_track(&self, width: usize) -> String {
        let filled = self.filled_cells(width);
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }

    /// Single-line rendering used by text backends
    pub fn render_line(&self) -> String {
        format!(
            "{}  {}  {:>3}  [{}]  ({})",
            self.icon,
            self.instruction,
            self.countdown,
            self.progress_track(TRACK_WIDTH),
            self.skip_label
        )
    }
}
