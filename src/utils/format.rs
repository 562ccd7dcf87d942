//! Text formatting shared by the menu label, the status API and overlays

/// Label shown while no timer is running
pub const IDLE_GLYPH: &str = "◎";

/// Format seconds as `M:SS` (minutes unpadded, seconds zero-padded)
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format the break countdown as `<N>s`
pub fn format_break_label(seconds: u64) -> String {
    format!("{}s", seconds)
}

/// Format an uptime as a compact human string
pub fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
