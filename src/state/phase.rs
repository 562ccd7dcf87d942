//! Scheduler phase

use serde::{Deserialize, Serialize};

/// The phase the break scheduler is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not running
    #[default]
    Idle,
    /// Counting down to the next break
    Working,
    /// Break overlay is up
    Breaking,
}

impl Phase {
    /// Short label: exactly `Idle`, `Work` or `Break`
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Working => "Work",
            Phase::Breaking => "Break",
        }
    }

    pub fn is_idle(self) -> bool {
        self == Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_display_contract() {
        assert_eq!(Phase::Idle.label(), "Idle");
        assert_eq!(Phase::Working.label(), "Work");
        assert_eq!(Phase::Breaking.label(), "Break");
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Breaking).unwrap(), "\"breaking\"");
    }
}
