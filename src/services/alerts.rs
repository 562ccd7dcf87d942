//! Break alerts

use std::sync::Arc;

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use crate::scheduler::BreakEvent;

/// Audible cue played at a break boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    BreakStarted,
    BreakEnded,
}

impl Alert {
    /// Name passed to alert commands
    pub fn name(self) -> &'static str {
        match self {
            Alert::BreakStarted => "break-started",
            Alert::BreakEnded => "break-ended",
        }
    }
}

impl From<BreakEvent> for Alert {
    fn from(event: BreakEvent) -> Self {
        match event {
            BreakEvent::BreakStarted => Alert::BreakStarted,
            BreakEvent::BreakEnded => Alert::BreakEnded,
        }
    }
}

/// Plays alerts. Must not block: it is called on the scheduler's path.
pub trait AlertSink: Send + Sync {
    fn play(&self, alert: Alert);
}

/// Alert sink that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn play(&self, alert: Alert) {
        info!("Alert: {}", alert.name());
    }
}

/// Alert sink that runs a user command, appending the alert name
#[derive(Debug, Clone)]
pub struct CommandAlerts {
    program: String,
    args: Vec<String>,
}

impl CommandAlerts {
    /// Split a shell-style command line. Returns `None` for empty or badly quoted input.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = shlex::split(command_line)?;
        if words.is_empty() {
            return None;
        }
        let program = words.remove(0);
        Some(Self { program, args: words })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl AlertSink for CommandAlerts {
    fn play(&self, alert: Alert) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No runtime available to play alert {}", alert.name());
            return;
        };
        let command = self.clone();
        handle.spawn(async move {
            if let Err(e) = run_alert_command(&command, alert).await {
                warn!("Alert command failed: {}", e);
            }
        });
    }
}

/// Run the alert command to completion
pub async fn run_alert_command(command: &CommandAlerts, alert: Alert) -> Result<(), String> {
    debug!("Running alert command {} for {}", command.program, alert.name());

    let output = Command::new(&command.program)
        .args(&command.args)
        .arg(alert.name())
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", command.program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} exited with {}: {}", command.program, output.status, stderr));
    }

    Ok(())
}

/// Build the sink selected by configuration
pub fn alert_sink(command_line: Option<&str>) -> Arc<dyn AlertSink> {
    match command_line {
        Some(line) => match CommandAlerts::parse(line) {
            Some(command) => {
                info!("Alerts will run: {}", line);
                Arc::new(command)
            }
            None => {
                warn!("Ignoring unusable alert command '{}', alerts will be logged only", line);
                Arc::new(LogAlerts)
            }
        },
        None => Arc::new(LogAlerts),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Alert, AlertSink};

    /// Records every alert played
    #[derive(Debug, Default)]
    pub struct RecordingAlerts(Mutex<Vec<Alert>>);

    impl RecordingAlerts {
        pub fn played(&self) -> Vec<Alert> {
            self.0.lock().unwrap().clone()
        }
    }

    impl AlertSink for RecordingAlerts {
        fn play(&self, alert: Alert) {
            self.0.lock().unwrap().push(alert);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_quoted_arguments() {
        let command = CommandAlerts::parse("paplay --volume 40000 'my sound.oga'").unwrap();
        assert_eq!(command.program(), "paplay");
        assert_eq!(command.args(), ["--volume", "40000", "my sound.oga"]);
    }

    #[test]
    fn parse_rejects_empty_and_unbalanced_input() {
        assert!(CommandAlerts::parse("   ").is_none());
        assert!(CommandAlerts::parse("play 'oops").is_none());
    }

    #[test]
    fn alert_names_follow_events() {
        assert_eq!(Alert::from(BreakEvent::BreakStarted).name(), "break-started");
        assert_eq!(Alert::from(BreakEvent::BreakEnded).name(), "break-ended");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn alert_command_receives_alert_name() {
        let command = CommandAlerts::parse("test break-ended =").unwrap();
        assert!(run_alert_command(&command, Alert::BreakEnded).await.is_ok());
        assert!(run_alert_command(&command, Alert::BreakStarted).await.is_err());
    }
}
