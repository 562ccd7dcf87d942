//! Configuration and CLI argument handling

use clap::Parser;
use thiserror::Error;

use crate::overlay::DisplayInfo;

/// Default length of a work phase (20 minutes)
pub const DEFAULT_WORK_SECONDS: u64 = 20 * 60;
/// Default length of a break phase (20 seconds)
pub const DEFAULT_BREAK_SECONDS: u64 = 20;

/// Errors raised while building configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} duration must be at least one second")]
    ZeroDuration(&'static str),
    #[error("invalid display spec '{0}', expected ID:WIDTHxHEIGHT+X+Y")]
    InvalidDisplay(String),
}

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "horizon")]
#[command(about = "An eye-rest reminder that covers every display with a break overlay")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Work phase length in seconds
    #[arg(short, long, default_value = "1200", value_parser = clap::value_parser!(u64).range(1..))]
    pub work: u64,

    /// Break phase length in seconds
    #[arg(short = 'b', long = "break", default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    pub break_seconds: u64,

    /// Display to cover during breaks, as ID:WIDTHxHEIGHT+X+Y (repeatable)
    #[arg(long = "display", default_value = "primary:1920x1080+0+0")]
    pub displays: Vec<DisplayInfo>,

    /// Command run for each alert; the alert name is appended as an argument
    #[arg(long)]
    pub alert_command: Option<String>,

    /// Start the work phase immediately
    #[arg(long)]
    pub autostart: bool,

    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Durations handed to the scheduler at construction
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        SchedulerConfig::new(self.work, self.break_seconds)
    }
}

/// Work and break durations owned by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchedulerConfig {
    pub work_duration_seconds: u64,
    pub break_duration_seconds: u64,
}

impl SchedulerConfig {
    /// Build a config, rejecting zero-length phases
    pub fn new(work_duration_seconds: u64, break_duration_seconds: u64) -> Result<Self, ConfigError> {
        let config = Self {
            work_duration_seconds,
            break_duration_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check both durations are positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.work_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration("work"));
        }
        if self.break_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration("break"));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            work_duration_seconds: DEFAULT_WORK_SECONDS,
            break_duration_seconds: DEFAULT_BREAK_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_twenty_minutes_and_twenty_seconds() {
        let config = SchedulerConfig::default();
        assert_eq!(config.work_duration_seconds, 1200);
        assert_eq!(config.break_duration_seconds, 20);
    }

    #[test]
    fn zero_durations_are_rejected() {
        assert_eq!(SchedulerConfig::new(0, 20), Err(ConfigError::ZeroDuration("work")));
        assert_eq!(SchedulerConfig::new(60, 0), Err(ConfigError::ZeroDuration("break")));
    }

    #[test]
    fn cli_defaults_match_scheduler_defaults() {
        let config = Config::try_parse_from(["horizon"]).expect("parse");
        assert_eq!(config.scheduler_config().expect("valid"), SchedulerConfig::default());
        assert_eq!(config.displays.len(), 1);
        assert_eq!(config.displays[0].id.as_str(), "primary");
        assert_eq!(config.address(), "127.0.0.1:20554");
    }

    #[test]
    fn cli_accepts_durations_and_displays() {
        let config = Config::try_parse_from([
            "horizon",
            "--work",
            "300",
            "--break",
            "10",
            "--display",
            "left:1920x1080+0+0",
            "--display",
            "right:2560x1440+1920+0",
        ])
        .expect("parse");
        assert_eq!(config.work, 300);
        assert_eq!(config.break_seconds, 10);
        assert_eq!(config.displays.len(), 2);
        assert_eq!(config.displays[1].x, 1920);
    }

    #[test]
    fn cli_rejects_zero_work_duration() {
        assert!(Config::try_parse_from(["horizon", "--work", "0"]).is_err());
    }
}
