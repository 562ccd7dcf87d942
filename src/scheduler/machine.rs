//! Deadline-driven phase machine
//!
//! `TimerCore` holds every piece of scheduler state and implements the
//! phase rules against an explicit `now`. It never sleeps, locks or
//! notifies; `BreakScheduler` does that around it.

use std::time::Duration;
use tokio::time::Instant;

use super::BreakEvent;
use crate::{
    config::SchedulerConfig,
    state::{Phase, TimerState},
};

/// Phase, countdown and durations of one scheduler
#[derive(Debug, Clone)]
pub struct TimerCore {
    config: SchedulerConfig,
    phase: Phase,
    seconds_remaining: u64,
    /// `None` is the "distant future" sentinel used while idle
    deadline: Option<Instant>,
    /// Bumped on every start and stop so stale tickers can tell
    run: u64,
}

impl TimerCore {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            seconds_remaining: 0,
            deadline: None,
            run: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            work_duration_seconds: self.config.work_duration_seconds,
            break_duration_seconds: self.config.break_duration_seconds,
        }
    }

    /// Replace the durations; only allowed while idle
    pub fn set_config(&mut self, config: SchedulerConfig) -> bool {
        if !self.phase.is_idle() {
            return false;
        }
        self.config = config;
        true
    }

    /// Enter the work phase. Returns the new run id, or `None` if already running.
    pub fn start(&mut self, now: Instant) -> Option<u64> {
        if !self.phase.is_idle() {
            return None;
        }
        self.run += 1;
        self.enter_working(now);
        Some(self.run)
    }

    /// Return to idle. Yields `BreakEnded` when a break was cut short.
    pub fn stop(&mut self) -> Option<BreakEvent> {
        if self.phase.is_idle() {
            return None;
        }
        let was_breaking = self.phase == Phase::Breaking;
        self.run += 1;
        self.phase = Phase::Idle;
        self.seconds_remaining = 0;
        self.deadline = None;
        was_breaking.then_some(BreakEvent::BreakEnded)
    }

    /// End the current break early, exactly like natural expiry
    pub fn skip_break(&mut self, now: Instant) -> Option<BreakEvent> {
        if self.phase != Phase::Breaking {
            return None;
        }
        self.enter_working(now);
        Some(BreakEvent::BreakEnded)
    }

    /// Recompute the countdown from the deadline and fire at most one transition
    pub fn recompute(&mut self, now: Instant) -> Option<BreakEvent> {
        let deadline = self.deadline?;
        if self.phase.is_idle() {
            return None;
        }

        self.seconds_remaining = ceil_seconds(deadline.saturating_duration_since(now));
        if now < deadline {
            return None;
        }

        match self.phase {
            Phase::Working => {
                self.enter_breaking(now);
                Some(BreakEvent::BreakStarted)
            }
            Phase::Breaking => {
                self.enter_working(now);
                Some(BreakEvent::BreakEnded)
            }
            Phase::Idle => None,
        }
    }

    fn enter_working(&mut self, now: Instant) {
        let seconds = self.config.work_duration_seconds;
        self.deadline = Some(now + Duration::from_secs(seconds));
        self.seconds_remaining = seconds;
        self.phase = Phase::Working;
    }

    fn enter_breaking(&mut self, now: Instant) {
        let seconds = self.config.break_duration_seconds;
        self.deadline = Some(now + Duration::from_secs(seconds));
        self.seconds_remaining = seconds;
        self.phase = Phase::Breaking;
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
