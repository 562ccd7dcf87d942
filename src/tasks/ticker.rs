//! Countdown ticker background task

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::scheduler::BreakScheduler;

/// Drive one scheduler run with periodic ticks
///
/// Each tick only asks the scheduler to recompute against its deadline,
/// so a late or skipped wake-up (system sleep) is corrected on the next
/// one. Exits once the run is stopped or the scheduler is dropped.
pub async fn ticker_task(scheduler: Weak<BreakScheduler>, run: u64, period: Duration) {
    debug!("Starting ticker for run {}", run);

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(scheduler) = scheduler.upgrade() else {
            debug!("Scheduler dropped, ticker for run {} exiting", run);
            break;
        };
        if !scheduler.tick_run(run) {
            debug!("Run {} is over, ticker exiting", run);
            break;
        }
    }
}
