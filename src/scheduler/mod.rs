//! Break scheduling
//!
//! `BreakScheduler` alternates work and break phases. A dispatch lock is
//! held from every mutation through the delivery of its event, so events
//! reach observers in the order the state changed. Observers run under
//! that lock and must not call the scheduler's controls themselves.

pub mod machine;
pub mod events;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
    time::Duration,
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

pub use machine::TimerCore;
pub use events::{BreakEvent, BreakObserver};

use crate::{
    config::SchedulerConfig,
    services::{Alert, AlertSink},
    state::{Phase, TimerState},
    tasks::ticker_task,
};

/// Cadence of the countdown ticker
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The work/break timer shared by the host, the API and the overlays
pub struct BreakScheduler {
    // Lock order: dispatch, then core, then ticker
    dispatch: Mutex<()>,
    core: Mutex<TimerCore>,
    alerts: Arc<dyn AlertSink>,
    observers: RwLock<Vec<Arc<dyn BreakObserver>>>,
    state_tx: watch::Sender<TimerState>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl BreakScheduler {
    /// Create an idle scheduler
    pub fn new(config: SchedulerConfig, alerts: Arc<dyn AlertSink>) -> Arc<Self> {
        let core = TimerCore::new(config);
        let (state_tx, _) = watch::channel(core.snapshot());

        Arc::new(Self {
            dispatch: Mutex::new(()),
            core: Mutex::new(core),
            alerts,
            observers: RwLock::new(Vec::new()),
            state_tx,
            ticker: Mutex::new(None),
        })
    }

    /// Register an observer for break notifications
    pub fn subscribe(&self, observer: Arc<dyn BreakObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Register a closure for break notifications
    pub fn on_event<F>(&self, observer: F)
    where
        F: Fn(&Arc<BreakScheduler>, BreakEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(observer));
    }

    /// Watch the published timer state
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.state_tx.subscribe()
    }

    /// Start the work phase and the ticker. Returns `false` (no-op) unless idle.
    pub fn start(self: &Arc<Self>) -> bool {
        let _dispatch = self.lock_dispatch();
        self.start_dispatched()
    }

    /// Stop the ticker and go idle, ending any break in progress.
    /// Returns `false` (no-op) when already idle.
    pub fn stop(self: &Arc<Self>) -> bool {
        let _dispatch = self.lock_dispatch();
        self.stop_dispatched()
    }

    /// `start()` when idle, `stop()` otherwise. Returns the resulting phase.
    pub fn toggle(self: &Arc<Self>) -> Phase {
        let _dispatch = self.lock_dispatch();
        if self.phase().is_idle() {
            self.start_dispatched();
        } else {
            self.stop_dispatched();
        }
        self.phase()
    }

    /// End the current break now. Returns `false` (no-op) unless breaking.
    pub fn skip_break(self: &Arc<Self>) -> bool {
        let _dispatch = self.lock_dispatch();
        let mut core = self.lock_core();
        let Some(event) = core.skip_break(Instant::now()) else {
            debug!("Skip ignored, scheduler is {:?}", core.phase());
            return false;
        };
        self.publish(&core);
        drop(core);

        info!("Break skipped");
        self.transition(event);
        true
    }

    /// Recompute the countdown from the deadline, firing a transition when due
    pub fn tick(self: &Arc<Self>) {
        let run = self.lock_core().run();
        self.tick_run(run);
    }

    /// Tick on behalf of `run`. Returns `false` once that run is over.
    pub(crate) fn tick_run(self: &Arc<Self>, run: u64) -> bool {
        let _dispatch = self.lock_dispatch();
        let mut core = self.lock_core();
        if core.run() != run || core.phase().is_idle() {
            return false;
        }
        let event = core.recompute(Instant::now());
        self.publish(&core);
        debug!("Tick: {:?} {}s remaining", core.phase(), core.seconds_remaining());
        drop(core);

        if let Some(event) = event {
            self.transition(event);
        }
        true
    }

    fn start_dispatched(self: &Arc<Self>) -> bool {
        let mut core = self.lock_core();
        let Some(run) = core.start(Instant::now()) else {
            debug!("Start ignored, scheduler is {:?}", core.phase());
            return false;
        };
        info!(
            "Scheduler started: {}s work, {}s break",
            core.config().work_duration_seconds,
            core.config().break_duration_seconds
        );
        self.spawn_ticker(run);
        self.publish(&core);
        true
    }

    // The break end is delivered while the phase still reads Breaking.
    // Holding the dispatch lock keeps any pending tick out until `core.stop()`
    // has retired its run.
    fn stop_dispatched(self: &Arc<Self>) -> bool {
        let phase = self.phase();
        if phase.is_idle() {
            debug!("Stop ignored, scheduler is idle");
            return false;
        }
        if let Some(ticker) = self.lock_ticker().take() {
            ticker.abort();
        }
        if phase == Phase::Breaking {
            self.notify(BreakEvent::BreakEnded);
        }

        let mut core = self.lock_core();
        core.stop();
        self.publish(&core);
        drop(core);

        info!("Scheduler stopped");
        true
    }

    /// Replace the durations. Ignored (returns `false`) unless idle.
    pub fn set_config(&self, config: SchedulerConfig) -> bool {
        let mut core = self.lock_core();
        if !core.set_config(config) {
            return false;
        }
        info!(
            "Durations set to {}s work, {}s break",
            config.work_duration_seconds, config.break_duration_seconds
        );
        self.publish(&core);
        true
    }

    pub fn config(&self) -> SchedulerConfig {
        self.lock_core().config()
    }

    pub fn phase(&self) -> Phase {
        self.lock_core().phase()
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.lock_core().seconds_remaining()
    }

    /// When the current phase ends; `None` while idle
    pub fn deadline(&self) -> Option<Instant> {
        self.lock_core().deadline()
    }

    /// Consistent snapshot of everything readers display
    pub fn state(&self) -> TimerState {
        self.lock_core().snapshot()
    }

    pub fn phase_label(&self) -> &'static str {
        self.phase().label()
    }

    pub fn menu_bar_label(&self) -> String {
        self.state().menu_bar_label()
    }

    pub fn break_progress(&self) -> f64 {
        self.state().break_progress()
    }

    fn spawn_ticker(self: &Arc<Self>, run: u64) {
        let Ok(handle) = Handle::try_current() else {
            warn!("No runtime available, ticks must be driven manually");
            return;
        };
        let ticker = handle.spawn(ticker_task(Arc::downgrade(self), run, TICK_PERIOD));
        if let Some(previous) = self.lock_ticker().replace(ticker) {
            previous.abort();
        }
    }

    fn transition(self: &Arc<Self>, event: BreakEvent) {
        match event {
            BreakEvent::BreakStarted => info!("Break started"),
            BreakEvent::BreakEnded => info!("Break ended, back to work"),
        }
        self.alerts.play(Alert::from(event));
        self.notify(event);
    }

    fn notify(self: &Arc<Self>, event: BreakEvent) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_break_event(self, event);
        }
    }

    fn publish(&self, core: &TimerCore) {
        self.state_tx.send_replace(core.snapshot());
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_core(&self) -> MutexGuard<'_, TimerCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for BreakScheduler {
    fn drop(&mut self) {
        if let Some(ticker) = self.lock_ticker().take() {
            ticker.abort();
        }
    }
}

impl std::fmt::Debug for BreakScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakScheduler")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
