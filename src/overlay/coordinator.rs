//! Presents and dismisses the per-display break overlays

use std::{
    collections::BTreeMap,
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error, info, warn};

use super::{
    DisplayId, DisplayInfo, DisplayProvider, OverlayError, OverlayFrame, OverlaySurface,
    SkipControl, SurfaceFactory, SurfaceStyle,
};
use crate::{
    scheduler::{BreakEvent, BreakObserver, BreakScheduler},
    state::Phase,
};

/// One surface per display, created and closed as a unit
#[derive(Default)]
pub struct OverlaySet {
    surfaces: BTreeMap<DisplayId, Box<dyn OverlaySurface>>,
}

impl OverlaySet {
    /// Create a surface on every display, or none at all
    pub fn create(
        displays: &[DisplayInfo],
        factory: &dyn SurfaceFactory,
        style: &SurfaceStyle,
        skip: &SkipControl,
    ) -> Result<Self, OverlayError> {
        let mut set = Self::default();
        for screen in displays {
            if set.surfaces.contains_key(&screen.id) {
                warn!("Display {} listed twice, covering it once", screen.id);
                continue;
            }
            // An early return drops `set`, closing what was already created
            let surface = factory.create(screen, style, skip.clone())?;
            set.surfaces.insert(screen.id.clone(), surface);
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn display_ids(&self) -> Vec<DisplayId> {
        self.surfaces.keys().cloned().collect()
    }

    pub fn render_all(&mut self, frame: &OverlayFrame) {
        for surface in self.surfaces.values_mut() {
            surface.render(frame);
        }
    }

    pub fn close_all(&mut self) {
        for (_, mut surface) in mem::take(&mut self.surfaces) {
            surface.close();
        }
    }
}

impl Drop for OverlaySet {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Shows the overlay set on break start and tears it down on break end
pub struct OverlayCoordinator {
    displays: Arc<dyn DisplayProvider>,
    factory: Arc<dyn SurfaceFactory>,
    style: SurfaceStyle,
    overlays: Arc<Mutex<OverlaySet>>,
    render_task: Mutex<Option<JoinHandle<()>>>,
}

impl OverlayCoordinator {
    pub fn new(displays: Arc<dyn DisplayProvider>, factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            displays,
            factory,
            style: SurfaceStyle::default(),
            overlays: Arc::new(Mutex::new(OverlaySet::default())),
            render_task: Mutex::new(None),
        }
    }

    /// Cover every connected display. No-op while overlays are already up.
    ///
    /// The display list is read here only; layout changes during a break
    /// are picked up on the next break.
    pub fn show(&self, scheduler: &Arc<BreakScheduler>) {
        let mut overlays = lock(&self.overlays);
        if !overlays.is_empty() {
            debug!("Overlays already shown on {} display(s)", overlays.len());
            return;
        }

        let displays = self.displays.displays();
        if displays.is_empty() {
            warn!("No displays connected, break overlay not shown");
            return;
        }

        let skip = SkipControl::new(scheduler);
        match OverlaySet::create(&displays, self.factory.as_ref(), &self.style, &skip) {
            Ok(set) => *overlays = set,
            Err(e) => {
                error!("Failed to show break overlays: {}", e);
                return;
            }
        }

        overlays.render_all(&OverlayFrame::from_state(&scheduler.state()));
        info!("Break overlay shown on {} display(s)", overlays.len());

        // Still under the set lock, so a dismiss cannot miss the new task
        self.spawn_render_task(scheduler);
    }

    /// Close every overlay. Safe to call when none are shown.
    pub fn dismiss(&self) {
        // Lock order: overlays, then render_task
        let mut overlays = lock(&self.overlays);
        if let Some(task) = lock(&self.render_task).take() {
            task.abort();
        }
        if overlays.is_empty() {
            return;
        }
        let count = overlays.len();
        overlays.close_all();
        info!("Break overlay dismissed from {} display(s)", count);
    }

    pub fn overlay_count(&self) -> usize {
        lock(&self.overlays).len()
    }

    pub fn display_ids(&self) -> Vec<DisplayId> {
        lock(&self.overlays).display_ids()
    }

    /// Re-render the set on every published timer change until dismissed
    fn spawn_render_task(&self, scheduler: &Arc<BreakScheduler>) {
        let Ok(handle) = Handle::try_current() else {
            debug!("No runtime available, overlays will not re-render");
            return;
        };

        let mut state_rx = scheduler.watch();
        state_rx.borrow_and_update();
        let overlays = Arc::clone(&self.overlays);

        let task = handle.spawn(async move {
            while state_rx.changed().await.is_ok() {
                let state = *state_rx.borrow_and_update();
                if state.phase != Phase::Breaking {
                    continue;
                }
                lock(&overlays).render_all(&OverlayFrame::from_state(&state));
            }
        });

        if let Some(previous) = lock(&self.render_task).replace(task) {
            previous.abort();
        }
    }
}

impl BreakObserver for OverlayCoordinator {
    fn on_break_event(&self, scheduler: &Arc<BreakScheduler>, event: BreakEvent) {
        match event {
            BreakEvent::BreakStarted => self.show(scheduler),
            BreakEvent::BreakEnded => self.dismiss(),
        }
    }
}

impl Drop for OverlayCoordinator {
    fn drop(&mut self) {
        self.dismiss();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{config::SchedulerConfig, overlay::StaticDisplays, services::LogAlerts};

    #[derive(Default)]
    struct Recorder {
        created: Mutex<Vec<DisplayId>>,
        closed: Mutex<Vec<DisplayId>>,
        countdowns: Mutex<Vec<(DisplayId, u64)>>,
        fail_on: Option<DisplayId>,
    }

    impl Recorder {
        fn created(&self) -> usize {
            self.created.lock().unwrap().len()
        }

        fn closed(&self) -> usize {
            self.closed.lock().unwrap().len()
        }

        fn countdowns(&self) -> Vec<(DisplayId, u64)> {
            self.countdowns.lock().unwrap().clone()
        }
    }

    struct RecordingSurface {
        display: DisplayInfo,
        skip: SkipControl,
        recorder: Arc<Recorder>,
        open: bool,
    }

    impl OverlaySurface for RecordingSurface {
        fn display(&self) -> &DisplayInfo {
            &self.display
        }

        fn render(&mut self, frame: &OverlayFrame) {
            assert!(self.open, "render after close");
            assert!((0.0..=1.0).contains(&frame.progress));
            self.recorder
                .countdowns
                .lock()
                .unwrap()
                .push((self.display.id.clone(), frame.countdown));
        }

        fn skip_control(&self) -> &SkipControl {
            &self.skip
        }

        fn close(&mut self) {
            if self.open {
                self.open = false;
                self.recorder.closed.lock().unwrap().push(self.display.id.clone());
            }
        }
    }

    struct RecordingFactory(Arc<Recorder>);

    impl SurfaceFactory for RecordingFactory {
        fn create(
            &self,
            display: &DisplayInfo,
            _style: &SurfaceStyle,
            skip: SkipControl,
        ) -> Result<Box<dyn OverlaySurface>, OverlayError> {
            if self.0.fail_on.as_ref() == Some(&display.id) {
                return Err(OverlayError::CreateFailed {
                    display: display.id.clone(),
                    reason: "no window server".to_string(),
                });
            }
            self.0.created.lock().unwrap().push(display.id.clone());
            Ok(Box::new(RecordingSurface {
                display: display.clone(),
                skip,
                recorder: Arc::clone(&self.0),
                open: true,
            }))
        }
    }

    fn displays(specs: &[&str]) -> Vec<DisplayInfo> {
        specs.iter().map(|spec| spec.parse().unwrap()).collect()
    }

    struct Harness {
        scheduler: Arc<BreakScheduler>,
        coordinator: Arc<OverlayCoordinator>,
        provider: Arc<StaticDisplays>,
        recorder: Arc<Recorder>,
    }

    fn harness_with(recorder: Recorder, work: u64, brk: u64) -> Harness {
        let recorder = Arc::new(recorder);
        let provider = Arc::new(StaticDisplays::new(displays(&[
            "left:1920x1080+0+0",
            "right:2560x1440+1920+0",
        ])));
        let coordinator = Arc::new(OverlayCoordinator::new(
            provider.clone(),
            Arc::new(RecordingFactory(Arc::clone(&recorder))),
        ));
        let scheduler = BreakScheduler::new(SchedulerConfig::new(work, brk).unwrap(), Arc::new(LogAlerts));
        scheduler.subscribe(coordinator.clone());
        Harness {
            scheduler,
            coordinator,
            provider,
            recorder,
        }
    }

    fn harness(work: u64, brk: u64) -> Harness {
        harness_with(Recorder::default(), work, brk)
    }

    #[tokio::test]
    async fn show_is_idempotent() {
        let h = harness(60, 10);
        h.coordinator.show(&h.scheduler);
        h.coordinator.show(&h.scheduler);
        assert_eq!(h.coordinator.overlay_count(), 2);
        assert_eq!(h.recorder.created(), 2);
        assert_eq!(
            h.coordinator.display_ids(),
            vec![DisplayId::new("left"), DisplayId::new("right")]
        );
        h.coordinator.dismiss();
    }

    #[tokio::test]
    async fn dismiss_without_overlays_is_a_no_op() {
        let h = harness(60, 10);
        h.coordinator.dismiss();
        h.coordinator.dismiss();
        assert_eq!(h.coordinator.overlay_count(), 0);
        assert_eq!(h.recorder.closed(), 0);
    }

    #[tokio::test]
    async fn dismiss_closes_every_surface() {
        let h = harness(60, 10);
        h.coordinator.show(&h.scheduler);
        h.coordinator.dismiss();
        assert_eq!(h.coordinator.overlay_count(), 0);
        assert_eq!(h.recorder.closed(), 2);

        h.coordinator.show(&h.scheduler);
        assert_eq!(h.recorder.created(), 4);
        h.coordinator.dismiss();
    }

    #[tokio::test]
    async fn failed_creation_leaves_nothing_behind() {
        let recorder = Recorder {
            fail_on: Some(DisplayId::new("right")),
            ..Recorder::default()
        };
        let h = harness_with(recorder, 60, 10);
        h.coordinator.show(&h.scheduler);
        assert_eq!(h.coordinator.overlay_count(), 0);
        assert_eq!(h.recorder.created(), 1);
        assert_eq!(h.recorder.closed(), 1);
    }

    #[tokio::test]
    async fn no_displays_means_no_overlays() {
        let h = harness(60, 10);
        h.provider.replace(Vec::new());
        h.coordinator.show(&h.scheduler);
        assert_eq!(h.coordinator.overlay_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn follows_break_start_and_end() {
        let h = harness(1, 2);
        h.scheduler.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(h.scheduler.phase(), Phase::Breaking);
        assert_eq!(h.coordinator.overlay_count(), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.scheduler.phase(), Phase::Working);
        assert_eq!(h.coordinator.overlay_count(), 0);
        assert_eq!(h.recorder.closed(), 2);
        h.scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn renders_each_countdown_step() {
        let h = harness(1, 3);
        h.scheduler.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        let left: Vec<u64> = h
            .recorder
            .countdowns()
            .into_iter()
            .filter(|(id, _)| id.as_str() == "left")
            .map(|(_, countdown)| countdown)
            .collect();
        assert_eq!(left, vec![3, 2]);
        h.scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn skip_from_a_surface_dismisses_all() {
        let h = harness(1, 20);
        h.scheduler.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let skip = {
            let overlays = lock(&h.coordinator.overlays);
            let surface = overlays.surfaces.values().next().unwrap();
            surface.skip_control().clone()
        };
        skip.press();

        assert_eq!(h.scheduler.phase(), Phase::Working);
        assert_eq!(h.scheduler.seconds_remaining(), 1);
        assert_eq!(h.coordinator.overlay_count(), 0);
        h.scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_break_dismisses() {
        let h = harness(1, 20);
        h.scheduler.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        h.scheduler.stop();
        assert_eq!(h.coordinator.overlay_count(), 0);
        assert_eq!(h.recorder.closed(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn layout_changes_wait_for_the_next_break() {
        let h = harness(1, 1);
        h.scheduler.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(h.coordinator.overlay_count(), 2);

        h.provider.replace(displays(&["laptop:1440x900+0+0"]));
        assert_eq!(h.coordinator.overlay_count(), 2);

        // Break ends at 2s, the next one starts at 3s
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.scheduler.phase(), Phase::Breaking);
        assert_eq!(h.coordinator.display_ids(), vec![DisplayId::new("laptop")]);
        h.scheduler.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_racing_a_break_start_leaves_no_overlays() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = BreakScheduler::new(SchedulerConfig::new(1, 20).unwrap(), Arc::new(LogAlerts));
        // A slow observer ahead of the coordinator widens the window between
        // the phase change and the overlays being shown
        scheduler.on_event(|_, event| {
            if event == BreakEvent::BreakStarted {
                std::thread::sleep(Duration::from_millis(300));
            }
        });
        let coordinator = Arc::new(OverlayCoordinator::new(
            Arc::new(StaticDisplays::new(displays(&["only:800x600+0+0"]))),
            Arc::new(RecordingFactory(Arc::clone(&recorder))),
        ));
        scheduler.subscribe(coordinator.clone());
        scheduler.start();

        let host = Arc::clone(&scheduler);
        let stopper = std::thread::spawn(move || {
            let give_up = std::time::Instant::now() + Duration::from_secs(5);
            while host.phase() != Phase::Breaking {
                assert!(std::time::Instant::now() < give_up, "break never started");
                std::thread::sleep(Duration::from_millis(1));
            }
            host.stop()
        });
        let stopped = tokio::task::spawn_blocking(move || stopper.join().unwrap())
            .await
            .unwrap();

        assert!(stopped);
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert_eq!(coordinator.overlay_count(), 0);
        assert_eq!(recorder.created(), recorder.closed());
    }

    #[test]
    fn dropping_the_coordinator_closes_surfaces() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = BreakScheduler::new(SchedulerConfig::default(), Arc::new(LogAlerts));
        let coordinator = OverlayCoordinator::new(
            Arc::new(StaticDisplays::new(displays(&["only:800x600+0+0"]))),
            Arc::new(RecordingFactory(Arc::clone(&recorder))),
        );
        coordinator.show(&scheduler);
        assert_eq!(coordinator.overlay_count(), 1);
        drop(coordinator);
        assert_eq!(recorder.closed(), 1);
    }
}
