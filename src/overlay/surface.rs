//! Overlay surfaces and the factories that create them

use std::sync::{Arc, Weak};

use thiserror::Error;
use tracing::{debug, info};

use super::{DisplayId, DisplayInfo, OverlayFrame};
use crate::scheduler::BreakScheduler;

/// Errors raised by overlay backends
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("failed to create overlay on display {display}: {reason}")]
    CreateFailed { display: DisplayId, reason: String },
}

/// Window attributes every break surface is created with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    pub fullscreen: bool,
    pub borderless: bool,
    /// Above every other window, screen saver level
    pub topmost: bool,
    /// Pointer events pass through except on the surface's own controls
    pub click_through_except_controls: bool,
    pub backdrop_opacity: f32,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            fullscreen: true,
            borderless: true,
            topmost: true,
            click_through_except_controls: true,
            backdrop_opacity: 0.85,
        }
    }
}

/// The "Skip" control: a back reference that can only end the break
#[derive(Debug, Clone)]
pub struct SkipControl {
    scheduler: Weak<BreakScheduler>,
}

impl SkipControl {
    pub fn new(scheduler: &Arc<BreakScheduler>) -> Self {
        Self {
            scheduler: Arc::downgrade(scheduler),
        }
    }

    /// Skip the running break. Returns `false` when there was nothing to skip.
    pub fn press(&self) -> bool {
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.skip_break(),
            None => {
                debug!("Skip pressed after scheduler shut down");
                false
            }
        }
    }
}

/// A full-screen overlay on one display
pub trait OverlaySurface: Send {
    fn display(&self) -> &DisplayInfo;

    fn render(&mut self, frame: &OverlayFrame);

    fn skip_control(&self) -> &SkipControl;

    /// Release the surface and its platform resources. Must be idempotent.
    fn close(&mut self);
}

/// Creates surfaces for a windowing backend
pub trait SurfaceFactory: Send + Sync {
    fn create(
        &self,
        display: &DisplayInfo,
        style: &SurfaceStyle,
        skip: SkipControl,
    ) -> Result<Box<dyn OverlaySurface>, OverlayError>;
}

/// Headless surface that renders frames into the log
#[derive(Debug)]
pub struct LogSurface {
    display: DisplayInfo,
    skip: SkipControl,
    last_countdown: Option<u64>,
    open: bool,
}

impl LogSurface {
    pub fn new(display: DisplayInfo, skip: SkipControl) -> Self {
        Self {
            display,
            skip,
            last_countdown: None,
            open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl OverlaySurface for LogSurface {
    fn display(&self) -> &DisplayInfo {
        &self.display
    }

    fn render(&mut self, frame: &OverlayFrame) {
        if !self.open || self.last_countdown == Some(frame.countdown) {
            return;
        }
        self.last_countdown = Some(frame.countdown);
        info!("[{}] {}", self.display.id, frame.render_line());
    }

    fn skip_control(&self) -> &SkipControl {
        &self.skip
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!("Overlay on {} closed", self.display.id);
        }
    }
}

impl Drop for LogSurface {
    fn drop(&mut self) {
        self.close();
    }
}

/// Factory for `LogSurface`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSurfaceFactory;

impl SurfaceFactory for LogSurfaceFactory {
    fn create(
        &self,
        screen: &DisplayInfo,
        style: &SurfaceStyle,
        skip: SkipControl,
    ) -> Result<Box<dyn OverlaySurface>, OverlayError> {
        debug!(
            "Presenting {}x{} overlay on {} at ({}, {}) with {:?}",
            screen.width, screen.height, screen.id, screen.x, screen.y, style
        );
        Ok(Box::new(LogSurface::new(screen.clone(), skip)))
    }
}
