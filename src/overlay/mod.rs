//! Break overlay presentation
//!
//! The coordinator covers every connected display with one surface while a
//! break runs. Displays come from a `DisplayProvider` and surfaces from a
//! `SurfaceFactory`, so a windowing backend only has to implement those two
//! traits; `LogSurface` is the headless backend.

pub mod coordinator;
pub mod display;
pub mod frame;
pub mod surface;

// Re-export main types
pub use coordinator::{OverlayCoordinator, OverlaySet};
pub use display::{DisplayId, DisplayInfo, DisplayProvider, StaticDisplays};
pub use frame::OverlayFrame;
pub use surface::{
    LogSurface, LogSurfaceFactory, OverlayError, OverlaySurface, SkipControl, SurfaceFactory,
    SurfaceStyle,
};
