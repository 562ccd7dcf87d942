//! Connected displays

use std::{
    fmt,
    str::FromStr,
    sync::{PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Stable identity of a display
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DisplayId(String);

impl DisplayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connected display and its frame in virtual screen space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub id: DisplayId,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub primary: bool,
}

impl FromStr for DisplayInfo {
    type Err = ConfigError;

    /// Parse `ID:WIDTHxHEIGHT+X+Y` (offsets may also be negative, X11 style)
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidDisplay(spec.to_string());

        let (id, geometry) = spec.split_once(':').ok_or_else(invalid)?;
        if id.is_empty() {
            return Err(invalid());
        }
        let offsets_at = geometry.find(['+', '-']).ok_or_else(invalid)?;
        let (size, offsets) = geometry.split_at(offsets_at);
        let (width, height) = size.split_once('x').ok_or_else(invalid)?;
        let (x, y) = parse_offsets(offsets).ok_or_else(invalid)?;

        let width: u32 = width.parse().map_err(|_| invalid())?;
        let height: u32 = height.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self {
            id: DisplayId::new(id),
            width,
            height,
            x,
            y,
            primary: false,
        })
    }
}

fn parse_offsets(offsets: &str) -> Option<(i32, i32)> {
    let second = offsets.get(1..)?.find(['+', '-'])? + 1;
    let (x, y) = offsets.split_at(second);
    Some((parse_signed(x)?, parse_signed(y)?))
}

fn parse_signed(value: &str) -> Option<i32> {
    if let Some(digits) = value.strip_prefix('+') {
        digits.parse().ok()
    } else if value.starts_with('-') {
        value.parse().ok()
    } else {
        None
    }
}

/// Source of the currently connected displays
pub trait DisplayProvider: Send + Sync {
    fn displays(&self) -> Vec<DisplayInfo>;
}

/// Fixed display list, replaceable when the layout changes
#[derive(Debug, Default)]
pub struct StaticDisplays {
    displays: RwLock<Vec<DisplayInfo>>,
}

impl StaticDisplays {
    /// The first display is marked primary
    pub fn new(displays: Vec<DisplayInfo>) -> Self {
        Self {
            displays: RwLock::new(mark_primary(displays)),
        }
    }

    /// Swap in a new layout; takes effect on the next `displays()` call
    pub fn replace(&self, displays: Vec<DisplayInfo>) {
        *self.displays.write().unwrap_or_else(PoisonError::into_inner) = mark_primary(displays);
    }
}

impl DisplayProvider for StaticDisplays {
    fn displays(&self) -> Vec<DisplayInfo> {
        self.displays
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn mark_primary(mut displays: Vec<DisplayInfo>) -> Vec<DisplayInfo> {
    for (index, display) in displays.iter_mut().enumerate() {
        display.primary = index == 0;
    }
    displays
}
