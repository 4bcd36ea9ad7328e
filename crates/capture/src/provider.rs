//! Collaborator seams: displays, frame capture, synthetic input

use crate::{CaptureResult, DisplayInfo, FrameData, InjectorError, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumerates physical displays; order is stable within a session
pub trait DisplayRegistry: Send + Sync {
    fn list(&self) -> CaptureResult<Vec<DisplayInfo>>;
}

/// Grabs a rectangle of the virtual desktop (global coordinates)
pub trait FrameCaptureProvider: Send + Sync {
    fn capture(&self, rect: Rect) -> CaptureResult<FrameData>;
}

/// Drives the external viewer
pub trait InputInjector: Send + Sync {
    /// Send one "next page" key press
    fn press_advance_key(&self) -> Result<(), InjectorError>;

    /// Pointer position in global coordinates
    fn pointer_position(&self) -> Result<Point, InjectorError>;
}

/// Key that turns the page in the external viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvanceKey {
    #[default]
    Right,
    Down,
    PageDown,
    Space,
}

impl fmt::Display for AdvanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvanceKey::Right => "right",
            AdvanceKey::Down => "down",
            AdvanceKey::PageDown => "page-down",
            AdvanceKey::Space => "space",
        };
        f.write_str(name)
    }
}

impl FromStr for AdvanceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(AdvanceKey::Right),
            "down" => Ok(AdvanceKey::Down),
            "page-down" | "pagedown" => Ok(AdvanceKey::PageDown),
            "space" => Ok(AdvanceKey::Space),
            other => Err(format!("unknown advance key '{other}'")),
        }
    }
}
