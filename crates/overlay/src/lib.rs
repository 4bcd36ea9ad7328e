//! Region selector overlay for PageSnap
//!
//! A full-display overlay on a frozen snapshot where the user drags out the
//! rectangle to capture. Selection logic, panel layout and the shaded
//! backdrop are platform independent; the Win32 window and its GDI drawing
//! live in [`window`].

pub mod magnifier;
#[cfg(windows)]
mod painter;
pub mod panel;
pub mod render;
pub mod selection;
pub mod selector;
#[cfg(windows)]
pub mod window;

pub use magnifier::{Preview, PreviewWorker};
pub use selection::{SelectionInput, SelectionState};
pub use selector::{RegionSelector, SelectorEvent};
#[cfg(windows)]
pub use window::OverlayWindow;

use capture::Rect;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Display index {index} out of range ({count} display(s))")]
    DisplayIndex { index: usize, count: usize },
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// Selection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Region relative to the selected display's origin
    Region(Rect),
    /// User cancelled
    Cancelled,
}

impl From<SelectorEvent> for SelectionOutcome {
    fn from(event: SelectorEvent) -> Self {
        match event {
            SelectorEvent::Selected(rect) => SelectionOutcome::Region(rect),
            SelectorEvent::Cancelled => SelectionOutcome::Cancelled,
        }
    }
}
