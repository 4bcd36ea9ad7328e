//! Screen capture primitives for PageSnap
//!
//! Geometry shared by the selector and the paging loop, the raw frame
//! buffer, and the collaborator traits for displays, frame capture and
//! synthetic input.

pub mod display;
pub mod frame;
pub mod provider;
#[cfg(windows)]
pub mod win32;

pub use display::DisplayInfo;
pub use frame::FrameData;
pub use provider::{AdvanceKey, DisplayRegistry, FrameCaptureProvider, InputInjector};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Empty capture region: {0:?}")]
    EmptyRegion(Rect),

    #[error("Capture region is off-screen: {0:?}")]
    OffScreen(Rect),

    #[error("GDI error: {0}")]
    Gdi(String),

    #[error("Pixel buffer is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("No displays found")]
    NoDisplays,
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Failure to drive the external viewer
#[derive(Error, Debug)]
pub enum InjectorError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Only {sent} of {expected} input events were accepted")]
    Partial { sent: u32, expected: u32 },

    #[error("Input injection unavailable: {0}")]
    Unavailable(String),
}

/// Point in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rectangle in physical pixels, stored as two corners.
///
/// Use [`Rect::normalized`] (or construct with [`Rect::from_points`]) before
/// handing a rectangle to anything that measures it: `x1 <= x2` and
/// `y1 <= y2` are assumed by `width`, `height` and `contains`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalized rectangle spanning two arbitrary corners
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y).normalized()
    }

    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, x + width as i32, y + height as i32)
    }

    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> u32 {
        if self.x2 > self.x1 {
            self.x2.abs_diff(self.x1)
        } else {
            0
        }
    }

    pub fn height(&self) -> u32 {
        if self.y2 > self.y1 {
            self.y2.abs_diff(self.y1)
        } else {
            0
        }
    }

    /// Zero-area rectangles cannot be captured
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x < self.x2 && p.y >= self.y1 && p.y < self.y2
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 < other.x2 && self.x2 > other.x1 && self.y1 < other.y2 && self.y2 > other.y1
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        ))
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Width over height, rounded to two decimals; zero for a flat rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height() == 0 {
            return 0.0;
        }
        let ratio = self.width() as f64 / self.height() as f64;
        (ratio * 100.0).round() / 100.0
    }
}
