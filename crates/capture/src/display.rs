//! Display geometry snapshots

use crate::{Point, Rect};

/// One physical display in virtual-desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub index: usize,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl DisplayInfo {
    pub const FALLBACK_WIDTH: u32 = 1920;
    pub const FALLBACK_HEIGHT: u32 = 1080;

    pub fn new(index: usize, left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            index,
            left,
            top,
            width,
            height,
        }
    }

    /// Geometry used when the requested display does not exist
    pub fn fallback() -> Self {
        Self::new(0, 0, 0, Self::FALLBACK_WIDTH, Self::FALLBACK_HEIGHT)
    }

    /// Bounds in global coordinates
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.left, self.top, self.width, self.height)
    }

    /// Bounds in this display's own coordinates
    pub fn local_bounds(&self) -> Rect {
        Rect::from_origin_size(0, 0, self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn contains(&self, global: Point) -> bool {
        self.bounds().contains(global)
    }

    pub fn to_local(&self, global: Point) -> Point {
        global.offset(-self.left, -self.top)
    }

    pub fn to_global(&self, local: Point) -> Point {
        local.offset(self.left, self.top)
    }

    pub fn rect_to_global(&self, local: Rect) -> Rect {
        local.offset(self.left, self.top)
    }

    pub fn rect_to_local(&self, global: Rect) -> Rect {
        global.offset(-self.left, -self.top)
    }

    /// Human readable label, numbered from 1
    pub fn label(&self) -> String {
        format!("Monitor {}: {}x{}", self.index + 1, self.width, self.height)
    }
}

/// Display containing a global point
pub fn display_at(displays: &[DisplayInfo], global: Point) -> Option<&DisplayInfo> {
    displays.iter().find(|d| d.contains(global))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_round_trips_through_origin() {
        let d = DisplayInfo::new(1, 1920, -200, 2560, 1440);
        let local = Rect::new(100, 100, 400, 300);
        let global = d.rect_to_global(local);
        assert_eq!(global, Rect::new(2020, -100, 2320, 100));
        assert_eq!(d.rect_to_local(global), local);
        assert_eq!(d.to_local(Point::new(1920, -200)), Point::new(0, 0));
    }

    #[test]
    fn display_at_picks_the_containing_display() {
        let displays = [
            DisplayInfo::new(0, 0, 0, 1920, 1080),
            DisplayInfo::new(1, 1920, 0, 1280, 1024),
        ];
        assert_eq!(display_at(&displays, Point::new(2000, 10)).map(|d| d.index), Some(1));
        assert_eq!(display_at(&displays, Point::new(1919, 1079)).map(|d| d.index), Some(0));
        assert!(display_at(&displays, Point::new(-5, 0)).is_none());
    }

    #[test]
    fn label_is_one_based() {
        assert_eq!(DisplayInfo::fallback().label(), "Monitor 1: 1920x1080");
    }
}
