//! Status panel placement and text

use crate::selection::SelectionState;
use capture::{DisplayInfo, Point, Rect};

pub const PANEL_WIDTH: u32 = 280;
pub const PANEL_HEIGHT: u32 = 230;

/// Distance kept from the overlay edges
const EDGE_MARGIN: i32 = 10;
/// Distance kept from the pointer
const POINTER_GAP: i32 = 20;

pub const HELP_TEXT: &str = "Drag: select region | Esc: cancel";

/// Place the panel near the pointer, inside the overlay and off the pointer.
///
/// Preferred spot is up and to the right of the pointer. When that would
/// cover the pointer the panel drops below it, or goes above it when there
/// is no room below.
pub fn place_panel(pointer: Point, overlay_width: u32, overlay_height: u32) -> Rect {
    let (pw, ph) = (PANEL_WIDTH as i32, PANEL_HEIGHT as i32);
    let (w, h) = (overlay_width as i32, overlay_height as i32);

    let max_x = (w - pw - EDGE_MARGIN).max(0);
    let max_y = (h - ph - EDGE_MARGIN).max(0);
    let min_x = EDGE_MARGIN.min(max_x);
    let min_y = EDGE_MARGIN.min(max_y);

    let x = (pointer.x + POINTER_GAP).clamp(min_x, max_x);
    let mut y = (pointer.y - ph - POINTER_GAP).clamp(min_y, max_y);

    let panel = Rect::from_origin_size(x, y, PANEL_WIDTH, PANEL_HEIGHT);
    if panel.contains(pointer) {
        let below = pointer.y + POINTER_GAP;
        y = if below <= max_y {
            below
        } else {
            (pointer.y - ph - POINTER_GAP).max(0)
        };
    }

    Rect::from_origin_size(x, y, PANEL_WIDTH, PANEL_HEIGHT)
}

/// Lines shown in the status panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    pub pointer: String,
    pub selection: String,
    pub size: String,
    pub help: &'static str,
}

impl StatusText {
    /// Build the panel text.
    ///
    /// `pointer_global` is where the pointer really is; the display-relative
    /// position is what a capture would use.
    pub fn new(state: &SelectionState, display: &DisplayInfo, pointer_global: Point) -> Self {
        let local = display.to_local(pointer_global);
        let pointer = format!(
            "Display: ({}, {}) | Global: ({}, {})",
            local.x, local.y, pointer_global.x, pointer_global.y
        );

        let (selection, size) = match *state {
            SelectionState::Dragging { anchor, current } => (
                format!(
                    "Selecting: ({}, {}) → ({}, {})",
                    anchor.x, anchor.y, current.x, current.y
                ),
                format!(
                    "Size: {} x {}",
                    (current.x - anchor.x).unsigned_abs(),
                    (current.y - anchor.y).unsigned_abs()
                ),
            ),
            SelectionState::Pending { rect, .. } | SelectionState::Confirmed(rect) => (
                format!(
                    "Selected: ({}, {}) → ({}, {})",
                    rect.x1, rect.y1, rect.x2, rect.y2
                ),
                format!("Size: {} x {}", rect.width(), rect.height()),
            ),
            SelectionState::Idle | SelectionState::Cancelled => {
                ("Selection: none".to_string(), "Size: 0 x 0".to_string())
            }
        };

        Self {
            pointer,
            selection,
            size,
            help: HELP_TEXT,
        }
    }

    pub fn lines(&self) -> [&str; 4] {
        [&self.pointer, &self.selection, &self.size, self.help]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn panel_sits_up_right_of_pointer() {
        let panel = place_panel(Point::new(600, 500), 1920, 1080);
        assert_eq!(panel.top_left(), Point::new(620, 250));
        assert!(!panel.contains(Point::new(600, 500)));
    }

    #[test]
    fn panel_stays_inside_overlay_near_right_edge() {
        let panel = place_panel(Point::new(1900, 600), 1920, 1080);
        assert_eq!(panel.x2, 1920 - 10);
        assert!(!panel.contains(Point::new(1900, 600)));
    }

    #[test]
    fn panel_drops_below_pointer_near_top() {
        // Clamped to y=10 the panel would cover the pointer at the top edge
        let pointer = Point::new(1800, 40);
        let panel = place_panel(pointer, 1920, 1080);
        assert_eq!(panel.y1, 60);
        assert!(!panel.contains(pointer));
        assert!(panel.y2 <= 1080);
    }

    #[test]
    fn panel_never_leaves_overlay() {
        for (x, y) in [(0, 0), (1919, 1079), (-50, -50), (5000, 5000), (960, 540)] {
            let panel = place_panel(Point::new(x, y), 1920, 1080);
            assert!(panel.x1 >= 0 && panel.y1 >= 0, "{x},{y}: {panel:?}");
            assert!(panel.x2 <= 1920 && panel.y2 <= 1080, "{x},{y}: {panel:?}");
        }
    }

    #[test]
    fn status_reports_local_and_global_pointer() {
        let display = DisplayInfo::new(1, 1920, 0, 1280, 1024);
        let text = StatusText::new(&SelectionState::Idle, &display, Point::new(2000, 30));
        assert_eq!(text.pointer, "Display: (80, 30) | Global: (2000, 30)");
        assert_eq!(text.selection, "Selection: none");
        assert_eq!(text.size, "Size: 0 x 0");
    }

    #[test]
    fn status_reports_drag_and_pending_bounds() {
        let display = DisplayInfo::fallback();
        let dragging = SelectionState::Dragging {
            anchor: Point::new(300, 200),
            current: Point::new(100, 150),
        };
        let text = StatusText::new(&dragging, &display, Point::new(100, 150));
        assert_eq!(text.selection, "Selecting: (300, 200) → (100, 150)");
        assert_eq!(text.size, "Size: 200 x 50");

        let pending = SelectionState::Pending {
            rect: Rect::new(100, 150, 300, 200),
            released_at: Instant::now(),
        };
        let text = StatusText::new(&pending, &display, Point::new(0, 0));
        assert_eq!(text.selection, "Selected: (100, 150) → (300, 200)");
        assert_eq!(text.lines()[3], HELP_TEXT);
    }
}
