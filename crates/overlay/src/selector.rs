//! Region selector: one overlay session on one display

use crate::magnifier::zoom_source;
use crate::panel::{place_panel, StatusText};
use crate::selection::{SelectionInput, SelectionState};
use crate::{OverlayError, OverlayResult};
use capture::{DisplayInfo, Point, Rect};
use std::time::Instant;

/// Terminal event of a selector; emitted exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    /// Normalized rectangle relative to the selected display's origin
    Selected(Rect),
    Cancelled,
}

/// Resolve the display to select on
pub fn resolve_display(displays: &[DisplayInfo], index: usize) -> OverlayResult<DisplayInfo> {
    displays
        .get(index)
        .copied()
        .ok_or(OverlayError::DisplayIndex {
            index,
            count: displays.len(),
        })
}

/// Selection session over one display.
///
/// Coordinates passed to `press`/`move_to`/`release` are overlay-local.
/// The overlay surface covers the selected display, so its origin is the
/// display origin.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    displays: Vec<DisplayInfo>,
    display: DisplayInfo,
    overlay_origin: Point,
    state: SelectionState,
    pointer: Point,
    pointer_global: Point,
    panel: Rect,
}

impl RegionSelector {
    /// Open on `displays[selected_index]`, falling back to a default
    /// 1920x1080 display at the origin when the index is out of range.
    pub fn open(displays: &[DisplayInfo], selected_index: usize) -> Self {
        let display = match resolve_display(displays, selected_index) {
            Ok(display) => display,
            Err(e) => {
                log::warn!("{}; using default {}x{} display", e, DisplayInfo::FALLBACK_WIDTH, DisplayInfo::FALLBACK_HEIGHT);
                DisplayInfo::fallback()
            }
        };
        log::info!("Selecting region on {} at ({}, {})", display.label(), display.left, display.top);

        let displays = if displays.is_empty() {
            vec![display]
        } else {
            displays.to_vec()
        };

        let pointer = Point::new(display.width as i32 / 2, display.height as i32 / 2);
        Self {
            displays,
            display,
            overlay_origin: display.origin(),
            state: SelectionState::Idle,
            pointer,
            pointer_global: display.to_global(pointer),
            panel: place_panel(pointer, display.width, display.height),
        }
    }

    pub fn display(&self) -> &DisplayInfo {
        &self.display
    }

    pub fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Pointer in overlay-local coordinates
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn pointer_global(&self) -> Point {
        self.pointer_global
    }

    /// Current status panel bounds, overlay-local
    pub fn panel(&self) -> Rect {
        self.panel
    }

    /// Overlay surface in global coordinates
    pub fn overlay_bounds(&self) -> Rect {
        Rect::from_origin_size(
            self.overlay_origin.x,
            self.overlay_origin.y,
            self.display.width,
            self.display.height,
        )
    }

    pub fn overlay_size(&self) -> (u32, u32) {
        (self.display.width, self.display.height)
    }

    pub fn status(&self) -> StatusText {
        StatusText::new(&self.state, &self.display, self.pointer_global)
    }

    /// Global rectangle the magnified preview should sample
    pub fn preview_source(&self) -> Option<Rect> {
        zoom_source(&self.displays, self.pointer_global)
    }

    /// Track the real pointer position and keep the panel beside it
    pub fn pointer_moved(&mut self, global: Point) {
        self.pointer_global = global;
        self.pointer = global.offset(-self.overlay_origin.x, -self.overlay_origin.y);
        self.panel = place_panel(self.pointer, self.display.width, self.display.height);
    }

    /// Button press; presses on the status panel are ignored.
    ///
    /// Returns true when the press started a drag.
    pub fn press(&mut self, pos: Point) -> bool {
        if self.panel.contains(pos) {
            return false;
        }
        let pos = self.clamp_to_display(pos);
        self.apply(SelectionInput::Press(pos), Instant::now());
        self.state.is_dragging()
    }

    pub fn move_to(&mut self, pos: Point) {
        self.pointer_moved(pos.offset(self.overlay_origin.x, self.overlay_origin.y));
        let pos = self.clamp_to_display(pos);
        self.apply(SelectionInput::Move(pos), Instant::now());
    }

    /// Button release; a drag that ends past the display edge stops at it
    pub fn release(&mut self, pos: Point, now: Instant) {
        let was_dragging = self.state.is_dragging();
        let pos = self.clamp_to_display(pos);
        self.apply(SelectionInput::Release(pos), now);
        if was_dragging && self.state == SelectionState::Idle {
            log::debug!("Selection smaller than minimum size, discarded");
        }
    }

    /// Pointer capture taken away mid-drag: end the drag where it last was
    pub fn capture_lost(&mut self, now: Instant) {
        if let SelectionState::Dragging { current, .. } = self.state {
            log::debug!("Pointer capture lost during drag");
            self.release(current, now);
        }
    }

    /// Escape key
    pub fn cancel(&mut self) -> Option<SelectorEvent> {
        self.apply(SelectionInput::Escape, Instant::now())
    }

    /// Render tick: follow the pointer and confirm a pending selection
    /// once its delay has elapsed.
    pub fn tick(&mut self, now: Instant, pointer_global: Option<Point>) -> Option<SelectorEvent> {
        if let Some(global) = pointer_global {
            self.pointer_moved(global);
        }
        self.apply(SelectionInput::Tick, now)
    }

    fn apply(&mut self, input: SelectionInput, now: Instant) -> Option<SelectorEvent> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = self.state.transition(input, now);

        match self.state {
            SelectionState::Confirmed(rect) => {
                let selected = self.to_display_relative(rect);
                log::info!(
                    "Confirmed selection ({}, {}) to ({}, {}) on {}",
                    selected.x1,
                    selected.y1,
                    selected.x2,
                    selected.y2,
                    self.display.label()
                );
                Some(SelectorEvent::Selected(selected))
            }
            SelectionState::Cancelled => {
                log::info!("Region selection cancelled");
                Some(SelectorEvent::Cancelled)
            }
            _ => None,
        }
    }

    /// Pointer capture lets a drag run past the overlay edge
    fn clamp_to_display(&self, pos: Point) -> Point {
        let bounds = self.display.local_bounds().offset(
            self.display.left - self.overlay_origin.x,
            self.display.top - self.overlay_origin.y,
        );
        Point::new(pos.x.clamp(bounds.x1, bounds.x2), pos.y.clamp(bounds.y1, bounds.y2))
    }

    fn to_display_relative(&self, local: Rect) -> Rect {
        let global = local.offset(self.overlay_origin.x, self.overlay_origin.y);
        self.display.rect_to_local(global).normalized()
    }
}
