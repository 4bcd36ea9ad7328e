//! Selection state machine for region dragging
//!
//! All mutation goes through [`SelectionState::transition`]; the overlay
//! window only feeds it pointer, key and tick inputs.

use capture::{Point, Rect};
use std::time::{Duration, Instant};

/// Minimum selection size on both axes
pub const MIN_SELECTION_SIZE: u32 = 5;

/// Grace period between releasing a drag and locking it in
pub const CONFIRM_DELAY: Duration = Duration::from_millis(500);

/// Selection progress, in overlay-local coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Button held; `current` follows the pointer
    Dragging { anchor: Point, current: Point },
    /// Drag finished, waiting out the confirm delay
    Pending { rect: Rect, released_at: Instant },
    Confirmed(Rect),
    Cancelled,
}

/// Input fed to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionInput {
    Press(Point),
    Move(Point),
    Release(Point),
    Escape,
    Tick,
}

impl SelectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionState::Confirmed(_) | SelectionState::Cancelled)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, SelectionState::Dragging { .. })
    }

    /// Rectangle to draw: the live drag or the finished one
    pub fn visible_rect(&self) -> Option<Rect> {
        match *self {
            SelectionState::Dragging { anchor, current } => Some(calc_selection_rect(anchor, current)),
            SelectionState::Pending { rect, .. } | SelectionState::Confirmed(rect) => Some(rect),
            SelectionState::Idle | SelectionState::Cancelled => None,
        }
    }

    /// Apply one input. Terminal states absorb everything.
    pub fn transition(self, input: SelectionInput, now: Instant) -> SelectionState {
        use SelectionInput as In;
        use SelectionState as S;

        match (self, input) {
            (S::Confirmed(_) | S::Cancelled, _) => self,

            (_, In::Escape) => S::Cancelled,

            // A new press while pending starts over and drops the pending rectangle
            (S::Idle | S::Pending { .. }, In::Press(pos)) => S::Dragging {
                anchor: pos,
                current: pos,
            },

            (S::Dragging { anchor, .. }, In::Move(pos)) => S::Dragging {
                anchor,
                current: pos,
            },

            (S::Dragging { anchor, .. }, In::Release(pos)) => {
                let rect = calc_selection_rect(anchor, pos);
                if is_valid_selection(&rect) {
                    S::Pending {
                        rect,
                        released_at: now,
                    }
                } else {
                    S::Idle
                }
            }

            (S::Pending { rect, released_at }, In::Tick)
                if now.saturating_duration_since(released_at) >= CONFIRM_DELAY =>
            {
                S::Confirmed(rect)
            }

            (state, _) => state,
        }
    }
}

/// Calculate selection rectangle from drag points
pub fn calc_selection_rect(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

/// Check if selection is large enough to keep
pub fn is_valid_selection(rect: &Rect) -> bool {
    rect.width() >= MIN_SELECTION_SIZE && rect.height() >= MIN_SELECTION_SIZE
}
