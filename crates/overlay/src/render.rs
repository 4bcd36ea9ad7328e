//! Overlay layout and backdrop
//!
//! The frozen snapshot is dimmed once per overlay session into a
//! [`Backdrop`]. Each paint only lays out a [`Scene`] of rectangles, which
//! the window draws with GDI on top of the cached backdrop bitmaps.

use crate::magnifier::PREVIEW_SIZE;
use crate::selector::RegionSelector;
use capture::{FrameData, Point, Rect};

/// BGRA colour
pub type Color = [u8; 4];

pub const ACCENT: Color = [227, 113, 0, 255];
pub const PANEL_FILL: Color = [40, 40, 40, 255];
pub const PANEL_BORDER: Color = [0x55, 0x55, 0x55, 255];
pub const PREVIEW_FILL: Color = [60, 60, 60, 255];
pub const WHITE: Color = [255, 255, 255, 255];
const BLACK: Color = [0, 0, 0, 255];

const DIM_ALPHA: u8 = 30;
const SELECTION_FILL_ALPHA: u8 = 30;
pub const SELECTION_BORDER: i32 = 2;
pub const HANDLE_SIZE: i32 = 6;
pub const PREVIEW_BORDER: i32 = 2;

/// Panel padding around text and preview
pub const PANEL_PADDING: i32 = 10;
pub const TEXT_LINE_HEIGHT: i32 = 18;

/// Frame of the magnified preview inside the panel, border included
pub fn preview_frame(panel: Rect) -> Rect {
    let edge = PREVIEW_SIZE + 2 * PREVIEW_BORDER as u32;
    Rect::from_origin_size(
        panel.x1 + PANEL_PADDING,
        panel.y2 - PANEL_PADDING - edge as i32,
        edge,
        edge,
    )
}

/// Where the panel's n-th text line starts
pub fn text_line_origin(panel: Rect, line: usize) -> Point {
    Point::new(
        panel.x1 + PANEL_PADDING,
        panel.y1 + PANEL_PADDING + line as i32 * TEXT_LINE_HEIGHT,
    )
}

/// Snapshot shades shown behind the selector.
///
/// `dimmed` covers the whole overlay; `tinted` is the same image with the
/// selection fill applied, so the live selection is a copy of a sub-rectangle
/// rather than a per-frame blend.
#[derive(Debug, Clone)]
pub struct Backdrop {
    dimmed: FrameData,
    tinted: FrameData,
}

impl Backdrop {
    pub fn new(snapshot: &FrameData) -> Self {
        let dimmed = shade(snapshot, BLACK, DIM_ALPHA);
        let tinted = shade(&dimmed, ACCENT, SELECTION_FILL_ALPHA);
        Self { dimmed, tinted }
    }

    pub fn dimmed(&self) -> &FrameData {
        &self.dimmed
    }

    pub fn tinted(&self) -> &FrameData {
        &self.tinted
    }

    pub fn size(&self) -> (u32, u32) {
        (self.dimmed.width, self.dimmed.height)
    }
}

/// Blend `color` over every pixel through per-channel lookup tables
fn shade(frame: &FrameData, color: Color, alpha: u8) -> FrameData {
    let a = alpha as u32;
    let tables: [[u8; 256]; 3] = std::array::from_fn(|c| {
        std::array::from_fn(|dst| ((color[c] as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8)
    });

    let mut data = frame.data.clone();
    for px in data.chunks_exact_mut(FrameData::BYTES_PER_PIXEL) {
        px[0] = tables[0][px[0] as usize];
        px[1] = tables[1][px[1] as usize];
        px[2] = tables[2][px[2] as usize];
        px[3] = 255;
    }

    FrameData {
        data,
        width: frame.width,
        height: frame.height,
        timestamp: frame.timestamp,
    }
}

/// Everything one paint draws, in overlay-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub crosshair: Point,
    pub selection: Option<Rect>,
    pub panel: Rect,
    /// Preview border, outer edge
    pub preview_frame: Rect,
    /// Area inside the preview border
    pub preview_view: Rect,
}

impl Scene {
    pub fn layout(selector: &RegionSelector) -> Self {
        let (width, height) = selector.overlay_size();
        let panel = selector.panel();
        let frame = preview_frame(panel);
        Self {
            width,
            height,
            crosshair: selector.pointer(),
            selection: selector.state().visible_rect(),
            panel,
            preview_frame: frame,
            preview_view: Rect::new(
                frame.x1 + PREVIEW_BORDER,
                frame.y1 + PREVIEW_BORDER,
                frame.x2 - PREVIEW_BORDER,
                frame.y2 - PREVIEW_BORDER,
            ),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(0, 0, self.width, self.height)
    }

    /// Selection clipped to the overlay, for copying the tinted backdrop
    pub fn selection_fill(&self) -> Option<Rect> {
        self.selection?.intersection(&self.bounds())
    }

    /// Square handles centred on the selection corners
    pub fn handles(&self) -> Option<[Rect; 4]> {
        let rect = self.selection?;
        let half = HANDLE_SIZE / 2;
        let handle = |x: i32, y: i32| Rect::new(x - half, y - half, x + half, y + half);
        Some([
            handle(rect.x1, rect.y1),
            handle(rect.x2, rect.y1),
            handle(rect.x1, rect.y2),
            handle(rect.x2, rect.y2),
        ])
    }

    /// Top-left for a preview image, centred when smaller than the view
    pub fn preview_origin(&self, image: &FrameData) -> Point {
        let view = self.preview_view;
        Point::new(
            view.x1 + (view.width() as i32 - image.width as i32).max(0) / 2,
            view.y1 + (view.height() as i32 - image.height as i32).max(0) / 2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PANEL_HEIGHT, PANEL_WIDTH};
    use capture::DisplayInfo;
    use std::time::{Duration, Instant};

    #[test]
    fn backdrop_dims_and_tints_once() {
        let snapshot = FrameData::filled(4, 2, WHITE);
        let backdrop = Backdrop::new(&snapshot);
        assert_eq!(backdrop.size(), (4, 2));

        let dimmed = backdrop.dimmed().pixel(3, 1).unwrap();
        assert_eq!(dimmed, [225, 225, 225, 255]);

        let tinted = backdrop.tinted().pixel(0, 0).unwrap();
        // Blue channel pulls toward the accent, red toward zero
        assert!(tinted[0] > 220 && tinted[2] < dimmed[2], "{tinted:?}");
        // Source untouched
        assert_eq!(snapshot.pixel(0, 0), Some(WHITE));
    }

    #[test]
    fn scene_tracks_crosshair_selection_and_panel() {
        let displays = [DisplayInfo::new(0, 0, 0, 800, 600)];
        let mut selector = RegionSelector::open(&displays, 0);
        selector.pointer_moved(Point::new(400, 500));
        assert!(selector.press(Point::new(100, 100)));
        selector.move_to(Point::new(300, 200));

        let scene = Scene::layout(&selector);
        assert_eq!(scene.crosshair, Point::new(300, 200));
        assert_eq!(scene.selection, Some(Rect::new(100, 100, 300, 200)));
        assert_eq!(scene.selection_fill(), scene.selection);
        let handles = scene.handles().unwrap();
        assert_eq!(handles[0], Rect::new(97, 97, 103, 103));
        assert_eq!(handles[3], Rect::new(297, 197, 303, 203));

        assert_eq!((scene.panel.width(), scene.panel.height()), (PANEL_WIDTH, PANEL_HEIGHT));
        assert!(!scene.panel.contains(scene.crosshair));
        assert_eq!(scene.preview_view.width(), PREVIEW_SIZE);
    }

    #[test]
    fn idle_scene_has_no_selection() {
        let selector = RegionSelector::open(&[DisplayInfo::fallback()], 0);
        let scene = Scene::layout(&selector);
        assert_eq!(scene.selection, None);
        assert_eq!(scene.handles(), None);
        assert_eq!(scene.bounds(), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn small_preview_is_centred_in_view() {
        let selector = RegionSelector::open(&[DisplayInfo::fallback()], 0);
        let scene = Scene::layout(&selector);
        let image = FrameData::filled(PREVIEW_SIZE, PREVIEW_SIZE / 2, WHITE);
        let at = scene.preview_origin(&image);
        assert_eq!(at.x, scene.preview_view.x1);
        assert_eq!(at.y, scene.preview_view.y1 + PREVIEW_SIZE as i32 / 4);
    }

    #[test]
    fn per_tick_layout_does_no_frame_sized_work() {
        // 4K selector: the backdrop is built once, each tick only lays out rectangles
        let displays = [DisplayInfo::new(0, 0, 0, 3840, 2160)];
        let mut selector = RegionSelector::open(&displays, 0);
        assert!(selector.press(Point::new(100, 100)));

        let started = Instant::now();
        for i in 0..60 {
            selector.move_to(Point::new(200 + i, 300 + i));
            let scene = Scene::layout(&selector);
            assert!(scene.selection.is_some());
        }
        assert!(started.elapsed() < Duration::from_millis(16), "{:?}", started.elapsed());
    }

    #[test]
    fn preview_frame_fits_inside_panel() {
        let panel = Rect::from_origin_size(0, 0, PANEL_WIDTH, PANEL_HEIGHT);
        let frame = preview_frame(panel);
        assert_eq!(frame.width(), PREVIEW_SIZE + 4);
        assert!(frame.y1 > text_line_origin(panel, 3).y + TEXT_LINE_HEIGHT);
        assert!(frame.y2 <= panel.y2 && frame.x2 <= panel.x2);
    }
}
