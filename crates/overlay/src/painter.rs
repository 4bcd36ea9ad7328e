//! GDI drawing for the overlay window
//!
//! The dimmed and tinted backdrops are uploaded to memory bitmaps once when
//! the window opens. A paint copies the dimmed one into a back buffer, draws
//! the scene on top with pens and brushes, and copies the result out.

use crate::magnifier::Preview;
use crate::panel::StatusText;
use crate::render::{
    text_line_origin, Backdrop, Color, Scene, ACCENT, PANEL_BORDER, PANEL_FILL, PREVIEW_FILL,
    SELECTION_BORDER, WHITE,
};
use crate::OverlayResult;
use capture::{FrameData, Point, Rect};
use std::mem::size_of;
use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreatePen, CreateSolidBrush, DeleteDC,
    DeleteObject, FillRect, GetDC, GetStockObject, LineTo, MoveToEx, Rectangle, ReleaseDC,
    SelectObject, SetBkMode, SetDIBitsToDevice, SetTextColor, TextOutW, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ, HPEN, NULL_BRUSH, PEN_STYLE,
    PS_DOT, PS_SOLID, SRCCOPY, TRANSPARENT,
};

/// BGRA to GDI's 0x00BBGGRR
fn colorref(color: Color) -> COLORREF {
    COLORREF(color[2] as u32 | (color[1] as u32) << 8 | (color[0] as u32) << 16)
}

fn win_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.x1,
        top: rect.y1,
        right: rect.x2,
        bottom: rect.y2,
    }
}

/// Memory DC with its own bitmap selected
struct MemorySurface {
    dc: HDC,
    bitmap: HBITMAP,
    old_bitmap: HGDIOBJ,
}

impl MemorySurface {
    unsafe fn new(reference: HDC, width: u32, height: u32) -> OverlayResult<Self> {
        let dc = CreateCompatibleDC(reference);
        if dc.is_invalid() {
            return Err(windows::core::Error::from_win32().into());
        }
        let bitmap = CreateCompatibleBitmap(reference, width as i32, height as i32);
        if bitmap.is_invalid() {
            let _ = DeleteDC(dc);
            return Err(windows::core::Error::from_win32().into());
        }
        let old_bitmap = SelectObject(dc, bitmap);
        Ok(Self {
            dc,
            bitmap,
            old_bitmap,
        })
    }

    unsafe fn from_frame(reference: HDC, frame: &FrameData) -> OverlayResult<Self> {
        let surface = Self::new(reference, frame.width, frame.height)?;
        draw_frame(surface.dc, frame, Point::new(0, 0));
        Ok(surface)
    }
}

impl Drop for MemorySurface {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.old_bitmap);
            let _ = DeleteObject(self.bitmap);
            let _ = DeleteDC(self.dc);
        }
    }
}

/// Pen selected with a hollow brush until dropped
struct Outline {
    dc: HDC,
    pen: HPEN,
    old_pen: HGDIOBJ,
    old_brush: HGDIOBJ,
}

impl Outline {
    unsafe fn select(dc: HDC, style: PEN_STYLE, width: i32, color: Color) -> Self {
        let pen = CreatePen(style, width, colorref(color));
        let old_pen = SelectObject(dc, pen);
        let old_brush = SelectObject(dc, GetStockObject(NULL_BRUSH));
        Self {
            dc,
            pen,
            old_pen,
            old_brush,
        }
    }

    unsafe fn line(&self, from: Point, to: Point) {
        let _ = MoveToEx(self.dc, from.x, from.y, None);
        let _ = LineTo(self.dc, to.x, to.y);
    }
}

impl Drop for Outline {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.old_brush);
            SelectObject(self.dc, self.old_pen);
            let _ = DeleteObject(self.pen);
        }
    }
}

unsafe fn fill(dc: HDC, rect: Rect, color: Color) {
    let brush = CreateSolidBrush(colorref(color));
    FillRect(dc, &win_rect(rect), brush);
    let _ = DeleteObject(brush);
}

/// Copy a BGRA frame into `dc` with its top-left at `at`
unsafe fn draw_frame(dc: HDC, frame: &FrameData, at: Point) {
    let width = frame.width as i32;
    let height = frame.height as i32;

    let bmi = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height, // Top-down
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        bmiColors: [Default::default()],
    };

    SetDIBitsToDevice(
        dc,
        at.x,
        at.y,
        frame.width,
        frame.height,
        0,
        0,
        0,
        frame.height,
        frame.data.as_ptr() as *const _,
        &bmi,
        DIB_RGB_COLORS,
    );
}

/// Cached bitmaps for one overlay window
pub struct Painter {
    back: MemorySurface,
    dimmed: MemorySurface,
    tinted: MemorySurface,
    width: i32,
    height: i32,
}

impl Painter {
    pub unsafe fn new(hwnd: HWND, backdrop: &Backdrop) -> OverlayResult<Self> {
        let window_dc = GetDC(hwnd);
        if window_dc.is_invalid() {
            return Err(windows::core::Error::from_win32().into());
        }
        let painter = Self::upload(window_dc, backdrop);
        ReleaseDC(hwnd, window_dc);
        painter
    }

    unsafe fn upload(window_dc: HDC, backdrop: &Backdrop) -> OverlayResult<Self> {
        let (width, height) = backdrop.size();
        Ok(Self {
            back: MemorySurface::new(window_dc, width, height)?,
            dimmed: MemorySurface::from_frame(window_dc, backdrop.dimmed())?,
            tinted: MemorySurface::from_frame(window_dc, backdrop.tinted())?,
            width: width as i32,
            height: height as i32,
        })
    }

    pub unsafe fn paint(&self, hdc: HDC, scene: &Scene, preview: &Preview, status: &StatusText) {
        let dc = self.back.dc;
        let _ = BitBlt(dc, 0, 0, self.width, self.height, self.dimmed.dc, 0, 0, SRCCOPY);

        self.draw_crosshair(dc, scene.crosshair);
        if let Some(rect) = scene.selection {
            self.draw_selection(dc, scene, rect);
        }
        self.draw_panel(dc, scene, preview, status);

        let _ = BitBlt(hdc, 0, 0, self.width, self.height, dc, 0, 0, SRCCOPY);
    }

    unsafe fn draw_crosshair(&self, dc: HDC, at: Point) {
        SetBkMode(dc, TRANSPARENT);
        let pen = Outline::select(dc, PS_DOT, 1, ACCENT);
        pen.line(Point::new(at.x, 0), Point::new(at.x, self.height));
        pen.line(Point::new(0, at.y), Point::new(self.width, at.y));
    }

    unsafe fn draw_selection(&self, dc: HDC, scene: &Scene, rect: Rect) {
        if let Some(area) = scene.selection_fill() {
            let _ = BitBlt(
                dc,
                area.x1,
                area.y1,
                area.width() as i32,
                area.height() as i32,
                self.tinted.dc,
                area.x1,
                area.y1,
                SRCCOPY,
            );
        }

        {
            let _pen = Outline::select(dc, PS_SOLID, SELECTION_BORDER, ACCENT);
            let _ = Rectangle(dc, rect.x1, rect.y1, rect.x2, rect.y2);
        }

        for handle in scene.handles().into_iter().flatten() {
            fill(dc, handle, ACCENT);
        }
    }

    unsafe fn draw_panel(&self, dc: HDC, scene: &Scene, preview: &Preview, status: &StatusText) {
        let panel = scene.panel;
        fill(dc, panel, PANEL_BORDER);
        fill(dc, Rect::new(panel.x1 + 1, panel.y1 + 1, panel.x2 - 1, panel.y2 - 1), PANEL_FILL);

        let view = scene.preview_view;
        fill(dc, scene.preview_frame, ACCENT);
        fill(dc, view, PREVIEW_FILL);

        match preview {
            Preview::Ready(image) => draw_frame(dc, image, scene.preview_origin(image)),
            Preview::Placeholder => {
                // Cross through the view marks a failed capture
                let pen = Outline::select(dc, PS_SOLID, 1, WHITE);
                pen.line(view.top_left(), Point::new(view.x2, view.y2));
                pen.line(Point::new(view.x2 - 1, view.y1), Point::new(view.x1 - 1, view.y2));
            }
            Preview::Empty => {}
        }

        SetBkMode(dc, TRANSPARENT);
        SetTextColor(dc, colorref(WHITE));
        for (i, line) in status.lines().iter().enumerate() {
            let origin = text_line_origin(panel, i);
            let wide: Vec<u16> = line.encode_utf16().collect();
            let _ = TextOutW(dc, origin.x, origin.y, &wide);
        }
    }
}
