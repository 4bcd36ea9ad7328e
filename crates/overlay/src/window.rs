//! Overlay window implementation

use crate::{
    magnifier::{PreviewWorker, PREVIEW_SIZE},
    painter::Painter,
    render::{Backdrop, Scene},
    selector::RegionSelector,
    OverlayResult, SelectionOutcome,
};
use capture::{DisplayInfo, FrameCaptureProvider, FrameData, InputInjector, Point};
use once_cell::sync::OnceCell;
use std::cell::RefCell;
use std::mem::size_of;
use std::sync::Arc;
use std::time::Instant;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, EndPaint, InvalidateRect, UpdateWindow, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, VK_ESCAPE};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, KillTimer,
    LoadCursorW, RegisterClassExW, SetForegroundWindow, SetTimer, SetWindowDisplayAffinity,
    ShowWindow, TranslateMessage, CS_HREDRAW, CS_VREDRAW, IDC_CROSS, MSG, SW_SHOW,
    WDA_EXCLUDEFROMCAPTURE, WM_CAPTURECHANGED, WM_CLOSE, WM_DESTROY, WM_ERASEBKGND, WM_KEYDOWN,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_PAINT, WM_TIMER, WNDCLASSEXW,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

thread_local! {
    static OVERLAY_STATE: RefCell<Option<Box<OverlayState>>> = RefCell::new(None);
}

static CLASS_ATOM: OnceCell<u16> = OnceCell::new();

/// Background shown when the display snapshot fails
const FALLBACK_BACKGROUND: [u8; 4] = [32, 32, 32, 255];

struct OverlayState {
    selector: RegionSelector,
    painter: Option<Painter>,
    preview: PreviewWorker,
    injector: Arc<dyn InputInjector>,
    capture: Option<PointerCapture>,
    result: Option<SelectionOutcome>,
}

/// Mouse capture held for the duration of a drag
struct PointerCapture;

impl PointerCapture {
    fn acquire(hwnd: HWND) -> Self {
        unsafe {
            SetCapture(hwnd);
        }
        Self
    }

    /// Capture already went to another window; nothing to release
    fn forfeit(self) {
        std::mem::forget(self);
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        unsafe {
            let _ = ReleaseCapture();
        }
    }
}

/// Run `f` on the overlay state unless it is already borrowed further up
/// the stack (messages sent synchronously from inside a handler).
fn with_state<R>(f: impl FnOnce(&mut OverlayState) -> R) -> Option<R> {
    OVERLAY_STATE.with(|s| {
        let mut guard = s.try_borrow_mut().ok()?;
        guard.as_mut().map(|state| f(state))
    })
}

fn lparam_point(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

/// Overlay window for region selection
pub struct OverlayWindow;

impl OverlayWindow {
    const CLASS_NAME: PCWSTR = w!("PageSnapRegionSelector");
    const TIMER_ID: usize = 1;
    /// About 60 ticks per second
    const TICK_MS: u32 = 16;

    /// Show the selector on `displays[selected_index]` and block until the
    /// user confirms a region or cancels.
    pub fn show(
        displays: &[DisplayInfo],
        selected_index: usize,
        provider: Arc<dyn FrameCaptureProvider>,
        injector: Arc<dyn InputInjector>,
    ) -> OverlayResult<SelectionOutcome> {
        let selector = RegionSelector::open(displays, selected_index);
        let display = *selector.display();

        let snapshot = match provider.capture(display.bounds()) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Display snapshot failed, using plain background: {}", e);
                FrameData::filled(display.width, display.height, FALLBACK_BACKGROUND)
            }
        };
        // Shaded once here; paints only copy it
        let backdrop = Backdrop::new(&snapshot);
        drop(snapshot);

        let state = Box::new(OverlayState {
            selector,
            painter: None,
            preview: PreviewWorker::spawn(provider, PREVIEW_SIZE),
            injector,
            capture: None,
            result: None,
        });

        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);
            Self::register_class(hinstance)?;

            OVERLAY_STATE.with(|s| {
                *s.borrow_mut() = Some(state);
            });

            let hwnd = match CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                Self::CLASS_NAME,
                w!("PageSnap Selection"),
                WS_POPUP,
                display.left,
                display.top,
                display.width as i32,
                display.height as i32,
                None,
                None,
                hinstance,
                None,
            ) {
                Ok(hwnd) => hwnd,
                Err(e) => {
                    OVERLAY_STATE.with(|s| *s.borrow_mut() = None);
                    return Err(e.into());
                }
            };

            match Painter::new(hwnd, &backdrop) {
                Ok(painter) => {
                    with_state(|state| state.painter = Some(painter));
                }
                Err(e) => {
                    let _ = DestroyWindow(hwnd);
                    OVERLAY_STATE.with(|s| *s.borrow_mut() = None);
                    return Err(e);
                }
            }
            drop(backdrop);

            // Keep the overlay out of preview captures
            if let Err(e) = SetWindowDisplayAffinity(hwnd, WDA_EXCLUDEFROMCAPTURE) {
                log::warn!("Overlay may appear in preview: {}", e);
            }

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
            let _ = UpdateWindow(hwnd);
            SetTimer(hwnd, Self::TIMER_ID, Self::TICK_MS, None);

            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if !ret.as_bool() {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);

                let has_result = OVERLAY_STATE.with(|s| {
                    s.borrow().as_ref().map(|state| state.result.is_some()).unwrap_or(false)
                });
                if has_result {
                    break;
                }
            }

            let result = OVERLAY_STATE.with(|s| s.borrow_mut().take().and_then(|state| state.result));

            let _ = KillTimer(hwnd, Self::TIMER_ID);
            let _ = DestroyWindow(hwnd);

            Ok(result.unwrap_or(SelectionOutcome::Cancelled))
        }
    }

    unsafe fn register_class(hinstance: HINSTANCE) -> OverlayResult<()> {
        CLASS_ATOM.get_or_try_init(|| {
            let wc = WNDCLASSEXW {
                cbSize: size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(Self::wnd_proc),
                hInstance: hinstance,
                hCursor: LoadCursorW(None, IDC_CROSS)?,
                lpszClassName: Self::CLASS_NAME,
                ..Default::default()
            };
            match RegisterClassExW(&wc) {
                0 => Err(windows::core::Error::from_win32()),
                atom => Ok(atom),
            }
        })?;
        Ok(())
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_PAINT => {
                Self::paint(hwnd);
                LRESULT(0)
            }

            // Every pixel is repainted
            WM_ERASEBKGND => LRESULT(1),

            WM_TIMER if wparam.0 == Self::TIMER_ID => {
                Self::handle_tick(hwnd);
                LRESULT(0)
            }

            WM_LBUTTONDOWN => {
                let pos = lparam_point(lparam);
                with_state(|state| {
                    if state.selector.press(pos) {
                        state.capture = Some(PointerCapture::acquire(hwnd));
                    }
                });
                let _ = InvalidateRect(hwnd, None, false);
                LRESULT(0)
            }

            WM_MOUSEMOVE => {
                let pos = lparam_point(lparam);
                with_state(|state| state.selector.move_to(pos));
                let _ = InvalidateRect(hwnd, None, false);
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                let pos = lparam_point(lparam);
                with_state(|state| {
                    state.selector.release(pos, Instant::now());
                    state.capture = None;
                });
                let _ = InvalidateRect(hwnd, None, false);
                LRESULT(0)
            }

            // Lost to another window mid-drag; our own releases arrive while
            // the state is borrowed and are skipped
            WM_CAPTURECHANGED => {
                with_state(|state| {
                    if let Some(capture) = state.capture.take() {
                        capture.forfeit();
                        state.selector.capture_lost(Instant::now());
                    }
                });
                let _ = InvalidateRect(hwnd, None, false);
                LRESULT(0)
            }

            WM_KEYDOWN if wparam.0 == VK_ESCAPE.0 as usize => {
                if let Some(Some(event)) = with_state(|state| state.selector.cancel()) {
                    Self::finish(hwnd, event.into());
                }
                LRESULT(0)
            }

            WM_CLOSE => {
                let _ = with_state(|state| state.selector.cancel());
                Self::finish(hwnd, SelectionOutcome::Cancelled);
                LRESULT(0)
            }

            WM_DESTROY => LRESULT(0),

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    unsafe fn handle_tick(hwnd: HWND) {
        let event = with_state(|state| {
            let pointer = match state.injector.pointer_position() {
                Ok(p) => Some(p),
                Err(e) => {
                    log::debug!("Pointer query failed: {}", e);
                    None
                }
            };
            let event = state.selector.tick(Instant::now(), pointer);

            match state.selector.preview_source() {
                Some(rect) => {
                    state.preview.request(rect);
                }
                None => state.preview.set_placeholder(),
            }
            state.preview.poll();
            event
        })
        .flatten();

        let _ = InvalidateRect(hwnd, None, false);
        if let Some(event) = event {
            Self::finish(hwnd, event.into());
        }
    }

    /// Record the outcome and tear the window down; only the first outcome sticks
    unsafe fn finish(hwnd: HWND, outcome: SelectionOutcome) {
        with_state(|state| {
            state.capture = None;
            if state.result.is_none() {
                state.result = Some(outcome);
            }
        });
        let _ = KillTimer(hwnd, Self::TIMER_ID);
        let _ = DestroyWindow(hwnd);
    }

    unsafe fn paint(hwnd: HWND) {
        let mut ps = PAINTSTRUCT::default();
        let hdc = BeginPaint(hwnd, &mut ps);
        with_state(|state| {
            if let Some(painter) = &state.painter {
                let scene = Scene::layout(&state.selector);
                painter.paint(hdc, &scene, state.preview.latest(), &state.selector.status());
            }
        });
        let _ = EndPaint(hwnd, &ps);
    }
}
