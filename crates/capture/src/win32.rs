//! GDI screen capture, monitor enumeration and SendInput page turning

use crate::{
    AdvanceKey, CaptureError, CaptureResult, DisplayInfo, DisplayRegistry, FrameCaptureProvider,
    FrameData, InjectorError, InputInjector, Point, Rect,
};
use std::mem::size_of;
use windows::Win32::Foundation::{BOOL, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, EnumDisplayMonitors,
    GetDC, GetDIBits, GetMonitorInfoW, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, DIB_RGB_COLORS, HDC, HMONITOR, MONITORINFO, SRCCOPY,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY,
    KEYEVENTF_KEYUP, VIRTUAL_KEY, VK_DOWN, VK_NEXT, VK_RIGHT, VK_SPACE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

/// Virtual desktop bounds in global coordinates
pub fn virtual_desktop_rect() -> Rect {
    unsafe {
        Rect::from_origin_size(
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN).max(0) as u32,
            GetSystemMetrics(SM_CYVIRTUALSCREEN).max(0) as u32,
        )
    }
}

/// Monitors in `EnumDisplayMonitors` order
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiDisplayRegistry;

impl DisplayRegistry for GdiDisplayRegistry {
    fn list(&self) -> CaptureResult<Vec<DisplayInfo>> {
        let mut displays: Vec<DisplayInfo> = Vec::new();

        unsafe {
            let ok = EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(enum_monitor_callback),
                LPARAM(&mut displays as *mut Vec<DisplayInfo> as isize),
            );
            if !ok.as_bool() {
                return Err(CaptureError::Gdi("EnumDisplayMonitors failed".into()));
            }
        }

        if displays.is_empty() {
            return Err(CaptureError::NoDisplays);
        }
        log::debug!("Found {} display(s)", displays.len());
        Ok(displays)
    }
}

unsafe extern "system" fn enum_monitor_callback(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let displays = &mut *(lparam.0 as *mut Vec<DisplayInfo>);

    let mut mi = MONITORINFO {
        cbSize: size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    if GetMonitorInfoW(hmonitor, &mut mi).as_bool() {
        let rc = mi.rcMonitor;
        displays.push(DisplayInfo::new(
            displays.len(),
            rc.left,
            rc.top,
            (rc.right - rc.left).max(0) as u32,
            (rc.bottom - rc.top).max(0) as u32,
        ));
    }

    BOOL(1) // Continue enumeration
}

/// BitBlt-based capture of a global rectangle
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiCaptureProvider;

impl FrameCaptureProvider for GdiCaptureProvider {
    fn capture(&self, rect: Rect) -> CaptureResult<FrameData> {
        let rect = rect.normalized();
        if rect.is_empty() {
            return Err(CaptureError::EmptyRegion(rect));
        }
        if !virtual_desktop_rect().intersects(&rect) {
            return Err(CaptureError::OffScreen(rect));
        }

        let width = rect.width() as i32;
        let height = rect.height() as i32;

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(CaptureError::Gdi("Failed to get screen DC".into()));
            }

            let mem_dc = CreateCompatibleDC(screen_dc);
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            let old_bitmap = SelectObject(mem_dc, bitmap);

            let blit = BitBlt(mem_dc, 0, 0, width, height, screen_dc, rect.x1, rect.y1, SRCCOPY);

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                bmiColors: [Default::default()],
            };

            let mut data = vec![0u8; width as usize * height as usize * FrameData::BYTES_PER_PIXEL];
            let lines = if blit.is_ok() {
                GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    height as u32,
                    Some(data.as_mut_ptr() as *mut _),
                    &mut bmi,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);

            blit?;
            if lines == 0 {
                return Err(CaptureError::Gdi("GetDIBits returned no scan lines".into()));
            }

            // GDI leaves the alpha byte undefined
            for px in data.chunks_exact_mut(4) {
                px[3] = 255;
            }

            FrameData::new(data, width as u32, height as u32)
        }
    }
}

/// Keyboard page turner built on `SendInput`
#[derive(Debug, Default, Clone, Copy)]
pub struct SendInputInjector {
    key: AdvanceKey,
}

impl SendInputInjector {
    pub fn new(key: AdvanceKey) -> Self {
        Self { key }
    }

    fn virtual_key(&self) -> (VIRTUAL_KEY, bool) {
        match self.key {
            AdvanceKey::Right => (VK_RIGHT, true),
            AdvanceKey::Down => (VK_DOWN, true),
            AdvanceKey::PageDown => (VK_NEXT, true),
            AdvanceKey::Space => (VK_SPACE, false),
        }
    }

    fn key_input(vk: VIRTUAL_KEY, flags: KEYBD_EVENT_FLAGS) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }
}

impl InputInjector for SendInputInjector {
    fn press_advance_key(&self) -> Result<(), InjectorError> {
        let (vk, extended) = self.virtual_key();
        let base = if extended {
            KEYEVENTF_EXTENDEDKEY
        } else {
            KEYBD_EVENT_FLAGS(0)
        };
        let inputs = [
            Self::key_input(vk, base),
            Self::key_input(vk, base | KEYEVENTF_KEYUP),
        ];

        let sent = unsafe { SendInput(&inputs, size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(InjectorError::Partial {
                sent,
                expected: inputs.len() as u32,
            });
        }
        Ok(())
    }

    fn pointer_position(&self) -> Result<Point, InjectorError> {
        let mut pt = POINT::default();
        unsafe { GetCursorPos(&mut pt)? };
        Ok(Point::new(pt.x, pt.y))
    }
}
