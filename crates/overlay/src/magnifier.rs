//! Magnified pixel preview around the pointer

use capture::display::display_at;
use capture::{DisplayInfo, FrameCaptureProvider, FrameData, Point, Rect};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use std::sync::Arc;
use std::thread;

/// Pixels captured on each side of the pointer
pub const ZOOM_RADIUS: i32 = 25;

/// Edge length of the square preview view
pub const PREVIEW_SIZE: u32 = 96;

/// Global rectangle to sample for the preview.
///
/// Uses whichever display holds the pointer (the first display when none
/// does) and clips the square to that display.
pub fn zoom_source(displays: &[DisplayInfo], pointer_global: Point) -> Option<Rect> {
    let display = display_at(displays, pointer_global).or_else(|| displays.first())?;
    let square = Rect::new(
        pointer_global.x - ZOOM_RADIUS,
        pointer_global.y - ZOOM_RADIUS,
        pointer_global.x + ZOOM_RADIUS,
        pointer_global.y + ZOOM_RADIUS,
    );
    square.intersection(&display.bounds()).filter(|r| !r.is_empty())
}

/// Scale a frame up to fit `size`x`size` with nearest-neighbour sampling,
/// keeping its aspect ratio so pixel edges stay crisp.
pub fn magnify(frame: &FrameData, size: u32) -> Option<FrameData> {
    if frame.is_empty() || size == 0 {
        return None;
    }

    let scale = (size as f64 / frame.width as f64).min(size as f64 / frame.height as f64);
    let width = ((frame.width as f64 * scale).round() as u32).clamp(1, size);
    let height = ((frame.height as f64 * scale).round() as u32).clamp(1, size);

    // Channel order does not matter to nearest-neighbour sampling
    let source: ImageBuffer<Rgba<u8>, &[u8]> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.data.as_slice())?;
    let scaled = imageops::resize(&source, width, height, FilterType::Nearest);

    Some(FrameData {
        data: scaled.into_raw(),
        width,
        height,
        timestamp: frame.timestamp,
    })
}

/// Latest preview available to the renderer
#[derive(Debug, Clone, Default)]
pub enum Preview {
    #[default]
    Empty,
    Ready(FrameData),
    /// Capture failed; draw a placeholder instead
    Placeholder,
}

/// Background capture for the preview.
///
/// The render tick never waits on it: requests made while a capture is in
/// flight are dropped, and results are collected with [`PreviewWorker::poll`].
pub struct PreviewWorker {
    request_tx: Option<Sender<Rect>>,
    result_rx: Receiver<Preview>,
    handle: Option<thread::JoinHandle<()>>,
    latest: Preview,
}

impl PreviewWorker {
    pub fn spawn(provider: Arc<dyn FrameCaptureProvider>, size: u32) -> Self {
        let (request_tx, request_rx) = bounded::<Rect>(1);
        let (result_tx, result_rx) = unbounded::<Preview>();

        let handle = thread::spawn(move || {
            for rect in request_rx {
                let preview = match provider.capture(rect) {
                    Ok(frame) => magnify(&frame, size).map_or(Preview::Placeholder, Preview::Ready),
                    Err(e) => {
                        log::debug!("Preview capture failed: {}", e);
                        Preview::Placeholder
                    }
                };
                if result_tx.send(preview).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx: Some(request_tx),
            result_rx,
            handle: Some(handle),
            latest: Preview::Empty,
        }
    }

    /// Ask for a new preview; returns false when the request was dropped
    pub fn request(&self, rect: Rect) -> bool {
        let Some(tx) = self.request_tx.as_ref() else {
            return false;
        };
        match tx.try_send(rect) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Collect finished captures and return the newest preview
    pub fn poll(&mut self) -> &Preview {
        while let Ok(preview) = self.result_rx.try_recv() {
            self.latest = preview;
        }
        &self.latest
    }

    pub fn latest(&self) -> &Preview {
        &self.latest
    }

    /// Show the placeholder without a capture, e.g. when no source exists
    pub fn set_placeholder(&mut self) {
        self.latest = Preview::Placeholder;
    }
}

impl Drop for PreviewWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        drop(self.request_tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
