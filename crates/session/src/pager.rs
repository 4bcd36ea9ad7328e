//! Paging capture loop
//!
//! A worker thread runs the capture, advance, wait cycle once per page and
//! reports back over a channel. Page numbering is always dense: a page whose
//! capture fails still advances the viewer and still reports progress, it is
//! just missing from the frame store.

use crate::{SessionError, SessionResult};
use capture::{FrameCaptureProvider, InputInjector, Rect};
use crossbeam_channel::{unbounded, Receiver, Sender};
use export::FrameStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Region to capture (global coordinates)
    pub rect: Rect,
    pub page_count: u32,
    /// Wait after each page advance
    pub delay: Duration,
    /// Wait before the first page so the viewer can regain focus
    pub lead_in: Duration,
}

impl CaptureRequest {
    pub fn new(rect: Rect, page_count: u32, delay: Duration) -> Self {
        Self {
            rect,
            page_count,
            delay,
            lead_in: Duration::ZERO,
        }
    }

    pub fn with_lead_in(mut self, lead_in: Duration) -> Self {
        self.lead_in = lead_in;
        self
    }
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_total: u32,
    pub pages_stored: u32,
    pub pages_skipped: u32,
    pub advance_failures: u32,
}

/// Events sent from the worker, in order.
///
/// `Progress` pages strictly increase from 1; exactly one of `Completed` or
/// `Cancelled` ends the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerEvent {
    Progress(u32),
    Completed(RunSummary),
    Cancelled(RunSummary),
}

impl PagerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PagerEvent::Progress(_))
    }
}

/// Starts capture runs against a fixed set of collaborators
#[derive(Clone)]
pub struct PagingCaptureLoop {
    provider: Arc<dyn FrameCaptureProvider>,
    injector: Arc<dyn InputInjector>,
    store: Arc<dyn FrameStore>,
}

impl PagingCaptureLoop {
    pub fn new(
        provider: Arc<dyn FrameCaptureProvider>,
        injector: Arc<dyn InputInjector>,
        store: Arc<dyn FrameStore>,
    ) -> Self {
        Self {
            provider,
            injector,
            store,
        }
    }

    /// Spawn the worker for one run
    pub fn start(&self, request: CaptureRequest) -> SessionResult<PagerHandle> {
        if request.page_count == 0 {
            return Err(SessionError::NoPages);
        }

        let (event_tx, event_rx) = unbounded::<PagerEvent>();
        let cancel = Arc::new(AtomicBool::new(false));

        let worker = PageWorker {
            provider: self.provider.clone(),
            injector: self.injector.clone(),
            store: self.store.clone(),
            cancel: cancel.clone(),
            events: event_tx,
        };

        let handle = thread::Builder::new()
            .name("pagesnap-pager".into())
            .spawn(move || worker.run(request))?;

        Ok(PagerHandle {
            events: event_rx,
            cancel,
            handle: Some(handle),
        })
    }
}

/// Handle to a running worker. Dropping it cancels and joins the run.
pub struct PagerHandle {
    events: Receiver<PagerEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PagerHandle {
    pub fn events(&self) -> &Receiver<PagerEvent> {
        &self.events
    }

    /// Ask the worker to stop before its next page
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Wait for the worker; `Err` carries its panic payload
    pub fn join(mut self) -> thread::Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Drop for PagerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel();
            let _ = handle.join();
        }
    }
}

struct PageWorker {
    provider: Arc<dyn FrameCaptureProvider>,
    injector: Arc<dyn InputInjector>,
    store: Arc<dyn FrameStore>,
    cancel: Arc<AtomicBool>,
    events: Sender<PagerEvent>,
}

impl PageWorker {
    fn run(self, request: CaptureRequest) {
        let CaptureRequest {
            rect,
            page_count,
            delay,
            lead_in,
        } = request;

        log::info!(
            "Capturing {} page(s) of ({}, {}) to ({}, {}), {}ms between pages",
            page_count,
            rect.x1,
            rect.y1,
            rect.x2,
            rect.y2,
            delay.as_millis()
        );

        if !lead_in.is_zero() {
            thread::sleep(lead_in);
        }

        let mut summary = RunSummary {
            pages_total: page_count,
            ..Default::default()
        };

        for page in 1..=page_count {
            if self.cancel.load(Ordering::SeqCst) {
                log::info!("Capture cancelled after {} of {} page(s)", page - 1, page_count);
                let _ = self.events.send(PagerEvent::Cancelled(summary));
                return;
            }

            if self.capture_page(page, rect) {
                summary.pages_stored += 1;
            } else {
                summary.pages_skipped += 1;
            }

            // Capture must finish before the viewer moves on
            if let Err(e) = self.injector.press_advance_key() {
                log::warn!("Page {}: advance key failed: {}", page, e);
                summary.advance_failures += 1;
            }

            if !delay.is_zero() {
                thread::sleep(delay);
            }

            if self.events.send(PagerEvent::Progress(page)).is_err() {
                log::debug!("Progress receiver gone, stopping capture");
                return;
            }
        }

        log::info!(
            "Capture finished: {} stored, {} skipped, {} advance failure(s)",
            summary.pages_stored,
            summary.pages_skipped,
            summary.advance_failures
        );
        let _ = self.events.send(PagerEvent::Completed(summary));
    }

    /// Capture and store one page; false when the page was skipped
    fn capture_page(&self, page: u32, rect: Rect) -> bool {
        if rect.is_empty() {
            log::warn!("Page {}: region has no area, skipping capture", page);
            return false;
        }

        let frame = match self.provider.capture(rect) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Page {}: capture failed: {}", page, e);
                return false;
            }
        };

        match self.store.save(page, &frame) {
            Ok(path) => {
                log::debug!("Page {} saved to {}", page, path.display());
                true
            }
            Err(e) => {
                log::warn!("Page {}: store failed: {}", page, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{CaptureResult, FrameData, InjectorError, Point};
    use export::ExportResult;
    use std::path::PathBuf;

    struct Blank;

    impl FrameCaptureProvider for Blank {
        fn capture(&self, rect: Rect) -> CaptureResult<FrameData> {
            Ok(FrameData::filled(rect.width(), rect.height(), [0, 0, 0, 255]))
        }
    }

    impl InputInjector for Blank {
        fn press_advance_key(&self) -> Result<(), InjectorError> {
            Ok(())
        }

        fn pointer_position(&self) -> Result<Point, InjectorError> {
            Ok(Point::default())
        }
    }

    impl FrameStore for Blank {
        fn save(&self, page_index: u32, _frame: &FrameData) -> ExportResult<PathBuf> {
            Ok(PathBuf::from(format!("page_{page_index}")))
        }
    }

    fn pager() -> PagingCaptureLoop {
        PagingCaptureLoop::new(Arc::new(Blank), Arc::new(Blank), Arc::new(Blank))
    }

    #[test]
    fn zero_pages_is_rejected() {
        let request = CaptureRequest::new(Rect::new(0, 0, 10, 10), 0, Duration::ZERO);
        assert!(matches!(pager().start(request), Err(SessionError::NoPages)));
    }

    #[test]
    fn single_page_run_completes() {
        let request = CaptureRequest::new(Rect::new(0, 0, 10, 10), 1, Duration::ZERO);
        let handle = pager().start(request).unwrap();
        let events: Vec<_> = handle.events().iter().collect();
        assert_eq!(
            events,
            vec![
                PagerEvent::Progress(1),
                PagerEvent::Completed(RunSummary {
                    pages_total: 1,
                    pages_stored: 1,
                    ..Default::default()
                }),
            ]
        );
        assert!(handle.join().is_ok());
    }

    #[test]
    fn lead_in_is_applied_once() {
        let request = CaptureRequest::new(Rect::new(0, 0, 10, 10), 2, Duration::ZERO)
            .with_lead_in(Duration::from_millis(30));
        let started = std::time::Instant::now();
        let handle = pager().start(request).unwrap();
        assert_eq!(handle.events().iter().count(), 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
