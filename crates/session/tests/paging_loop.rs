use capture::{
    CaptureError, CaptureResult, DisplayInfo, FrameCaptureProvider, FrameData, InjectorError,
    InputInjector, Point, Rect,
};
use export::{collect_pages, ExportResult, FrameStore, PngFrameStore};
use parking_lot::Mutex;
use session::{
    CaptureRequest, PagerEvent, PagingCaptureLoop, RunSummary, SessionController, SessionError,
    SessionStatus,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Capture(Rect),
    Save(u32),
    Advance,
}

type CallLog = Arc<Mutex<Vec<Call>>>;

/// Provider, injector and store writing to one shared log
struct Recorder {
    log: CallLog,
    fail_pages: Vec<u32>,
    fail_advance: bool,
    panic_on_capture: bool,
}

impl Recorder {
    fn new() -> Arc<Self> {
        Arc::new(Self::with_log(CallLog::default()))
    }

    fn with_log(log: CallLog) -> Self {
        Self {
            log,
            fail_pages: Vec::new(),
            fail_advance: false,
            panic_on_capture: false,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.log.lock().clone()
    }

    fn count(&self, call: &Call) -> usize {
        self.log.lock().iter().filter(|c| *c == call).count()
    }

    fn advances(&self) -> usize {
        self.count(&Call::Advance)
    }

    /// Page being captured, counting from 1
    fn current_page(&self) -> u32 {
        self.log
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Capture(_)))
            .count() as u32
    }
}

impl FrameCaptureProvider for Recorder {
    fn capture(&self, rect: Rect) -> CaptureResult<FrameData> {
        if self.panic_on_capture {
            panic!("capture backend crashed");
        }
        self.log.lock().push(Call::Capture(rect));
        if self.fail_pages.contains(&self.current_page()) {
            return Err(CaptureError::OffScreen(rect));
        }
        Ok(FrameData::filled(rect.width().min(8), rect.height().min(8), [10, 20, 30, 255]))
    }
}

impl InputInjector for Recorder {
    fn press_advance_key(&self) -> Result<(), InjectorError> {
        self.log.lock().push(Call::Advance);
        if self.fail_advance {
            return Err(InjectorError::Unavailable("no foreground window".into()));
        }
        Ok(())
    }

    fn pointer_position(&self) -> Result<Point, InjectorError> {
        Ok(Point::new(0, 0))
    }
}

impl FrameStore for Recorder {
    fn save(&self, page_index: u32, _frame: &FrameData) -> ExportResult<PathBuf> {
        self.log.lock().push(Call::Save(page_index));
        Ok(PathBuf::from(format!("page_{page_index}")))
    }
}

fn pager(rec: &Arc<Recorder>) -> PagingCaptureLoop {
    PagingCaptureLoop::new(rec.clone(), rec.clone(), rec.clone())
}

fn drain(controller: &mut SessionController) -> Vec<PagerEvent> {
    let mut events = Vec::new();
    while controller.is_running() {
        if let Some(event) = controller.wait_event(Duration::from_secs(10)) {
            events.push(event);
        }
    }
    events
}

#[test]
fn three_pages_report_progress_in_order_then_complete() {
    let rec = Recorder::new();
    let request = CaptureRequest::new(Rect::new(0, 0, 800, 600), 3, Duration::from_millis(200));
    let handle = pager(&rec).start(request).unwrap();

    let mut events = Vec::new();
    for event in handle.events().iter() {
        if let PagerEvent::Progress(page) = event {
            // Each progress event follows its own advance
            assert!(rec.advances() >= page as usize, "progress {page} before its advance");
        }
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            PagerEvent::Progress(1),
            PagerEvent::Progress(2),
            PagerEvent::Progress(3),
            PagerEvent::Completed(RunSummary {
                pages_total: 3,
                pages_stored: 3,
                pages_skipped: 0,
                advance_failures: 0,
            }),
        ]
    );
    assert_eq!(rec.advances(), 3);
}

#[test]
fn capture_happens_before_advance_for_every_page() {
    let rec = Recorder::new();
    let rect = Rect::new(5, 5, 105, 55);
    let handle = pager(&rec)
        .start(CaptureRequest::new(rect, 4, Duration::ZERO))
        .unwrap();
    assert_eq!(handle.events().iter().count(), 5);

    let expected: Vec<Call> = (1..=4)
        .flat_map(|page| [Call::Capture(rect), Call::Save(page), Call::Advance])
        .collect();
    assert_eq!(rec.calls(), expected);
}

#[test]
fn degenerate_region_skips_capture_but_keeps_paging() {
    let rec = Recorder::new();
    let handle = pager(&rec)
        .start(CaptureRequest::new(Rect::new(10, 10, 10, 50), 3, Duration::ZERO))
        .unwrap();
    let events: Vec<_> = handle.events().iter().collect();

    assert_eq!(events.len(), 4);
    assert_eq!(
        events[3],
        PagerEvent::Completed(RunSummary {
            pages_total: 3,
            pages_stored: 0,
            pages_skipped: 3,
            advance_failures: 0,
        })
    );
    assert_eq!(rec.calls(), vec![Call::Advance, Call::Advance, Call::Advance]);
}

#[test]
fn failed_page_leaves_a_gap_in_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let log = CallLog::default();
    let rec = Arc::new(Recorder {
        fail_pages: vec![2],
        ..Recorder::with_log(log)
    });
    let store = Arc::new(PngFrameStore::new(dir.path()).unwrap());
    let pager = PagingCaptureLoop::new(rec.clone(), rec.clone(), store);

    let handle = pager
        .start(CaptureRequest::new(Rect::new(0, 0, 40, 30), 3, Duration::ZERO))
        .unwrap();
    let events: Vec<_> = handle.events().iter().collect();

    assert_eq!(
        &events[..3],
        &[PagerEvent::Progress(1), PagerEvent::Progress(2), PagerEvent::Progress(3)]
    );
    assert!(matches!(
        events[3],
        PagerEvent::Completed(RunSummary {
            pages_stored: 2,
            pages_skipped: 1,
            ..
        })
    ));

    let pages = collect_pages(dir.path(), 3);
    assert_eq!(pages.present.len(), 2);
    assert_eq!(pages.missing, vec![2]);
    assert_eq!(rec.advances(), 3);
}

#[test]
fn advance_failures_do_not_abort_the_run() {
    let rec = Arc::new(Recorder {
        fail_advance: true,
        ..Recorder::with_log(CallLog::default())
    });
    let handle = pager(&rec)
        .start(CaptureRequest::new(Rect::new(0, 0, 20, 20), 2, Duration::ZERO))
        .unwrap();
    let last = handle.events().iter().last();
    assert_eq!(
        last,
        Some(PagerEvent::Completed(RunSummary {
            pages_total: 2,
            pages_stored: 2,
            pages_skipped: 0,
            advance_failures: 2,
        }))
    );
}

#[test]
fn controller_translates_region_to_global() {
    let rec = Recorder::new();
    let mut controller = SessionController::new(pager(&rec));
    let display = DisplayInfo::new(1, 1920, 0, 2560, 1440);

    let session = controller
        .start(&display, Rect::new(110, 220, 10, 20), 1, Duration::ZERO)
        .unwrap();
    assert_eq!(session.rectangle, Rect::new(1930, 20, 2030, 220));

    drain(&mut controller);
    assert_eq!(rec.calls()[0], Call::Capture(Rect::new(1930, 20, 2030, 220)));
    assert_eq!(controller.session().unwrap().status(), SessionStatus::Completed);
}

#[test]
fn controller_rejects_second_start_while_running() {
    let rec = Recorder::new();
    let mut controller = SessionController::new(pager(&rec));
    let display = DisplayInfo::fallback();
    let region = Rect::new(0, 0, 100, 100);

    controller
        .start(&display, region, 3, Duration::from_millis(100))
        .unwrap();
    assert!(matches!(
        controller.start(&display, region, 1, Duration::ZERO),
        Err(SessionError::AlreadyRunning)
    ));

    let events = drain(&mut controller);
    assert_eq!(events.len(), 4);
    let session = controller.session().unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.current_page, 3);
    assert_eq!(session.progress_text(), "3/3 pages (100%)");

    // Finished runs free the controller for the next one
    controller.start(&display, region, 1, Duration::ZERO).unwrap();
    drain(&mut controller);
    assert_eq!(controller.session().unwrap().page_count, 1);
}

#[test]
fn controller_cancel_stops_before_next_page() {
    let rec = Recorder::new();
    let mut controller = SessionController::new(pager(&rec));
    controller
        .start(
            &DisplayInfo::fallback(),
            Rect::new(0, 0, 50, 50),
            100,
            Duration::from_millis(20),
        )
        .unwrap();

    let mut events = Vec::new();
    while controller.is_running() {
        if let Some(event) = controller.wait_event(Duration::from_secs(10)) {
            if event == PagerEvent::Progress(2) {
                controller.cancel();
            }
            events.push(event);
        }
    }

    assert!(matches!(events.last(), Some(PagerEvent::Cancelled(_))));
    assert!(!events.iter().any(|e| matches!(e, PagerEvent::Completed(_))));
    assert!(events.len() < 100);
    assert_eq!(controller.session().unwrap().status(), SessionStatus::Cancelled);
}

#[test]
fn worker_panic_fails_the_session() {
    let rec = Arc::new(Recorder {
        panic_on_capture: true,
        ..Recorder::with_log(CallLog::default())
    });
    let mut controller = SessionController::new(pager(&rec));
    controller
        .start(&DisplayInfo::fallback(), Rect::new(0, 0, 50, 50), 2, Duration::ZERO)
        .unwrap();

    let events = drain(&mut controller);
    assert!(events.is_empty());
    assert_eq!(controller.session().unwrap().status(), SessionStatus::Failed);
}

#[test]
fn zero_pages_does_not_create_a_session() {
    let rec = Recorder::new();
    let mut controller = SessionController::new(pager(&rec));
    assert!(matches!(
        controller.start(&DisplayInfo::fallback(), Rect::new(0, 0, 50, 50), 0, Duration::ZERO),
        Err(SessionError::NoPages)
    ));
    assert!(controller.session().is_none());
    assert!(controller.poll().is_empty());
}
