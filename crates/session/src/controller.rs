//! Session controller: one capture run at a time

use crate::pager::{CaptureRequest, PagerEvent, PagerHandle, PagingCaptureLoop};
use crate::session::{CaptureSession, SessionStatus};
use crate::{SessionError, SessionResult};
use capture::{DisplayInfo, Rect};
use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Wires a confirmed region into the paging loop and tracks its session
pub struct SessionController {
    pager: PagingCaptureLoop,
    session: Option<CaptureSession>,
    run: Option<PagerHandle>,
}

impl SessionController {
    pub fn new(pager: PagingCaptureLoop) -> Self {
        Self {
            pager,
            session: None,
            run: None,
        }
    }

    /// Latest session, finished or not
    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| s.status() == SessionStatus::Running)
    }

    /// Start capturing `region`, given relative to `display`
    pub fn start(
        &mut self,
        display: &DisplayInfo,
        region: Rect,
        page_count: u32,
        delay: Duration,
    ) -> SessionResult<&CaptureSession> {
        self.start_with_lead_in(display, region, page_count, delay, Duration::ZERO)
    }

    pub fn start_with_lead_in(
        &mut self,
        display: &DisplayInfo,
        region: Rect,
        page_count: u32,
        delay: Duration,
        lead_in: Duration,
    ) -> SessionResult<&CaptureSession> {
        if self.is_running() {
            return Err(SessionError::AlreadyRunning);
        }

        let global = display.rect_to_global(region.normalized());
        let mut session = CaptureSession::new(global, page_count, delay);
        let request = CaptureRequest::new(global, page_count, delay).with_lead_in(lead_in);

        match self.pager.start(request) {
            Ok(handle) => {
                session.start();
                self.run = Some(handle);
            }
            Err(SessionError::NoPages) => return Err(SessionError::NoPages),
            Err(e) => {
                log::error!("Could not start capture: {}", e);
                session.fail();
                self.session = Some(session);
                return Err(e);
            }
        }

        Ok(&*self.session.insert(session))
    }

    /// Ask the active run to stop before its next page
    pub fn cancel(&self) {
        if let Some(run) = &self.run {
            log::info!("Cancelling capture");
            run.cancel();
        }
    }

    /// Apply every event already delivered, without blocking
    pub fn poll(&mut self) -> Vec<PagerEvent> {
        let Some(events) = self.run.as_ref().map(|run| run.events().clone()) else {
            return Vec::new();
        };

        let mut delivered = Vec::new();
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    delivered.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_gone();
                    break;
                }
            }
        }
        delivered
    }

    /// Wait up to `timeout` for the next event and apply it
    pub fn wait_event(&mut self, timeout: Duration) -> Option<PagerEvent> {
        let events = self.run.as_ref().map(|run| run.events().clone())?;

        match events.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.worker_gone();
                None
            }
        }
    }

    fn apply(&mut self, event: PagerEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match event {
            PagerEvent::Progress(page) => {
                session.advance_to(page);
                log::info!("{}", session.progress_text());
            }
            PagerEvent::Completed(_) => {
                session.complete();
                self.run = None;
            }
            PagerEvent::Cancelled(_) => {
                session.cancel();
                self.run = None;
            }
        }
    }

    /// Event stream ended without a terminal event
    fn worker_gone(&mut self) {
        if let Some(run) = self.run.take() {
            if run.join().is_err() {
                log::error!("Capture worker panicked");
            } else {
                log::error!("Capture worker exited without finishing");
            }
        }
        if let Some(session) = self.session.as_mut() {
            session.fail();
        }
    }
}
