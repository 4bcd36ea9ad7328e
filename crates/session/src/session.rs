//! Capture session state

use capture::Rect;
use std::time::Duration;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Created, worker not started yet
    Pending,
    Running,
    Completed,
    /// Worker died or could not be started
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "Ready",
            SessionStatus::Running => "Capturing...",
            SessionStatus::Completed => "Capture complete",
            SessionStatus::Failed => "Capture failed",
            SessionStatus::Cancelled => "Capture cancelled",
        }
    }
}

/// One capture run over a fixed global rectangle
#[derive(Debug, Clone)]
pub struct CaptureSession {
    /// Region to capture (global coordinates)
    pub rectangle: Rect,
    pub page_count: u32,
    pub page_delay: Duration,
    /// Pages processed so far, `0..=page_count`
    pub current_page: u32,
    status: SessionStatus,
}

impl CaptureSession {
    pub fn new(rectangle: Rect, page_count: u32, page_delay: Duration) -> Self {
        Self {
            rectangle,
            page_count,
            page_delay,
            current_page: 0,
            status: SessionStatus::Pending,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Transition to running
    pub fn start(&mut self) -> bool {
        if self.status == SessionStatus::Pending {
            self.status = SessionStatus::Running;
            true
        } else {
            false
        }
    }

    /// Record progress; out-of-order or stale pages are ignored
    pub fn advance_to(&mut self, page: u32) -> bool {
        if self.status != SessionStatus::Running || page <= self.current_page || page > self.page_count {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn complete(&mut self) -> bool {
        self.finish(SessionStatus::Completed)
    }

    pub fn fail(&mut self) -> bool {
        self.finish(SessionStatus::Failed)
    }

    pub fn cancel(&mut self) -> bool {
        self.finish(SessionStatus::Cancelled)
    }

    /// Integer completion percentage
    pub fn percent(&self) -> u32 {
        if self.page_count == 0 {
            return 0;
        }
        (self.current_page as u64 * 100 / self.page_count as u64) as u32
    }

    /// Progress line, e.g. `2/3 pages (66%)`
    pub fn progress_text(&self) -> String {
        format!(
            "{}/{} pages ({}%)",
            self.current_page,
            self.page_count,
            self.percent()
        )
    }

    fn finish(&mut self, status: SessionStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(pages: u32) -> CaptureSession {
        CaptureSession::new(Rect::new(0, 0, 800, 600), pages, Duration::from_millis(200))
    }

    #[test]
    fn progress_only_moves_forward_while_running() {
        let mut s = session(3);
        assert!(!s.advance_to(1), "not started yet");
        assert!(s.start());
        assert!(s.advance_to(1));
        assert!(s.advance_to(2));
        assert!(!s.advance_to(2));
        assert!(!s.advance_to(1));
        assert!(!s.advance_to(4));
        assert_eq!(s.current_page, 2);
    }

    #[test]
    fn terminal_status_sticks() {
        let mut s = session(1);
        s.start();
        assert!(s.complete());
        assert!(!s.fail());
        assert!(!s.cancel());
        assert!(!s.start());
        assert_eq!(s.status(), SessionStatus::Completed);
    }

    #[test]
    fn progress_text_uses_integer_percent() {
        let mut s = session(3);
        s.start();
        assert_eq!(s.progress_text(), "0/3 pages (0%)");
        s.advance_to(2);
        assert_eq!(s.progress_text(), "2/3 pages (66%)");
        s.advance_to(3);
        assert_eq!(s.progress_text(), "3/3 pages (100%)");
    }
}
