//! Capture session for PageSnap
//!
//! Drives the capture, advance, wait cycle over a confirmed region on a
//! background worker and tracks the session status on the caller's side.

pub mod controller;
pub mod pager;
pub mod session;

pub use controller::SessionController;
pub use pager::{CaptureRequest, PagerEvent, PagerHandle, PagingCaptureLoop, RunSummary};
pub use session::{CaptureSession, SessionStatus};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("A capture run is already active")]
    AlreadyRunning,

    #[error("Page count must be at least 1")]
    NoPages,

    #[error("Failed to start capture worker: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
