//! One capture job: confirmed region in, page folder out

use anyhow::{Context, Result};
use capture::{DisplayInfo, FrameCaptureProvider, InputInjector, Rect};
use export::{cleanup_pages, collect_pages, PageSet, PngFrameStore};
use session::{PagingCaptureLoop, SessionController, SessionStatus};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How often the main thread wakes while waiting on the worker
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct CaptureJob {
    pub display: DisplayInfo,
    /// Relative to `display`
    pub region: Rect,
    pub pages: u32,
    pub delay: Duration,
    pub lead_in: Duration,
    pub frames_dir: PathBuf,
    pub keep_frames: bool,
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub status: SessionStatus,
    pub frames_dir: PathBuf,
    /// Pages found after the run, before any cleanup
    pub pages: PageSet,
}

/// Corners, size and aspect ratio of a region
pub fn region_summary(region: &Rect) -> String {
    format!(
        "({}, {}) to ({}, {}), {} x {}, aspect {:.2}",
        region.x1,
        region.y1,
        region.x2,
        region.y2,
        region.width(),
        region.height(),
        region.aspect_ratio()
    )
}

/// Run the paging loop to completion and inspect what it stored
pub fn run_job(
    job: &CaptureJob,
    provider: Arc<dyn FrameCaptureProvider>,
    injector: Arc<dyn InputInjector>,
) -> Result<JobReport> {
    let store = PngFrameStore::new(&job.frames_dir)
        .with_context(|| format!("Failed to create page folder {}", job.frames_dir.display()))?;

    log::info!("{}: region {}", job.display.label(), region_summary(&job.region));
    log::info!("Saving pages to {}", job.frames_dir.display());

    let pager = PagingCaptureLoop::new(provider, injector, Arc::new(store));
    let mut controller = SessionController::new(pager);
    controller
        .start_with_lead_in(&job.display, job.region, job.pages, job.delay, job.lead_in)
        .context("Failed to start capture")?;

    while controller.is_running() {
        controller.wait_event(POLL_INTERVAL);
    }

    let status = controller
        .session()
        .map_or(SessionStatus::Failed, |s| s.status());
    log::info!("{}", status.display_text());

    let pages = collect_pages(&job.frames_dir, job.pages);
    if !pages.is_complete() {
        log::warn!(
            "{} of {} page(s) missing: {:?}",
            pages.missing.len(),
            job.pages,
            pages.missing
        );
    }

    if !job.keep_frames {
        let removed = cleanup_pages(&job.frames_dir, job.pages)
            .with_context(|| format!("Failed to clean up {}", job.frames_dir.display()))?;
        log::info!("Removed {} temporary page file(s)", removed);
    }

    Ok(JobReport {
        status,
        frames_dir: job.frames_dir.clone(),
        pages,
    })
}
