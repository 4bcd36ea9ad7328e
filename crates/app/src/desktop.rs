//! Win32 wiring: monitor list, selection overlay and capture job

use crate::cli::Cli;
use crate::config::Config;
use crate::workflow::{run_job, CaptureJob};
use anyhow::{Context, Result};
use capture::win32::{GdiCaptureProvider, GdiDisplayRegistry, SendInputInjector};
use capture::{DisplayInfo, DisplayRegistry, FrameCaptureProvider, InputInjector};
use overlay::selector::resolve_display;
use overlay::{OverlayWindow, SelectionOutcome};
use session::SessionStatus;
use std::sync::Arc;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    // Physical pixels everywhere
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let displays = GdiDisplayRegistry
        .list()
        .context("Failed to enumerate monitors")?;

    if cli.list_monitors {
        for display in &displays {
            println!("{}", display.label());
        }
        return Ok(());
    }

    let provider: Arc<dyn FrameCaptureProvider> = Arc::new(GdiCaptureProvider);
    let injector: Arc<dyn InputInjector> =
        Arc::new(SendInputInjector::new(config.capture.advance_key));

    let monitor = config.capture.monitor;
    let display = resolve_display(&displays, monitor).unwrap_or_else(|e| {
        log::warn!("{}; using default display", e);
        DisplayInfo::fallback()
    });

    let region = match cli.region {
        Some(region) => region,
        None => {
            let outcome =
                OverlayWindow::show(&displays, monitor, provider.clone(), injector.clone())
                    .context("Region selection failed")?;
            match outcome {
                SelectionOutcome::Region(region) => region,
                SelectionOutcome::Cancelled => {
                    log::info!("Selection cancelled, nothing captured");
                    return Ok(());
                }
            }
        }
    };

    let job = CaptureJob {
        display,
        region,
        pages: config.capture.pages,
        delay: config.capture.delay(),
        lead_in: config.capture.start_delay(),
        frames_dir: config.output.frames_dir(),
        keep_frames: config.output.keep_frames,
    };

    let report = run_job(&job, provider, injector)?;
    if report.status != SessionStatus::Completed {
        anyhow::bail!("{}", report.status.display_text());
    }

    if job.keep_frames {
        println!(
            "{} of {} page(s) saved to {}",
            report.pages.present.len(),
            job.pages,
            report.frames_dir.display()
        );
    }
    Ok(())
}
