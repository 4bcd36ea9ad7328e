//! Export module for PageSnap
//!
//! Persists captured pages under deterministic names and enumerates them
//! for the document assembler.

mod pages;
mod png;

pub use pages::{cleanup_pages, collect_pages, PageSet};
pub use png::{page_file_name, PngFrameStore};

use capture::FrameData;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Frame error: {0}")]
    Frame(#[from] capture::CaptureError),

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(u32),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Persistence target for captured pages, indexed from 1
pub trait FrameStore: Send + Sync {
    /// Store `frame` as page `page_index`, returning where it went
    fn save(&self, page_index: u32, frame: &FrameData) -> ExportResult<PathBuf>;
}
