//! Page enumeration for document assembly

use crate::png::page_file_name;
use crate::ExportResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Pages `1..=page_count` found in a store directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    /// Existing page files, in page order
    pub present: Vec<PathBuf>,
    /// Page numbers with no file
    pub missing: Vec<u32>,
}

impl PageSet {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Enumerate the expected pages, tolerating gaps
pub fn collect_pages(dir: &Path, page_count: u32) -> PageSet {
    let mut set = PageSet::default();
    for page in 1..=page_count {
        let path = dir.join(page_file_name(page));
        if path.is_file() {
            set.present.push(path);
        } else {
            set.missing.push(page);
        }
    }
    set
}

/// Delete page files `1..=page_count`; returns how many were removed.
///
/// The directory itself is removed too once nothing else is left in it.
pub fn cleanup_pages(dir: &Path, page_count: u32) -> ExportResult<usize> {
    let mut removed = 0;
    for page in 1..=page_count {
        let path = dir.join(page_file_name(page));
        if path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }

    if fs::read_dir(dir)?.next().is_none() {
        fs::remove_dir(dir)?;
    }

    log::debug!("Removed {} page file(s) from {}", removed, dir.display());
    Ok(removed)
}
