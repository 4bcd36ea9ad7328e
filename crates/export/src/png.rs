//! PNG page store

use crate::{ExportError, ExportResult, FrameStore};
use capture::FrameData;
use std::fs;
use std::path::PathBuf;

/// File name for a page, zero-padded so lexical order is page order
pub fn page_file_name(page_index: u32) -> String {
    format!("page_{:05}.png", page_index)
}

/// Stores each page as a lossless RGB PNG in one directory
#[derive(Debug, Clone)]
pub struct PngFrameStore {
    dir: PathBuf,
}

impl PngFrameStore {
    /// Open a store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> ExportResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn page_path(&self, page_index: u32) -> PathBuf {
        self.dir.join(page_file_name(page_index))
    }
}

impl FrameStore for PngFrameStore {
    fn save(&self, page_index: u32, frame: &FrameData) -> ExportResult<PathBuf> {
        if page_index == 0 {
            return Err(ExportError::InvalidPage(page_index));
        }

        let path = self.page_path(page_index);
        frame.to_rgb_image()?.save(&path)?;
        log::debug!("Saved page {} to {}", page_index, path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_names_sort_in_page_order() {
        let mut names: Vec<String> = [10, 2, 1, 100].into_iter().map(page_file_name).collect();
        names.sort();
        assert_eq!(
            names,
            ["page_00001.png", "page_00002.png", "page_00010.png", "page_00100.png"]
        );
    }

    #[test]
    fn page_zero_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = PngFrameStore::new(dir.path()).unwrap();
        let frame = FrameData::filled(2, 2, [0, 0, 0, 255]);
        assert!(matches!(store.save(0, &frame), Err(ExportError::InvalidPage(0))));
    }
}
