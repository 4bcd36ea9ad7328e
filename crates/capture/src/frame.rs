//! Raw frame buffers

use crate::{CaptureError, CaptureResult};
use image::{ImageBuffer, RgbImage};
use std::time::Instant;

/// Frame data from capture, tightly packed BGRA rows
#[derive(Debug, Clone)]
pub struct FrameData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl FrameData {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wrap a BGRA buffer, checking its length against the dimensions
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> CaptureResult<Self> {
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(CaptureError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        })
    }

    /// Frame of a single colour
    pub fn filled(width: u32, height: u32, bgra: [u8; 4]) -> Self {
        let data = bgra.repeat(width as usize * height as usize);
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// BGRA pixel at (x, y), if inside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + Self::BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert BGRA data to an RGB image, dropping alpha
    pub fn to_rgb_image(&self) -> CaptureResult<RgbImage> {
        let rgb_data: Vec<u8> = self
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0]])
            .collect();
        let actual = rgb_data.len();
        ImageBuffer::from_raw(self.width, self.height, rgb_data).ok_or(CaptureError::BufferSize {
            expected: self.width as usize * self.height as usize * 3,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_short_buffers() {
        let err = FrameData::new(vec![0; 10], 2, 2).unwrap_err();
        assert!(matches!(err, CaptureError::BufferSize { expected: 16, actual: 10 }));
    }

    #[test]
    fn rgb_conversion_swaps_channels() {
        let frame = FrameData::filled(2, 1, [10, 20, 30, 255]);
        let img = frame.to_rgb_image().unwrap();
        assert_eq!(img.get_pixel(1, 0).0, [30, 20, 10]);
    }
}
