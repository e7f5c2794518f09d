//! Pixel-based frame comparison.

use super::FrameComparator;
use crate::Result;
use dashmap::DashMap;
use image::imageops::FilterType;
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default per-pixel luma tolerance (0-255).
pub const DEFAULT_PIXEL_TOLERANCE: u8 = 12;
/// Default share of pixels allowed to exceed the tolerance.
pub const DEFAULT_MAX_DIFF_RATIO: f64 = 0.01;
/// Frames are downscaled to this width before comparing.
pub const DEFAULT_COMPARE_WIDTH: u32 = 160;

/// [`FrameComparator`] that decodes frames with the `image` crate.
///
/// Frames are converted to luma and downscaled, which removes most of the
/// noise two encodes of the same picture disagree on. Two frames are equal
/// when they have the same aspect and at most `max_diff_ratio` of their
/// pixels differ by more than `pixel_tolerance`.
///
/// Decoded frames are cached by path: alignment compares every reference
/// frame against many candidates.
#[derive(Debug)]
pub struct ImageComparator {
    pixel_tolerance: u8,
    max_diff_ratio: f64,
    compare_width: u32,
    cache: DashMap<PathBuf, Arc<GrayImage>>,
}

impl ImageComparator {
    pub fn new(pixel_tolerance: u8, max_diff_ratio: f64) -> Self {
        Self {
            pixel_tolerance,
            max_diff_ratio,
            compare_width: DEFAULT_COMPARE_WIDTH,
            cache: DashMap::new(),
        }
    }

    pub fn with_compare_width(mut self, width: u32) -> Self {
        self.compare_width = width.max(1);
        self
    }

    /// Drop every cached frame.
    pub fn clear(&self) {
        self.cache.clear();
    }

    fn load(&self, path: &Path) -> Result<Arc<GrayImage>> {
        if let Some(frame) = self.cache.get(path) {
            return Ok(Arc::clone(frame.value()));
        }

        let luma = image::open(path)?.to_luma8();
        let (width, height) = luma.dimensions();
        let frame = if width > self.compare_width {
            let scaled_height = ((u64::from(height) * u64::from(self.compare_width))
                / u64::from(width))
            .max(1) as u32;
            image::imageops::resize(&luma, self.compare_width, scaled_height, FilterType::Triangle)
        } else {
            luma
        };

        let frame = Arc::new(frame);
        self.cache.insert(path.to_path_buf(), Arc::clone(&frame));
        Ok(frame)
    }
}

impl Default for ImageComparator {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_TOLERANCE, DEFAULT_MAX_DIFF_RATIO)
    }
}

impl FrameComparator for ImageComparator {
    fn frames_equal(&self, a: &Path, b: &Path) -> Result<bool> {
        let a = self.load(a)?;
        let b = self.load(b)?;
        Ok(luma_equal(&a, &b, self.pixel_tolerance, self.max_diff_ratio))
    }
}

fn luma_equal(a: &GrayImage, b: &GrayImage, pixel_tolerance: u8, max_diff_ratio: f64) -> bool {
    if a.dimensions() != b.dimensions() {
        return false;
    }

    let total = a.as_raw().len();
    if total == 0 {
        return true;
    }

    let differing = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .filter(|(p, q)| p.abs_diff(**q) > pixel_tolerance)
        .count();

    (differing as f64 / total as f64) <= max_diff_ratio
}
