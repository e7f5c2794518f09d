//! Frame sampling and comparison.
//!
//! Alignment works on still images: [`FrameSampler`] writes the first seconds
//! of a track into a [`FrameWorkspace`](crate::FrameWorkspace) and
//! [`FrameComparator`] judges whether two stills show the same picture.

mod compare;
mod sampler;

pub use compare::{
    ImageComparator, DEFAULT_COMPARE_WIDTH, DEFAULT_MAX_DIFF_RATIO, DEFAULT_PIXEL_TOLERANCE,
};
pub use sampler::{list_frames, FfmpegSampler, DEFAULT_WINDOW};

use crate::{FrameWorkspace, Result};
use std::path::{Path, PathBuf};

/// Extracts a bounded run of still frames from a video file.
pub trait FrameSampler: Send + Sync {
    /// Write frames of `input` into `workspace` and return their paths in
    /// presentation order.
    fn sample(&self, input: &Path, workspace: &FrameWorkspace) -> Result<Vec<PathBuf>>;
}

/// Decides whether two frames are visually identical.
pub trait FrameComparator: Send + Sync {
    /// `true` when `a` and `b` show the same picture, allowing for minor
    /// encoding noise.
    fn frames_equal(&self, a: &Path, b: &Path) -> Result<bool>;
}

impl<C: FrameComparator + ?Sized> FrameComparator for &C {
    fn frames_equal(&self, a: &Path, b: &Path) -> Result<bool> {
        (**self).frames_equal(a, b)
    }
}

impl<S: FrameSampler + ?Sized> FrameSampler for &S {
    fn sample(&self, input: &Path, workspace: &FrameWorkspace) -> Result<Vec<PathBuf>> {
        (**self).sample(input, workspace)
    }
}
