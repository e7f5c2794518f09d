//! Media file probing.
//!
//! Alignment only needs two numbers per track: how long its video stream is
//! and its average frame rate. [`Prober`] is the seam; [`FfprobeProber`]
//! shells out to ffprobe.

mod ffprobe;
mod types;

pub use ffprobe::{parse_frame_rate, probe_with_ffprobe, FfprobeProber};
pub use types::*;

use crate::Result;
use std::path::Path;

/// Reports stream information for a media file.
pub trait Prober: Send + Sync {
    /// Probe `path`.
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

impl<P: Prober + ?Sized> Prober for &P {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        (**self).probe(path)
    }
}
