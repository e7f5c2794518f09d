//! Probe result types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// Container format (e.g., "matroska,webm").
    pub container: String,
    /// Container duration in seconds.
    pub duration: Option<f64>,
    /// First video stream, if any.
    pub video: Option<VideoStream>,
    /// Number of audio streams.
    pub audio_streams: u32,
    /// Number of subtitle streams.
    pub subtitle_streams: u32,
}

impl MediaInfo {
    /// The video stream, or [`Error::NoVideoStream`] when the file has none.
    pub fn require_video(&self) -> Result<&VideoStream> {
        self.video.as_ref().ok_or_else(|| Error::NoVideoStream {
            path: self.file_path.clone(),
        })
    }
}

/// Information about a video stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    /// Stream index within the file.
    pub index: u32,
    /// Video codec (e.g., "h264").
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// Stream duration in seconds, falling back to the container duration.
    pub duration: Option<f64>,
    /// Average frame rate in FPS.
    pub frame_rate: Option<f64>,
}
