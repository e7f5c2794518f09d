//! # muxsync-av
//!
//! External tool plumbing for the muxsync pipeline.
//!
//! This crate provides:
//! - **Tool discovery** ([`check_tool`], [`get_tool_path`]) for ffmpeg,
//!   ffprobe and mkvmerge
//! - **Probing** ([`Prober`], [`FfprobeProber`]) of a file's video stream:
//!   duration and average frame rate
//! - **Frame sampling** ([`FrameSampler`], [`FfmpegSampler`]) of the first
//!   seconds of a track into a private [`FrameWorkspace`]
//! - **Frame comparison** ([`FrameComparator`], [`ImageComparator`]) that
//!   tolerates encoding noise
//! - **Process execution** ([`ProcessRunner`], [`SystemRunner`])
//!
//! Every capability is a trait so the alignment and muxing logic can run
//! against in-memory fakes.
//!
//! ## Features
//!
//! - `probe` (default) - ffprobe-backed probing
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use muxsync_av::{FfprobeProber, Prober};
//! use std::path::Path;
//!
//! let info = FfprobeProber::default().probe(Path::new("/path/to/episode.mkv"))?;
//! let video = info.require_video()?;
//! println!("{:?} fps over {:?}s", video.frame_rate, video.duration);
//! # Ok::<(), muxsync_av::Error>(())
//! ```

mod error;
pub mod frames;
#[cfg(feature = "probe")]
pub mod probe;
pub mod process;
pub mod tools;
pub mod workspace;

// Re-exports
pub use error::{Error, Result};
pub use frames::{
    list_frames, FfmpegSampler, FrameComparator, FrameSampler, ImageComparator,
    DEFAULT_COMPARE_WIDTH, DEFAULT_MAX_DIFF_RATIO, DEFAULT_PIXEL_TOLERANCE, DEFAULT_WINDOW,
};
#[cfg(feature = "probe")]
pub use probe::{parse_frame_rate, FfprobeProber, MediaInfo, Prober, VideoStream};
pub use process::{ExitOutcome, ProcessRunner, SystemRunner};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
pub use workspace::FrameWorkspace;
