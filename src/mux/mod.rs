//! Command synthesis for the two muxer backends.
//!
//! Both backends read the same [`MergeJob`](crate::job::MergeJob) and produce
//! a [`CommandLine`]: an ordered list of typed tokens that is turned into an
//! argument vector for execution, or into the tool's literal quoted syntax
//! for display.

mod backend;
mod command;
mod container;
pub mod ffmpeg;
pub mod mkvmerge;

pub use backend::{select_backends, AvailableBinaries, Backend, BackendSelection, SelectedBackend};
pub use command::{CommandLine, Token};
pub use container::Container;
pub use ffmpeg::build_ffmpeg_command;
pub use mkvmerge::build_mkvmerge_command;

use crate::job::MergeJob;
use muxsync_common::Offset;
use std::path::Path;

/// Build the command `backend` would run for `job`.
pub fn build_command(backend: Backend, job: &MergeJob) -> CommandLine {
    match backend {
        Backend::Ffmpeg => build_ffmpeg_command(job),
        Backend::Mkvmerge => build_mkvmerge_command(job),
    }
}

/// Milliseconds a delayed input is shifted by, if known.
///
/// A delay without a frame rate cannot be converted; it is logged and the
/// directive is left out.
pub(crate) fn shift_millis(offset: Offset, source: &Path) -> Option<u64> {
    match offset {
        Offset::None => None,
        Offset::Millis(ms) => Some(ms),
        Offset::MissingFrameRate(frames) => {
            tracing::error!(
                "Missing frame rate for {:?}, dropping its {} frame delay",
                source,
                frames
            );
            None
        }
    }
}
