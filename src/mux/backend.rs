//! Choosing which muxer runs.

use super::Container;
use crate::config::ToolsConfig;
use muxsync_av::get_tool_path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A muxer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Ffmpeg,
    Mkvmerge,
}

impl Backend {
    /// Binary name looked up on PATH.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Mkvmerge => "mkvmerge",
        }
    }

    /// Exit codes that still produced an output file.
    ///
    /// mkvmerge exits with 1 when it finished with warnings.
    pub fn warning_exit_code(&self) -> Option<i32> {
        match self {
            Self::Ffmpeg => None,
            Self::Mkvmerge => Some(1),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ffmpeg" => Ok(Self::Ffmpeg),
            "mkvmerge" => Ok(Self::Mkvmerge),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// Located muxer binaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableBinaries {
    pub ffmpeg: Option<PathBuf>,
    pub mkvmerge: Option<PathBuf>,
}

impl AvailableBinaries {
    /// Find ffmpeg and mkvmerge, preferring configured paths over PATH.
    pub fn discover(tools: &ToolsConfig) -> Self {
        Self {
            ffmpeg: get_tool_path("ffmpeg", tools.ffmpeg_path.as_deref()).ok(),
            mkvmerge: get_tool_path("mkvmerge", tools.mkvmerge_path.as_deref()).ok(),
        }
    }

    pub fn path_of(&self, backend: Backend) -> Option<&Path> {
        match backend {
            Backend::Ffmpeg => self.ffmpeg.as_deref(),
            Backend::Mkvmerge => self.mkvmerge.as_deref(),
        }
    }
}

/// A backend together with the binary that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedBackend {
    pub backend: Backend,
    pub binary: PathBuf,
}

/// Outcome of backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSelection {
    /// The backend that produces the output; `None` means muxing is skipped.
    pub muxer: Option<SelectedBackend>,
    /// ffmpeg, when present but not the muxer. Only used for frame sampling.
    pub auxiliary: Option<SelectedBackend>,
}

impl BackendSelection {
    fn only(backend: Backend, binary: &Path) -> Self {
        Self {
            muxer: Some(SelectedBackend {
                backend,
                binary: binary.to_path_buf(),
            }),
            auxiliary: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.muxer.is_none()
    }
}

/// Decide which backend muxes `container`.
///
/// A forced backend wins when its binary is present. MP4-family outputs
/// need ffmpeg. Everything else prefers mkvmerge, with ffmpeg kept as the
/// auxiliary binary, and falls back to ffmpeg when mkvmerge is missing.
/// When no usable binary is present the selection is empty and muxing is
/// skipped.
pub fn select_backends(
    binaries: &AvailableBinaries,
    container: Container,
    force: Option<Backend>,
) -> BackendSelection {
    if let Some(forced) = force {
        match binaries.path_of(forced) {
            Some(binary) => return BackendSelection::only(forced, binary),
            None => warn!("Forced backend {} not found, selecting automatically", forced),
        }
    }

    if container.is_mp4() {
        return match &binaries.ffmpeg {
            Some(ffmpeg) => BackendSelection::only(Backend::Ffmpeg, ffmpeg),
            None => {
                warn!("FFmpeg not found, skip muxing...");
                BackendSelection::default()
            }
        };
    }

    match &binaries.mkvmerge {
        Some(mkvmerge) => BackendSelection {
            muxer: Some(SelectedBackend {
                backend: Backend::Mkvmerge,
                binary: mkvmerge.clone(),
            }),
            auxiliary: binaries.ffmpeg.as_ref().map(|ffmpeg| SelectedBackend {
                backend: Backend::Ffmpeg,
                binary: ffmpeg.clone(),
            }),
        },
        None => match &binaries.ffmpeg {
            Some(ffmpeg) => {
                warn!("MKVMerge not found, muxing with FFmpeg");
                BackendSelection::only(Backend::Ffmpeg, ffmpeg)
            }
            None => {
                warn!("FFmpeg and MKVMerge not found, skip muxing...");
                BackendSelection::default()
            }
        },
    }
}
