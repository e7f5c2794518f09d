use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::mux::Backend;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub fonts: FontsConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub mkvmerge_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Seconds of video sampled from the start of each track (default: 15)
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,

    /// Consecutive matching frames required to accept an offset (default: 30)
    #[serde(default = "default_confirmation_frames")]
    pub confirmation_frames: usize,

    /// Per-pixel luma difference still counted as equal (default: 12)
    #[serde(default = "default_pixel_tolerance")]
    pub pixel_tolerance: u8,

    /// Share of differing pixels two equal frames may have (default: 0.01)
    #[serde(default = "default_max_diff_ratio")]
    pub max_diff_ratio: f64,

    /// Width frames are downscaled to before comparison (default: 160)
    #[serde(default = "default_compare_width")]
    pub compare_width: u32,

    /// Parent directory for per-track frame directories
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

fn default_window_secs() -> f64 {
    15.0
}

fn default_confirmation_frames() -> usize {
    30
}

fn default_pixel_tolerance() -> u8 {
    muxsync_av::DEFAULT_PIXEL_TOLERANCE
}

fn default_max_diff_ratio() -> f64 {
    muxsync_av::DEFAULT_MAX_DIFF_RATIO
}

fn default_compare_width() -> u32 {
    muxsync_av::DEFAULT_COMPARE_WIDTH
}

impl SyncConfig {
    /// The sampling window, or `None` when `window_secs` is not a positive
    /// duration that fits in a [`Duration`].
    pub fn window(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.window_secs)
            .ok()
            .filter(|window| !window.is_zero())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            confirmation_frames: default_confirmation_frames(),
            pixel_tolerance: default_pixel_tolerance(),
            max_diff_ratio: default_max_diff_ratio(),
            compare_width: default_compare_width(),
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MergeConfig {
    /// Backend used regardless of the output container, when installed
    #[serde(default)]
    pub force_backend: Option<Backend>,

    #[serde(default)]
    pub cleanup: CleanupPolicy,

    /// Suffix appended to closed-caption subtitle titles (default: "CC")
    #[serde(default = "default_cc_tag")]
    pub cc_tag: String,
}

fn default_cc_tag() -> String {
    "CC".to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            force_backend: None,
            cleanup: CleanupPolicy::default(),
            cc_tag: default_cc_tag(),
        }
    }
}

/// When source files are deleted after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Delete sources whatever the merge outcome.
    #[default]
    Always,
    /// Delete sources only after the muxer finished (with or without warnings).
    OnSuccess,
    /// Keep sources.
    Never,
}

impl CleanupPolicy {
    /// Whether sources should be deleted given the merge outcome.
    pub fn applies(&self, merge_succeeded: bool) -> bool {
        match self {
            Self::Always => true,
            Self::OnSuccess => merge_succeeded,
            Self::Never => false,
        }
    }
}

impl std::str::FromStr for CleanupPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "on-success" | "on_success" => Ok(Self::OnSuccess),
            "never" => Ok(Self::Never),
            _ => Err(format!("Unknown cleanup policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FontsConfig {
    /// Directory font files are looked up in
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Font family name to the file names that make it up
    #[serde(default)]
    pub families: BTreeMap<String, Vec<String>>,
}
