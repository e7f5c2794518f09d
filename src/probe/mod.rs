// Re-export probe functionality from muxsync-av
pub use muxsync_av::probe::*;
pub use muxsync_av::{check_tool, check_tools, require_tool, ToolInfo};

use crate::config::ToolsConfig;
use anyhow::{Context, Result};
use muxsync_av::get_tool_path;
use std::path::Path;

/// The ffprobe-backed prober for the configured tools.
pub fn prober(tools: &ToolsConfig) -> Result<FfprobeProber> {
    let ffprobe = get_tool_path("ffprobe", tools.ffprobe_path.as_deref())
        .context("ffprobe is required to probe media files")?;
    Ok(FfprobeProber::new(ffprobe))
}

/// Probe a media file with ffprobe
pub fn probe_file(path: &Path, tools: &ToolsConfig) -> Result<MediaInfo> {
    prober(tools)?
        .probe(path)
        .with_context(|| format!("Failed to probe {:?}", path))
}
