//! Frame extraction through the ffmpeg CLI.

use super::FrameSampler;
use crate::{Error, FrameWorkspace, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Default sampling window: the first 15 seconds of every track.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15);

/// [`FrameSampler`] that runs `ffmpeg -i <input> -t <window> <dir>/%03d.png`.
#[derive(Debug, Clone)]
pub struct FfmpegSampler {
    program: PathBuf,
    window: Duration,
}

impl FfmpegSampler {
    pub fn new(program: impl Into<PathBuf>, window: Duration) -> Self {
        Self {
            program: program.into(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arguments passed to ffmpeg for `input`.
    pub fn build_args(&self, input: &Path, workspace: &FrameWorkspace) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-t".to_string(),
            format_seconds(self.window),
            workspace.frame_pattern().to_string_lossy().into_owned(),
        ]
    }
}

impl Default for FfmpegSampler {
    fn default() -> Self {
        Self::new("ffmpeg", DEFAULT_WINDOW)
    }
}

impl FrameSampler for FfmpegSampler {
    fn sample(&self, input: &Path, workspace: &FrameWorkspace) -> Result<Vec<PathBuf>> {
        if !input.exists() {
            return Err(Error::file_not_found(input));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Sampling {:?} ({}s) into {:?}",
            input,
            self.window.as_secs_f64(),
            workspace.frames_dir()
        );

        let result = Command::new(&self.program)
            .args(self.build_args(input, workspace))
            .output()
            .map_err(|e| Error::spawn("ffmpeg", e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::tool_failed("ffmpeg", stderr.to_string()));
        }

        let frames = list_frames(workspace.frames_dir())?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Extracted {} frames from {:?}", frames.len(), input);

        Ok(frames)
    }
}

/// List the numbered `.png` frames in `dir`, ordered by frame number.
///
/// Names that are not plain numbers are ignored, so `1000.png` sorts after
/// `999.png`.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<(u64, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        let number = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(number) = number {
            frames.push((number, path));
        }
    }

    frames.sort_by_key(|(number, _)| *number);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

fn format_seconds(window: Duration) -> String {
    if window.subsec_nanos() == 0 {
        window.as_secs().to_string()
    } else {
        format!("{:.3}", window.as_secs_f64())
    }
}
