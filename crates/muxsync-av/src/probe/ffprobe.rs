//! FFprobe-based media probing.

use super::{types::*, Prober};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    format_name: String,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// [`Prober`] backed by the ffprobe CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        probe_with_ffprobe(&self.program, path)
    }
}

/// Probe a media file using the ffprobe binary at `program`.
pub fn probe_with_ffprobe(program: &Path, path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = Command::new(program)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_json(path, &json_str)
}

pub(crate) fn parse_ffprobe_json(path: &Path, json: &str) -> Result<MediaInfo> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    Ok(parse_ffprobe_output(path, output))
}

fn parse_ffprobe_output(path: &Path, output: FfprobeOutput) -> MediaInfo {
    let container_duration = output.format.duration.and_then(|s| s.parse::<f64>().ok());

    let mut info = MediaInfo {
        file_path: path.to_path_buf(),
        container: output.format.format_name,
        duration: container_duration,
        video: None,
        audio_streams: 0,
        subtitle_streams: 0,
    };

    for stream in output.streams {
        match stream.codec_type.as_str() {
            "video" if info.video.is_none() => {
                info.video = Some(VideoStream {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                    duration: stream
                        .duration
                        .and_then(|s| s.parse::<f64>().ok())
                        .or(container_duration),
                    frame_rate: stream.avg_frame_rate.and_then(|s| parse_frame_rate(&s)),
                });
            }
            "audio" => info.audio_streams += 1,
            "subtitle" => info.subtitle_streams += 1,
            _ => {}
        }
    }

    info
}

/// Evaluate a rational frame rate expression such as `24000/1001`.
///
/// Returns `None` for unparsable input and for `0/0`, which ffprobe reports
/// for streams without a known rate.
pub fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.trim().split('/').collect();
    let rate = if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        num / den
    } else {
        rate_str.trim().parse().ok()?
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}
