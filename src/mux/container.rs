//! Output container families.

use std::path::Path;

/// Output container, as far as muxing decisions are concerned.
///
/// MP4-family outputs need ffmpeg, `mov_text` subtitles and cannot carry
/// font attachments. Everything else is treated as Matroska.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Matroska family (mkv, mka, webm and anything unknown).
    Matroska,
    /// MPEG-4 family (mp4, m4v, mov).
    Mp4,
}

impl Container {
    /// Classify an output path by its extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or(Container::Matroska)
    }

    pub fn is_mp4(&self) -> bool {
        matches!(self, Container::Mp4)
    }

    /// ffmpeg subtitle codec for this container.
    pub fn subtitle_codec(&self) -> &'static str {
        match self {
            Container::Mp4 => "mov_text",
            Container::Matroska => "ass",
        }
    }

    /// Whether fonts can be attached to this container.
    pub fn supports_attachments(&self) -> bool {
        !self.is_mp4()
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mkv" | "mka" | "mks" | "matroska" | "webm" => Ok(Container::Matroska),
            "mp4" | "m4v" | "mov" => Ok(Container::Mp4),
            _ => Err(format!("Unknown container format: {}", s)),
        }
    }
}
