//! Track model: the records a merge job is built from.
//!
//! Records are plain data. Duration and frame rate are filled in by probing,
//! delays by alignment detection (media tracks) or delay propagation
//! (subtitles). Every stage receives the records by value and hands back the
//! enriched copies, so no two stages ever hold the same record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A language a track is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    /// ISO 639-2 code written into the container (e.g. `jpn`).
    pub code: String,
    /// English name of the language (e.g. `Japanese`).
    pub name: String,
    /// Display title used for subtitle track names, if it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Locale tag (e.g. `ja-JP`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            title: None,
            locale: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// The title if set, otherwise the English name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Locale if set, otherwise the code.
    pub fn locale_or_code(&self) -> &str {
        self.locale.as_deref().unwrap_or(&self.code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Convert a frame delay into whole milliseconds, rounding up.
///
/// The division happens last so exact results stay exact
/// (12 frames at 24 fps is 500 ms, not 501).
pub fn frames_to_millis(delay_frames: u32, frame_rate: f64) -> u64 {
    (f64::from(delay_frames) * 1000.0 / frame_rate).ceil() as u64
}

/// How a track's delay translates into a time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// No delay (unset or zero frames).
    None,
    /// Delay converted to milliseconds.
    Millis(u64),
    /// A delay exists but the frame rate needed to convert it is unknown.
    MissingFrameRate(u32),
}

fn offset_of(delay: Option<u32>, frame_rate: Option<f64>) -> Offset {
    match delay {
        None | Some(0) => Offset::None,
        Some(frames) => match frame_rate {
            Some(fps) if fps.is_finite() && fps > 0.0 => {
                Offset::Millis(frames_to_millis(frames, fps))
            }
            _ => Offset::MissingFrameRate(frames),
        },
    }
}

/// A video+audio, video-only or audio-only source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTrack {
    pub path: PathBuf,
    pub language: Language,
    /// Video stream duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Frames the track must be shifted to line up with the reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    /// Subtitles of the primary track's language inherit its delay.
    #[serde(default)]
    pub primary: bool,
    /// Average frame rate of the video stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
}

impl MediaTrack {
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            duration: None,
            delay: None,
            primary: false,
            frame_rate: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn offset(&self) -> Offset {
        offset_of(self.delay, self.frame_rate)
    }

    /// The delay in milliseconds, when it can be computed.
    pub fn delay_millis(&self) -> Option<u64> {
        match self.offset() {
            Offset::Millis(ms) => Some(ms),
            _ => None,
        }
    }
}

/// An external subtitle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub language: Language,
    pub path: PathBuf,
    #[serde(default)]
    pub closed_caption: bool,
    /// Copied from the media track this subtitle is paired with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    /// Font families referenced by the subtitle's styles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<String>,
}

impl SubtitleTrack {
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            language,
            path: path.into(),
            closed_caption: false,
            delay: None,
            frame_rate: None,
            fonts: Vec::new(),
        }
    }

    pub fn closed_caption(mut self) -> Self {
        self.closed_caption = true;
        self
    }

    pub fn with_fonts(mut self, fonts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fonts = fonts.into_iter().map(Into::into).collect();
        self
    }

    pub fn offset(&self) -> Offset {
        offset_of(self.delay, self.frame_rate)
    }
}

/// A font file attached to the output container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    /// Attachment name (the font's file name).
    pub name: String,
    pub path: PathBuf,
    pub mime: String,
}

/// Release flavour, appended to video track names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    #[default]
    Uncut,
    Simulcast,
}

impl ReleaseKind {
    /// Track-name suffix, including the leading space.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Uncut => " [Uncut]",
            Self::Simulcast => " [Simulcast]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpn() -> Language {
        Language::new("jpn", "Japanese")
    }

    #[test]
    fn test_frames_to_millis() {
        assert_eq!(frames_to_millis(12, 24.0), 500);
        assert_eq!(frames_to_millis(1, 23.976), 42);
        assert_eq!(frames_to_millis(1, 24000.0 / 1001.0), 42);
        assert_eq!(frames_to_millis(0, 25.0), 0);
        assert_eq!(frames_to_millis(3, 30.0), 100);
    }

    #[test]
    fn test_offset_without_delay() {
        let track = MediaTrack::new("a.mkv", jpn());
        assert_eq!(track.offset(), Offset::None);

        let mut track = track;
        track.delay = Some(0);
        track.frame_rate = Some(24.0);
        assert_eq!(track.offset(), Offset::None);
    }

    #[test]
    fn test_offset_missing_frame_rate() {
        let mut track = MediaTrack::new("a.mkv", jpn());
        track.delay = Some(5);
        assert_eq!(track.offset(), Offset::MissingFrameRate(5));
        assert_eq!(track.delay_millis(), None);

        track.frame_rate = Some(0.0);
        assert_eq!(track.offset(), Offset::MissingFrameRate(5));
    }

    #[test]
    fn test_subtitle_offset() {
        let mut sub = SubtitleTrack::new("a.ass", jpn()).closed_caption();
        sub.delay = Some(24);
        sub.frame_rate = Some(24.0);
        assert_eq!(sub.offset(), Offset::Millis(1000));
        assert!(sub.closed_caption);
    }

    #[test]
    fn test_language_display_title() {
        let lang = jpn();
        assert_eq!(lang.display_title(), "Japanese");
        assert_eq!(lang.locale_or_code(), "jpn");

        let lang = lang.with_title("日本語").with_locale("ja-JP");
        assert_eq!(lang.display_title(), "日本語");
        assert_eq!(lang.locale_or_code(), "ja-JP");
        assert_eq!(lang.to_string(), "jpn");
    }

    #[test]
    fn test_release_kind_tag() {
        assert_eq!(ReleaseKind::Uncut.tag(), " [Uncut]");
        assert_eq!(ReleaseKind::Simulcast.tag(), " [Simulcast]");
        assert_eq!(ReleaseKind::default(), ReleaseKind::Uncut);
    }

    #[test]
    fn test_media_track_deserialize_defaults() {
        let track: MediaTrack = toml::from_str(
            r#"
path = "/media/ep01.jpn.mkv"
primary = true

[language]
code = "jpn"
name = "Japanese"
"#,
        )
        .unwrap();
        assert!(track.primary);
        assert_eq!(track.delay, None);
        assert_eq!(track.duration, None);
        assert_eq!(track.language.code, "jpn");
    }

    #[test]
    fn test_release_kind_serialization() {
        let json = serde_json::to_string(&ReleaseKind::Simulcast).unwrap();
        assert_eq!(json, r#""simulcast""#);
    }
}
