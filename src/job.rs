//! Merge jobs: the TOML job file and its normalized form.
//!
//! A job file is deserialized into a [`JobSpec`] and turned into an
//! immutable [`MergeJob`] by [`JobSpec::normalize`]. Nothing changes the
//! job's options afterwards; only the track records are replaced when delays
//! are detected.

use crate::config::Config;
use crate::fonts::{font_from_path, make_fonts_list};
use crate::mux::Container;
use anyhow::Context;
use muxsync_common::lang::language_code;
use muxsync_common::{Error, Font, Language, MediaTrack, ReleaseKind, Result, SubtitleTrack};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default language per track kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Language code of the default audio track.
    #[serde(default)]
    pub audio: Option<String>,
    /// Language code of the default subtitle track.
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// Extra arguments handed to each backend unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Passthrough {
    #[serde(default)]
    pub ffmpeg: Vec<String>,
    #[serde(default)]
    pub mkvmerge: Vec<String>,
}

/// A job file as written by the user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobSpec {
    pub output: PathBuf,

    #[serde(default)]
    pub video_title: Option<String>,

    #[serde(default)]
    pub release: ReleaseKind,

    /// Overrides `merge.cc_tag` from the configuration.
    #[serde(default)]
    pub cc_tag: Option<String>,

    #[serde(default)]
    pub keep_all_videos: bool,

    /// Source files carry audio as track 0 and video as track 1.
    #[serde(default)]
    pub inverse_track_order: bool,

    #[serde(default)]
    pub skip_subtitle_mux: bool,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub video_and_audio: Vec<MediaTrack>,

    #[serde(default)]
    pub video_only: Vec<MediaTrack>,

    #[serde(default)]
    pub audio_only: Vec<MediaTrack>,

    #[serde(default)]
    pub subtitles: Vec<SubtitleTrack>,

    /// Font files attached in addition to those resolved from subtitles.
    #[serde(default)]
    pub fonts: Vec<PathBuf>,

    /// Overrides `fonts.dir` from the configuration.
    #[serde(default)]
    pub fonts_dir: Option<PathBuf>,

    #[serde(default)]
    pub passthrough: Passthrough,
}

impl JobSpec {
    /// Anchor every relative path of the job at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        anchor(&mut self.output);
        self.video_and_audio
            .iter_mut()
            .chain(self.video_only.iter_mut())
            .chain(self.audio_only.iter_mut())
            .for_each(|t| anchor(&mut t.path));
        self.subtitles.iter_mut().for_each(|s| anchor(&mut s.path));
        self.fonts.iter_mut().for_each(anchor);
        if let Some(dir) = self.fonts_dir.as_mut() {
            anchor(dir);
        }
    }

    /// Produce the immutable job.
    ///
    /// Subtitles are dropped when `skip_subtitle_mux` is set, double quotes
    /// in the video title become single quotes, two-letter language codes
    /// are converted to ISO 639-2 and fonts are resolved.
    pub fn normalize(mut self, config: &Config) -> Result<MergeJob> {
        if self.output.as_os_str().is_empty() {
            return Err(Error::invalid_input("Job has no output path"));
        }
        if self.video_and_audio.is_empty()
            && self.video_only.is_empty()
            && self.audio_only.is_empty()
        {
            return Err(Error::invalid_input("Job has no media tracks"));
        }

        self.video_and_audio
            .iter_mut()
            .chain(self.video_only.iter_mut())
            .chain(self.audio_only.iter_mut())
            .for_each(|t| normalize_code(&mut t.language));
        self.subtitles
            .iter_mut()
            .for_each(|s| normalize_code(&mut s.language));
        for code in [&mut self.defaults.audio, &mut self.defaults.subtitle]
            .into_iter()
            .flatten()
        {
            *code = language_code(code.as_str(), code.as_str()).to_string();
        }

        let subtitles = if self.skip_subtitle_mux {
            Vec::new()
        } else {
            self.subtitles
        };

        let mut fonts: Vec<Font> = Vec::new();
        if let Some(dir) = self.fonts_dir.as_ref().or(config.fonts.dir.as_ref()) {
            fonts.extend(make_fonts_list(dir, &subtitles, &config.fonts.families));
        }
        for path in &self.fonts {
            match font_from_path(path) {
                Some(font) if !fonts.iter().any(|f| f.path == font.path) => fonts.push(font),
                Some(_) => {}
                None => tracing::warn!("Skipping missing or empty font file {:?}", path),
            }
        }

        let container = Container::from_path(&self.output);

        Ok(MergeJob {
            output: self.output,
            container,
            video_title: self.video_title.map(|t| t.replace('"', "'")),
            release: self.release,
            cc_tag: self.cc_tag.unwrap_or_else(|| config.merge.cc_tag.clone()),
            keep_all_videos: self.keep_all_videos,
            inverse_track_order: self.inverse_track_order,
            defaults: self.defaults,
            video_and_audio: self.video_and_audio,
            video_only: self.video_only,
            audio_only: self.audio_only,
            subtitles,
            fonts,
            passthrough: self.passthrough,
        })
    }
}

fn normalize_code(language: &mut Language) {
    language.code = language_code(&language.code, &language.code).to_string();
}

/// A normalized merge job.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeJob {
    pub output: PathBuf,
    pub container: Container,
    pub video_title: Option<String>,
    pub release: ReleaseKind,
    pub cc_tag: String,
    pub keep_all_videos: bool,
    pub inverse_track_order: bool,
    pub defaults: Defaults,
    pub video_and_audio: Vec<MediaTrack>,
    pub video_only: Vec<MediaTrack>,
    pub audio_only: Vec<MediaTrack>,
    pub subtitles: Vec<SubtitleTrack>,
    pub fonts: Vec<Font>,
    pub passthrough: Passthrough,
}

impl MergeJob {
    /// Whether `code` is the configured default audio language.
    pub fn is_default_audio(&self, code: &str) -> bool {
        self.defaults.audio.as_deref() == Some(code)
    }

    /// Whether `code` is the configured default subtitle language.
    pub fn is_default_subtitle(&self, code: &str) -> bool {
        self.defaults.subtitle.as_deref() == Some(code)
    }

    /// Title of a subtitle track: its language title plus the CC tag.
    pub fn subtitle_title(&self, subtitle: &SubtitleTrack) -> String {
        let title = subtitle.language.display_title();
        if subtitle.closed_caption {
            format!("{} {}", title, self.cc_tag)
        } else {
            title.to_string()
        }
    }

    /// Every source file the job reads, media first, then subtitles.
    pub fn source_paths(&self) -> Vec<&Path> {
        self.audio_only
            .iter()
            .chain(&self.video_only)
            .chain(&self.video_and_audio)
            .map(|t| t.path.as_path())
            .chain(self.subtitles.iter().map(|s| s.path.as_path()))
            .collect()
    }
}

/// Read, anchor and normalize a job file.
pub fn load_job(path: &Path, config: &Config) -> anyhow::Result<MergeJob> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file: {:?}", path))?;

    let mut spec: JobSpec = toml::from_str(&content)
        .with_context(|| format!("Failed to parse job file: {:?}", path))?;

    if let Some(base) = path.parent() {
        spec.resolve_paths(base);
    }

    spec.normalize(config)
        .with_context(|| format!("Invalid job file: {:?}", path))
}
