//! mkvmerge command synthesis.
//!
//! mkvmerge options apply to the file that follows them, so every source is
//! emitted as its own block: track selection, sync, names, languages and
//! default flags, then the quoted path.

use super::{shift_millis, CommandLine};
use crate::job::MergeJob;
use muxsync_common::MediaTrack;

/// Build the mkvmerge arguments for `job`, without the program name.
pub fn build_mkvmerge_command(job: &MergeJob) -> CommandLine {
    let mut cmd = CommandLine::new();
    let mut has_video = false;

    cmd.arg("-o").path(&job.output);
    cmd.args(job.passthrough.mkvmerge.iter().cloned());

    for track in &job.video_only {
        if has_video && !job.keep_all_videos {
            continue;
        }
        cmd.args(["--video-tracks", "0", "--no-audio", "--track-name"])
            .labeled("0:", video_track_name(job, track))
            .arg("--language")
            .arg(format!("0:{}", track.language.code))
            .path(&track.path);
        has_video = true;
    }

    let (audio, video) = if job.inverse_track_order {
        (0, 1)
    } else {
        (1, 0)
    };

    for track in &job.video_and_audio {
        if let Some(ms) = shift_millis(track.offset(), &track.path) {
            cmd.arg("--sync").arg(format!("{audio}:-{ms}"));
        }

        let is_default = job.is_default_audio(&track.language.code);
        if !has_video || job.keep_all_videos {
            cmd.arg("--video-tracks")
                .arg(video.to_string())
                .arg("--audio-tracks")
                .arg(audio.to_string())
                .arg("--track-name")
                .labeled(format!("{video}:"), video_track_name(job, track))
                .arg("--language")
                .arg(format!("{audio}:{}", track.language.code));
            push_default(&mut cmd, audio, is_default);
            has_video = true;
        } else {
            cmd.arg("--no-video")
                .arg("--audio-tracks")
                .arg(audio.to_string());
            push_default(&mut cmd, audio, is_default);
            cmd.arg("--track-name")
                .labeled(format!("{audio}:"), track.language.name.as_str())
                .arg("--language")
                .arg(format!("{audio}:{}", track.language.code));
        }
        cmd.path(&track.path);
    }

    for track in &job.audio_only {
        cmd.arg("--track-name")
            .labeled("0:", track.language.name.as_str())
            .arg("--language")
            .arg(format!("0:{}", track.language.code))
            .args(["--no-video", "--audio-tracks", "0"]);
        push_default(&mut cmd, 0, job.is_default_audio(&track.language.code));
        cmd.path(&track.path);
    }

    if job.subtitles.is_empty() {
        cmd.arg("--no-subtitles");
    }
    for subtitle in &job.subtitles {
        if let Some(ms) = shift_millis(subtitle.offset(), &subtitle.path) {
            cmd.arg("--sync").arg(format!("0:-{ms}"));
        }
        cmd.arg("--track-name")
            .labeled("0:", job.subtitle_title(subtitle))
            .arg("--language")
            .arg(format!("0:{}", subtitle.language.code));
        let is_default =
            !subtitle.closed_caption && job.is_default_subtitle(&subtitle.language.code);
        push_default(&mut cmd, 0, is_default);
        cmd.path(&subtitle.path);
    }

    if job.fonts.is_empty() {
        cmd.arg("--no-attachments");
    }
    for font in &job.fonts {
        cmd.arg("--attachment-name")
            .quoted(font.name.as_str())
            .arg("--attachment-mime-type")
            .arg(font.mime.as_str())
            .arg("--attach-file")
            .path(&font.path);
    }

    cmd
}

/// Video track name: the job's video title, else the track language, with
/// the release tag appended.
fn video_track_name(job: &MergeJob, track: &MediaTrack) -> String {
    let base = job
        .video_title
        .as_deref()
        .unwrap_or(&track.language.name);
    format!("{}{}", base, job.release.tag())
}

fn push_default(cmd: &mut CommandLine, track: u32, is_default: bool) {
    cmd.arg("--default-track");
    if is_default {
        cmd.arg(track.to_string());
    } else {
        cmd.arg(format!("{track}:0"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Defaults, Passthrough};
    use crate::mux::Container;
    use muxsync_common::{Font, Language, ReleaseKind, SubtitleTrack};
    use std::path::PathBuf;

    fn track(path: &str, code: &str, name: &str) -> MediaTrack {
        MediaTrack::new(path, Language::new(code, name))
    }

    fn job() -> MergeJob {
        MergeJob {
            output: PathBuf::from("/out/show.mkv"),
            container: Container::Matroska,
            video_title: None,
            release: ReleaseKind::Uncut,
            cc_tag: "CC".to_string(),
            keep_all_videos: false,
            inverse_track_order: false,
            defaults: Defaults {
                audio: Some("jpn".to_string()),
                subtitle: Some("eng".to_string()),
            },
            video_and_audio: Vec::new(),
            video_only: Vec::new(),
            audio_only: Vec::new(),
            subtitles: Vec::new(),
            fonts: Vec::new(),
            passthrough: Passthrough::default(),
        }
    }

    #[test]
    fn test_single_track_layout() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));

        assert_eq!(
            build_mkvmerge_command(&job).render(),
            concat!(
                r#"-o "/out/show.mkv" --video-tracks 0 --audio-tracks 1 "#,
                r#"--track-name 0:"Japanese [Uncut]" --language 1:jpn --default-track 1 "#,
                r#""/in/jpn.mkv" --no-subtitles --no-attachments"#
            )
        );
    }

    #[test]
    fn test_secondary_track_is_audio_only_and_synced() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));
        let mut eng = track("/in/eng.mkv", "eng", "English");
        eng.delay = Some(1);
        eng.frame_rate = Some(24000.0 / 1001.0);
        job.video_and_audio.push(eng);

        let args = build_mkvmerge_command(&job).to_args();
        let sync = args.iter().position(|a| a == "--sync").unwrap();
        assert_eq!(
            &args[sync..sync + 14],
            [
                "--sync",
                "1:-42",
                "--no-video",
                "--audio-tracks",
                "1",
                "--default-track",
                "1:0",
                "--track-name",
                "1:English",
                "--language",
                "1:eng",
                "/in/eng.mkv",
                "--no-subtitles",
                "--no-attachments",
            ]
        );
    }

    #[test]
    fn test_inverse_track_order_swaps_numbers() {
        let mut job = job();
        job.inverse_track_order = true;
        job.video_title = Some("Show".to_string());
        job.release = ReleaseKind::Simulcast;
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));

        let cmd = build_mkvmerge_command(&job);
        assert!(cmd.has_pair("--video-tracks", "1"));
        assert!(cmd.has_pair("--audio-tracks", "0"));
        assert!(cmd.has_pair("--track-name", "1:Show [Simulcast]"));
        assert!(cmd.has_pair("--language", "0:jpn"));
    }

    #[test]
    fn test_missing_frame_rate_keeps_track() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));
        let mut eng = track("/in/eng.mkv", "eng", "English");
        eng.delay = Some(10);
        job.video_and_audio.push(eng);

        let cmd = build_mkvmerge_command(&job);
        assert!(!cmd.contains("--sync"));
        assert!(cmd.contains("/in/eng.mkv"));
    }

    #[test]
    fn test_subtitle_without_frame_rate_is_muxed_unshifted() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));
        let mut sub = SubtitleTrack::new("/in/eng.ass", Language::new("eng", "English"));
        sub.delay = Some(48);
        job.subtitles.push(sub);

        let cmd = build_mkvmerge_command(&job);
        assert!(!cmd.contains("--sync"));
        assert!(!cmd.contains("--no-subtitles"));
        assert!(cmd.has_pair("--track-name", "0:English"));
        assert!(cmd.has_pair("--language", "0:eng"));
        assert!(cmd.contains("/in/eng.ass"));
    }

    #[test]
    fn test_video_only_comes_first_and_claims_video() {
        let mut job = job();
        job.video_only.push(track("/in/video.mkv", "jpn", "Japanese"));
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));

        let args = build_mkvmerge_command(&job).to_args();
        assert_eq!(
            &args[2..11],
            [
                "--video-tracks",
                "0",
                "--no-audio",
                "--track-name",
                "0:Japanese [Uncut]",
                "--language",
                "0:jpn",
                "/in/video.mkv",
                "--no-video",
            ]
        );
    }

    #[test]
    fn test_audio_only_and_subtitles() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));
        job.audio_only.push(track("/in/eng.m4a", "eng", "English"));
        job.subtitles.push(SubtitleTrack::new(
            "/in/eng.ass",
            Language::new("eng", "English"),
        ));
        job.subtitles.push(
            SubtitleTrack::new("/in/eng.cc.ass", Language::new("eng", "English")).closed_caption(),
        );

        let rendered = build_mkvmerge_command(&job).render();
        assert!(rendered.contains(concat!(
            r#"--track-name 0:"English" --language 0:eng --no-video --audio-tracks 0 "#,
            r#"--default-track 0:0 "/in/eng.m4a""#
        )));
        assert!(rendered.contains(
            r#"--track-name 0:"English" --language 0:eng --default-track 0 "/in/eng.ass""#
        ));
        assert!(rendered.contains(
            r#"--track-name 0:"English CC" --language 0:eng --default-track 0:0 "/in/eng.cc.ass""#
        ));
        assert!(!rendered.contains("--no-subtitles"));
    }

    #[test]
    fn test_fonts_are_attached() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));
        job.fonts.push(Font {
            name: "arial.ttf".to_string(),
            path: PathBuf::from("/fonts/arial.ttf"),
            mime: "application/x-truetype-font".to_string(),
        });

        let cmd = build_mkvmerge_command(&job);
        assert!(cmd.has_pair("--attachment-name", "arial.ttf"));
        assert!(cmd.has_pair("--attachment-mime-type", "application/x-truetype-font"));
        assert!(cmd.has_pair("--attach-file", "/fonts/arial.ttf"));
        assert!(!cmd.contains("--no-attachments"));
    }

    #[test]
    fn test_passthrough_follows_output() {
        let mut job = job();
        job.video_and_audio.push(track("/in/jpn.mkv", "jpn", "Japanese"));
        job.passthrough.mkvmerge = vec!["--no-date".to_string()];

        let args = build_mkvmerge_command(&job).to_args();
        assert_eq!(&args[..3], ["-o", "/out/show.mkv", "--no-date"]);
    }
}
