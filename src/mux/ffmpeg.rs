//! ffmpeg command synthesis.
//!
//! Every source becomes an `-i` input. Stream selection and metadata are
//! collected while inputs are added and emitted after all inputs, in input
//! order. Subtitle inputs come last so their input index is the number of
//! media inputs plus their position.

use super::{shift_millis, CommandLine};
use crate::job::MergeJob;
use muxsync_common::MediaTrack;

/// Build the ffmpeg arguments for `job`, without the program name.
pub fn build_ffmpeg_command(job: &MergeJob) -> CommandLine {
    let mut cmd = CommandLine::new();
    let mut streams = CommandLine::new();

    let mut input = 0usize;
    let mut audio = 0usize;
    let mut video = 0usize;
    let mut has_video = false;

    for track in &job.video_and_audio {
        if has_video {
            push_seek(&mut cmd, shift_millis(track.offset(), &track.path));
        }
        cmd.arg("-i").path(&track.path);

        if !has_video || job.keep_all_videos {
            streams
                .arg("-map")
                .arg(format!("{input}:a"))
                .arg("-map")
                .arg(format!("{input}:v"));
            push_language(&mut streams, audio, track);
            push_video_title(&mut streams, job, video);
            video += 1;
            has_video = true;
        } else {
            streams.arg("-map").arg(format!("{input}:a"));
            push_language(&mut streams, audio, track);
        }
        audio += 1;
        input += 1;
    }

    for track in &job.video_only {
        if has_video && !job.keep_all_videos {
            continue;
        }
        cmd.arg("-i").path(&track.path);
        streams
            .arg("-map")
            .arg(input.to_string())
            .arg("-map")
            .arg(format!("-{input}:a"));
        push_video_title(&mut streams, job, video);
        video += 1;
        has_video = true;
        input += 1;
    }

    for track in &job.audio_only {
        cmd.arg("-i").path(&track.path);
        streams.arg("-map").arg(input.to_string());
        push_language(&mut streams, audio, track);
        audio += 1;
        input += 1;
    }

    for subtitle in &job.subtitles {
        push_seek(&mut cmd, shift_millis(subtitle.offset(), &subtitle.path));
        cmd.arg("-i").path(&subtitle.path);
    }

    if job.container.supports_attachments() {
        for (k, font) in job.fonts.iter().enumerate() {
            cmd.arg("-attach")
                .path(&font.path)
                .arg(format!("-metadata:s:t:{k}"))
                .arg(format!("mimetype={}", font.mime));
        }
    }

    cmd.append(streams);

    for k in 0..job.subtitles.len() {
        cmd.arg("-map").arg((input + k).to_string());
    }

    cmd.args(["-c:v", "copy", "-c:a", "copy", "-c:s"])
        .arg(job.container.subtitle_codec());

    for (k, subtitle) in job.subtitles.iter().enumerate() {
        cmd.arg(format!("-metadata:s:s:{k}"))
            .labeled("title=", job.subtitle_title(subtitle))
            .arg(format!("-metadata:s:s:{k}"))
            .arg(format!("language={}", subtitle.language.code));
    }

    cmd.args(job.passthrough.ffmpeg.iter().cloned());
    cmd.path(&job.output);
    cmd
}

fn push_seek(cmd: &mut CommandLine, millis: Option<u64>) {
    if let Some(ms) = millis {
        cmd.arg("-ss").arg(format!("{ms}ms"));
    }
}

fn push_language(streams: &mut CommandLine, audio: usize, track: &MediaTrack) {
    streams
        .arg(format!("-metadata:s:a:{audio}"))
        .arg(format!("language={}", track.language.code));
}

fn push_video_title(streams: &mut CommandLine, job: &MergeJob, video: usize) {
    if let Some(title) = &job.video_title {
        streams
            .arg(format!("-metadata:s:v:{video}"))
            .labeled("title=", title.as_str());
    }
}
