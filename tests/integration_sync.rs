//! Alignment integration tests
//!
//! Frames are rendered as real PNG files into each track's workspace and
//! compared with the image-based comparator.

use image::{GrayImage, Luma};
use muxsync::config::CleanupPolicy;
use muxsync::job::{Defaults, MergeJob, Passthrough};
use muxsync::merger::Merger;
use muxsync::mux::{build_mkvmerge_command, Container};
use muxsync::sync::{SyncSettings, SyncStatus, Synchronizer};
use muxsync_av::{
    FrameSampler, FrameWorkspace, ImageComparator, MediaInfo, Prober, Result as AvResult,
    SystemRunner, VideoStream,
};
use muxsync_common::{Language, MediaTrack, ReleaseKind, SubtitleTrack};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A track: `lead_in` black frames, then pictures numbered from
/// `first_picture`.
struct Clip {
    duration: f64,
    lead_in: usize,
    first_picture: usize,
}

struct FakeProber<'a> {
    clips: &'a HashMap<PathBuf, Clip>,
}

impl Prober for FakeProber<'_> {
    fn probe(&self, path: &Path) -> AvResult<MediaInfo> {
        let clip = &self.clips[path];
        Ok(MediaInfo {
            file_path: path.to_path_buf(),
            container: "matroska,webm".to_string(),
            duration: Some(clip.duration),
            video: Some(VideoStream {
                index: 0,
                codec: "h264".to_string(),
                width: 64,
                height: 36,
                duration: Some(clip.duration),
                frame_rate: Some(24.0),
            }),
            audio_streams: 1,
            subtitle_streams: 0,
        })
    }
}

/// Renders frames the way ffmpeg would name them.
struct RenderingSampler<'a> {
    clips: &'a HashMap<PathBuf, Clip>,
    scene_frames: usize,
}

/// A picture that differs clearly from every other picture number.
fn picture(number: usize) -> GrayImage {
    GrayImage::from_fn(64, 36, |x, y| {
        let cell = (x / 8 + y / 6 * 8) as usize;
        if (number >> (cell % 12)) & 1 == 1 || cell == number % 48 {
            Luma([230])
        } else {
            Luma([20])
        }
    })
}

impl FrameSampler for RenderingSampler<'_> {
    fn sample(&self, input: &Path, workspace: &FrameWorkspace) -> AvResult<Vec<PathBuf>> {
        let clip = &self.clips[input];
        let black = GrayImage::new(64, 36);

        let mut frames = Vec::new();
        for n in 0..clip.lead_in + self.scene_frames {
            let path = workspace.frame_path(n + 1);
            let frame = if n < clip.lead_in {
                black.clone()
            } else {
                picture(n - clip.lead_in + clip.first_picture)
            };
            frame.save(&path)?;
            frames.push(path);
        }
        Ok(frames)
    }
}

fn clips() -> HashMap<PathBuf, Clip> {
    let mut clips = HashMap::new();
    clips.insert(
        PathBuf::from("/media/show.jpn.mkv"),
        Clip {
            duration: 1420.0,
            lead_in: 0,
            first_picture: 1,
        },
    );
    clips.insert(
        PathBuf::from("/media/show.eng.mkv"),
        Clip {
            duration: 1421.5,
            lead_in: 12,
            first_picture: 1,
        },
    );
    clips
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
        defaults: Defaults::default(),
        video_and_audio: vec![
            MediaTrack::new("/media/show.eng.mkv", Language::new("eng", "English")).primary(),
            MediaTrack::new("/media/show.jpn.mkv", Language::new("jpn", "Japanese")),
        ],
        video_only: Vec::new(),
        audio_only: Vec::new(),
        subtitles: vec![
            SubtitleTrack::new("/media/show.eng.ass", Language::new("eng", "English")),
            SubtitleTrack::new("/media/show.jpn.ass", Language::new("jpn", "Japanese")),
        ],
        fonts: Vec::new(),
        passthrough: Passthrough::default(),
    }
}

#[test]
fn test_detects_lead_in_with_rendered_frames() {
    let clips = clips();
    let prober = FakeProber { clips: &clips };
    let sampler = RenderingSampler {
        clips: &clips,
        scene_frames: 40,
    };
    let comparator = ImageComparator::default();
    let temp = tempfile::tempdir().unwrap();
    let synchronizer = Synchronizer::new(
        &prober,
        &sampler,
        &comparator,
        SyncSettings {
            confirmation_frames: 30,
            temp_dir: Some(temp.path().to_path_buf()),
        },
    );

    let runner = SystemRunner;
    let mut merger = Merger::new(job(), &runner, CleanupPolicy::Never);
    let report = merger.create_delays(&synchronizer);

    assert_eq!(report.reference(), Some("jpn"));
    assert_eq!(report.tracks[1].status, SyncStatus::Synced { delay: 12 });

    let job = merger.job();
    assert_eq!(job.video_and_audio[0].language.code, "jpn");
    assert_eq!(job.video_and_audio[1].delay, Some(12));
    assert_eq!(job.video_and_audio[1].delay_millis(), Some(500));

    // The primary eng track passes its delay to the eng subtitle only.
    assert_eq!(job.subtitles[0].delay, Some(12));
    assert_eq!(job.subtitles[1].delay, None);

    let mkvmerge = build_mkvmerge_command(job);
    assert!(mkvmerge.has_pair("--sync", "1:-500"));
    assert!(mkvmerge.has_pair("--sync", "0:-500"));

    // Every frame directory was removed.
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_unrelated_footage_stays_unsynced() {
    let mut clips = clips();
    clips.insert(
        PathBuf::from("/media/show.eng.mkv"),
        Clip {
            duration: 1500.0,
            lead_in: 5,
            first_picture: 1000,
        },
    );
    let prober = FakeProber { clips: &clips };
    let sampler = RenderingSampler {
        clips: &clips,
        scene_frames: 30,
    };
    let comparator = ImageComparator::default();
    let synchronizer = Synchronizer::new(&prober, &sampler, &comparator, SyncSettings::default());

    let (tracks, report) = synchronizer.create_delays(job().video_and_audio);
    assert_eq!(report.unsynced(), 1);
    assert_eq!(tracks[1].delay, None);
}
