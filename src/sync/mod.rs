//! Frame-based alignment of video+audio tracks.
//!
//! The shortest track is the reference. Every other track is sampled,
//! compared frame by frame against the reference and, when a confirmed match
//! is found, given the frame delay that lines it up.

mod detector;
mod propagate;

pub use detector::{duration_order, Detector};
pub use propagate::propagate_delays;

use crate::config::SyncConfig;
use muxsync_av::{FrameComparator, FrameSampler, FrameWorkspace, Prober};
use muxsync_common::MediaTrack;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Alignment tuning.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub confirmation_frames: usize,
    /// Parent of the per-track frame directories; system temp if `None`.
    pub temp_dir: Option<PathBuf>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            confirmation_frames: 30,
            temp_dir: None,
        }
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            confirmation_frames: config.confirmation_frames,
            temp_dir: config.temp_dir.clone(),
        }
    }
}

/// What alignment concluded for one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncStatus {
    /// The track the others were aligned to.
    Reference,
    /// A confirmed delay in frames.
    Synced { delay: u32 },
    /// No confirmed match inside the sampling window.
    Unsynced,
    /// The track could not be probed or sampled.
    Failed { reason: String },
}

/// Per-track entry of a [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackOutcome {
    pub path: PathBuf,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(flatten)]
    pub status: SyncStatus,
}

/// Result of one alignment run, in the order tracks were returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub tracks: Vec<TrackOutcome>,
}

impl SyncReport {
    /// Language code of the reference track.
    pub fn reference(&self) -> Option<&str> {
        self.tracks
            .iter()
            .find(|t| t.status == SyncStatus::Reference)
            .map(|t| t.language.as_str())
    }

    pub fn synced(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Synced { .. }))
    }

    pub fn unsynced(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Unsynced))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Failed { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn count(&self, pred: impl Fn(&SyncStatus) -> bool) -> usize {
        self.tracks.iter().filter(|t| pred(&t.status)).count()
    }

    fn push(&mut self, track: &MediaTrack, status: SyncStatus) {
        self.tracks.push(TrackOutcome {
            path: track.path.clone(),
            language: track.language.code.clone(),
            frame_rate: track.frame_rate,
            status,
        });
    }
}

/// Probes, samples and aligns video+audio tracks.
pub struct Synchronizer<'a> {
    prober: &'a dyn Prober,
    sampler: &'a dyn FrameSampler,
    comparator: &'a dyn FrameComparator,
    settings: SyncSettings,
}

struct Sampled {
    workspace: Option<FrameWorkspace>,
    frames: Result<Vec<PathBuf>, String>,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        prober: &'a dyn Prober,
        sampler: &'a dyn FrameSampler,
        comparator: &'a dyn FrameComparator,
        settings: SyncSettings,
    ) -> Self {
        Self {
            prober,
            sampler,
            comparator,
            settings,
        }
    }

    /// Detect the delay of every track relative to the shortest one.
    ///
    /// Tracks come back sorted by duration (reference first, unknown
    /// durations last), followed by tracks that could not be probed in
    /// their original order. Probing and sampling run in parallel. Frame
    /// directories are removed before returning.
    pub fn create_delays(&self, tracks: Vec<MediaTrack>) -> (Vec<MediaTrack>, SyncReport) {
        let mut report = SyncReport::default();

        let probed: Vec<(MediaTrack, Result<(), String>)> = tracks
            .into_par_iter()
            .map(|track| self.probe(track))
            .collect();

        let mut aligned = Vec::new();
        let mut failed = Vec::new();
        for (mut track, result) in probed {
            match result {
                Ok(()) => aligned.push(track),
                Err(reason) => {
                    error!("Unable to probe {:?}: {}", track.path, reason);
                    track.delay = None;
                    failed.push((track, reason));
                }
            }
        }

        aligned.sort_by(duration_order);

        if aligned.len() > 1 {
            self.align(&mut aligned, &mut report);
        } else if let Some(only) = aligned.first() {
            report.push(only, SyncStatus::Reference);
        }

        for (track, reason) in failed {
            report.push(&track, SyncStatus::Failed { reason });
            aligned.push(track);
        }

        info!("Processed all files to find a delay.");
        (aligned, report)
    }

    fn probe(&self, mut track: MediaTrack) -> (MediaTrack, Result<(), String>) {
        let result = self
            .prober
            .probe(&track.path)
            .and_then(|info| info.require_video().cloned());

        match result {
            Ok(video) => {
                track.duration = video.duration;
                track.frame_rate = video.frame_rate;
                debug!(
                    "{}: {:?}s at {:?} fps",
                    track.language.code, track.duration, track.frame_rate
                );
                (track, Ok(()))
            }
            Err(e) => (track, Err(e.to_string())),
        }
    }

    fn sample(&self, track: &MediaTrack) -> Sampled {
        let label = &track.language.code;
        let workspace = match &self.settings.temp_dir {
            Some(parent) => FrameWorkspace::in_dir(parent, label),
            None => FrameWorkspace::new(label),
        };

        match workspace {
            Ok(workspace) => {
                let frames = self
                    .sampler
                    .sample(&track.path, &workspace)
                    .map_err(|e| e.to_string());
                Sampled {
                    workspace: Some(workspace),
                    frames,
                }
            }
            Err(e) => Sampled {
                workspace: None,
                frames: Err(e.to_string()),
            },
        }
    }

    fn align(&self, tracks: &mut [MediaTrack], report: &mut SyncReport) {
        let sampled: Vec<Sampled> = tracks.par_iter().map(|t| self.sample(t)).collect();

        let (reference, candidates) = tracks.split_at_mut(1);
        let reference = &reference[0];
        info!("Using {} as the base for syncing", reference.language.code);

        match &sampled[0].frames {
            Ok(ref_frames) => {
                report.push(reference, SyncStatus::Reference);
                for (track, sampled) in candidates.iter_mut().zip(&sampled[1..]) {
                    let status = self.align_one(track, ref_frames, &sampled.frames);
                    report.push(track, status);
                }
            }
            Err(reason) => {
                error!(
                    "Unable to sample reference {:?}: {}",
                    reference.path, reason
                );
                report.push(
                    reference,
                    SyncStatus::Failed {
                        reason: reason.clone(),
                    },
                );
                for track in candidates.iter_mut() {
                    track.delay = None;
                    report.push(track, SyncStatus::Unsynced);
                }
            }
        }

        for workspace in sampled.into_iter().filter_map(|s| s.workspace) {
            let dir = workspace.frames_dir().to_path_buf();
            if let Err(e) = workspace.cleanup() {
                warn!("Failed to remove frame directory {:?}: {}", dir, e);
            }
        }
    }

    fn align_one(
        &self,
        track: &mut MediaTrack,
        ref_frames: &[PathBuf],
        frames: &Result<Vec<PathBuf>, String>,
    ) -> SyncStatus {
        track.delay = None;
        let code = track.language.code.clone();

        let frames = match frames {
            Ok(frames) => frames,
            Err(reason) => {
                error!("Unable to sample {:?}: {}", track.path, reason);
                return SyncStatus::Failed {
                    reason: reason.clone(),
                };
            }
        };

        info!("Trying to find delay for {}...", code);
        let detector = Detector::new(self.comparator, self.settings.confirmation_frames);
        let mut last_logged = None;
        let found = detector.find_offset_with_progress(ref_frames, frames, |pct| {
            let step = pct / 10;
            if last_logged != Some(step) {
                last_logged = Some(step);
                info!("{}: {}%", code, pct);
            }
        });

        match found {
            Ok(Some(delay)) => {
                info!("Found {} frames delay for {}", delay, code);
                track.delay = Some(delay);
                SyncStatus::Synced { delay }
            }
            Ok(None) => {
                error!("Unable to find delay for {}", code);
                SyncStatus::Unsynced
            }
            Err(e) => {
                error!("Comparing frames of {} failed: {}", code, e);
                SyncStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
