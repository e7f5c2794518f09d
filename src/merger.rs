//! Merge orchestration: delays, command synthesis, execution and cleanup.

use crate::config::CleanupPolicy;
use crate::job::MergeJob;
use crate::mux::{build_command, Backend, BackendSelection, CommandLine};
use crate::sync::{propagate_delays, SyncReport, Synchronizer};
use muxsync_av::ProcessRunner;
use std::io;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// How a merge ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The muxer exited with 0.
    Success,
    /// mkvmerge exited with 1: the output was written but warnings were
    /// printed.
    CompletedWithWarnings,
    /// No usable backend was installed; nothing ran.
    Skipped,
}

impl MergeOutcome {
    /// Whether an output file was produced.
    pub fn produced_output(&self) -> bool {
        matches!(self, Self::Success | Self::CompletedWithWarnings)
    }
}

/// Errors returned by [`Merger`].
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The muxer exited with a code that means failure.
    #[error("[{backend}] Merging failed with exit code {}", describe_code(.code))]
    Failed { backend: Backend, code: Option<i32> },

    /// The muxer could not be started.
    #[error(transparent)]
    Av(#[from] muxsync_av::Error),

    /// Source files could not be removed.
    #[error(transparent)]
    Cleanup(#[from] muxsync_common::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

/// Owns a [`MergeJob`] from delay detection to cleanup.
pub struct Merger<'a> {
    job: MergeJob,
    runner: &'a dyn ProcessRunner,
    cleanup: CleanupPolicy,
}

impl<'a> Merger<'a> {
    pub fn new(job: MergeJob, runner: &'a dyn ProcessRunner, cleanup: CleanupPolicy) -> Self {
        Self {
            job,
            runner,
            cleanup,
        }
    }

    pub fn job(&self) -> &MergeJob {
        &self.job
    }

    pub fn into_job(self) -> MergeJob {
        self.job
    }

    /// Align the job's video+audio tracks and pass the delays on to their
    /// subtitles. Does nothing for jobs with fewer than two such tracks.
    pub fn create_delays(&mut self, synchronizer: &Synchronizer<'_>) -> SyncReport {
        if self.job.video_and_audio.len() <= 1 {
            debug!("Fewer than two video+audio tracks, skipping sync");
            return SyncReport::default();
        }

        let tracks = std::mem::take(&mut self.job.video_and_audio);
        let (tracks, report) = synchronizer.create_delays(tracks);

        let subtitles = std::mem::take(&mut self.job.subtitles);
        self.job.subtitles = propagate_delays(&tracks, subtitles);
        self.job.video_and_audio = tracks;

        report
    }

    /// The command `backend` would run.
    pub fn command(&self, backend: Backend) -> CommandLine {
        build_command(backend, &self.job)
    }

    /// Run the selected muxer.
    pub fn merge(&self, selection: &BackendSelection) -> Result<MergeOutcome, MergeError> {
        let Some(selected) = &selection.muxer else {
            warn!("Unable to merge files, no usable backend");
            return Ok(MergeOutcome::Skipped);
        };
        let backend = selected.backend;

        let command = self.command(backend);
        info!("[{}] Started merging", backend);
        debug!("{} {}", selected.binary.display(), command);

        let exit = self.runner.run(&selected.binary, &command.to_args())?;

        if exit.is_success() {
            info!("[{}] Done", backend);
            Ok(MergeOutcome::Success)
        } else if exit.code.is_some() && exit.code == backend.warning_exit_code() {
            info!("[{}] Mkvmerge finished with at least one warning", backend);
            Ok(MergeOutcome::CompletedWithWarnings)
        } else {
            error!(
                "[{}] Merging failed with exit code {}",
                backend,
                describe_code(&exit.code)
            );
            Err(MergeError::Failed {
                backend,
                code: exit.code,
            })
        }
    }

    /// Delete every source file of the job.
    ///
    /// Files that are already gone are skipped. Every file is attempted;
    /// failures are reported together. Returns the number of files removed.
    pub fn clean_up(&self) -> muxsync_common::Result<usize> {
        let mut removed = 0;
        let mut failures: Vec<(PathBuf, String)> = Vec::new();

        for path in self.job.source_paths() {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    debug!("Removed {:?}", path);
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => failures.push((path.to_path_buf(), e.to_string())),
            }
        }

        if failures.is_empty() {
            Ok(removed)
        } else {
            for (path, reason) in &failures {
                warn!("Failed to remove {:?}: {}", path, reason);
            }
            Err(muxsync_common::Error::Cleanup { failures })
        }
    }

    /// Merge, then clean up according to the policy.
    ///
    /// A skipped merge never deletes sources. A cleanup failure after a
    /// failed merge is logged and the merge error returned.
    pub fn run(&self, selection: &BackendSelection) -> Result<MergeOutcome, MergeError> {
        let result = match self.merge(selection) {
            Ok(MergeOutcome::Skipped) => return Ok(MergeOutcome::Skipped),
            other => other,
        };

        let produced = matches!(&result, Ok(outcome) if outcome.produced_output());
        if !self.cleanup.applies(produced) {
            return result;
        }

        match (self.clean_up(), result) {
            (Ok(removed), result) => {
                info!("Removed {} source file(s)", removed);
                result
            }
            (Err(e), Ok(_)) => Err(e.into()),
            (Err(e), Err(merge_err)) => {
                error!("{}", e);
                Err(merge_err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Defaults, Passthrough};
    use crate::mux::{Container, SelectedBackend};
    use assert_matches::assert_matches;
    use muxsync_av::{ExitOutcome, Result as AvResult};
    use muxsync_common::{Language, MediaTrack, ReleaseKind};
    use std::path::Path;
    use std::sync::Mutex;

    struct FakeRunner {
        code: Option<i32>,
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    }

    impl FakeRunner {
        fn exiting(code: Option<i32>) -> Self {
            Self {
                code,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(&self, program: &Path, args: &[String]) -> AvResult<ExitOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec()));
            Ok(ExitOutcome { code: self.code })
        }
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
            video_and_audio: vec![MediaTrack::new(
                "/in/jpn.mkv",
                Language::new("jpn", "Japanese"),
            )],
            video_only: Vec::new(),
            audio_only: Vec::new(),
            subtitles: Vec::new(),
            fonts: Vec::new(),
            passthrough: Passthrough::default(),
        }
    }

    fn selection(backend: Backend) -> BackendSelection {
        BackendSelection {
            muxer: Some(SelectedBackend {
                backend,
                binary: PathBuf::from(format!("/usr/bin/{backend}")),
            }),
            auxiliary: None,
        }
    }

    #[test]
    fn test_merge_runs_selected_binary() {
        let runner = FakeRunner::exiting(Some(0));
        let merger = Merger::new(job(), &runner, CleanupPolicy::Never);

        let outcome = merger.merge(&selection(Backend::Mkvmerge)).unwrap();
        assert_eq!(outcome, MergeOutcome::Success);

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/usr/bin/mkvmerge"));
        assert_eq!(calls[0].1, merger.command(Backend::Mkvmerge).to_args());
    }

    #[test]
    fn test_mkvmerge_exit_one_is_warning() {
        let runner = FakeRunner::exiting(Some(1));
        let merger = Merger::new(job(), &runner, CleanupPolicy::Never);
        assert_eq!(
            merger.merge(&selection(Backend::Mkvmerge)).unwrap(),
            MergeOutcome::CompletedWithWarnings
        );
    }

    #[test]
    fn test_ffmpeg_exit_one_is_failure() {
        let runner = FakeRunner::exiting(Some(1));
        let merger = Merger::new(job(), &runner, CleanupPolicy::Never);
        let err = merger.merge(&selection(Backend::Ffmpeg)).unwrap_err();
        assert_matches!(
            err,
            MergeError::Failed {
                backend: Backend::Ffmpeg,
                code: Some(1)
            }
        );
    }

    #[test]
    fn test_signal_is_failure() {
        let runner = FakeRunner::exiting(None);
        let merger = Merger::new(job(), &runner, CleanupPolicy::Never);
        let err = merger.merge(&selection(Backend::Mkvmerge)).unwrap_err();
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_empty_selection_skips() {
        let runner = FakeRunner::exiting(Some(0));
        let merger = Merger::new(job(), &runner, CleanupPolicy::Always);
        assert_eq!(
            merger.run(&BackendSelection::default()).unwrap(),
            MergeOutcome::Skipped
        );
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_create_delays_is_noop_for_single_track() {
        struct Unused;
        impl muxsync_av::Prober for Unused {
            fn probe(&self, _: &Path) -> AvResult<muxsync_av::MediaInfo> {
                panic!("single-track jobs are never probed")
            }
        }
        impl muxsync_av::FrameSampler for Unused {
            fn sample(
                &self,
                _: &Path,
                _: &muxsync_av::FrameWorkspace,
            ) -> AvResult<Vec<PathBuf>> {
                panic!("single-track jobs are never sampled")
            }
        }
        impl muxsync_av::FrameComparator for Unused {
            fn frames_equal(&self, _: &Path, _: &Path) -> AvResult<bool> {
                panic!("single-track jobs are never compared")
            }
        }

        let runner = FakeRunner::exiting(Some(0));
        let mut merger = Merger::new(job(), &runner, CleanupPolicy::Never);
        let synchronizer = Synchronizer::new(&Unused, &Unused, &Unused, Default::default());
        let report = merger.create_delays(&synchronizer);
        assert!(report.is_empty());
        assert_eq!(merger.job(), &job());
    }
}
