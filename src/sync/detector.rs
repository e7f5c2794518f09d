//! Frame offset detection between two sampled tracks.

use muxsync_av::{FrameComparator, Result};
use muxsync_common::MediaTrack;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Finds the frame offset at which a candidate track lines up with the
/// reference.
pub struct Detector<'a> {
    comparator: &'a dyn FrameComparator,
    confirmation_frames: usize,
}

impl<'a> Detector<'a> {
    pub fn new(comparator: &'a dyn FrameComparator, confirmation_frames: usize) -> Self {
        Self {
            comparator,
            confirmation_frames: confirmation_frames.max(1),
        }
    }

    /// Delay in frames of `candidate` relative to `reference`.
    ///
    /// Reference frames are tried in order; for each, candidate frames at
    /// or after the same index are tried in order. A matching pair only
    /// counts if the following frames keep matching for
    /// `confirmation_frames` pairs, or until either track runs out. The
    /// first confirmed pair `(j, i)` gives a delay of `i - j`.
    ///
    /// Confirmation steps both tracks one frame at a time, so it assumes a
    /// shared frame rate. Moving content sampled at different rates will
    /// usually not confirm and the track is left unsynced.
    pub fn find_offset(&self, reference: &[PathBuf], candidate: &[PathBuf]) -> Result<Option<u32>> {
        self.find_offset_with_progress(reference, candidate, |_| {})
    }

    /// Like [`find_offset`](Self::find_offset), calling `progress` with the
    /// completed percentage before each reference frame.
    pub fn find_offset_with_progress(
        &self,
        reference: &[PathBuf],
        candidate: &[PathBuf],
        mut progress: impl FnMut(u32),
    ) -> Result<Option<u32>> {
        for j in 0..reference.len() {
            progress(((j * 100).div_ceil(reference.len())) as u32);

            if j >= candidate.len() {
                break;
            }

            let hit = (j..candidate.len()).into_par_iter().find_map_first(|i| {
                match self.confirmed(reference, candidate, j, i) {
                    Ok(true) => Some(Ok(i)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                }
            });

            if let Some(i) = hit.transpose()? {
                return Ok(Some((i - j) as u32));
            }
        }

        Ok(None)
    }

    fn confirmed(&self, reference: &[PathBuf], candidate: &[PathBuf], j: usize, i: usize) -> Result<bool> {
        if !self.comparator.frames_equal(&reference[j], &candidate[i])? {
            return Ok(false);
        }

        let run = self
            .confirmation_frames
            .min(reference.len() - j)
            .min(candidate.len() - i);

        for t in 1..run {
            if !self
                .comparator
                .frames_equal(&reference[j + t], &candidate[i + t])?
            {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Ordering used to pick the reference and the alignment order: shortest
/// first, unknown durations after every known one.
pub fn duration_order(a: &MediaTrack, b: &MediaTrack) -> Ordering {
    match (a.duration, b.duration) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
