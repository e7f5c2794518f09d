//! Copying detected delays onto subtitles.

use muxsync_common::{MediaTrack, SubtitleTrack};

/// Give subtitles the delay of the media track they belong to.
///
/// A subtitle belongs to a delayed track when they share a language code
/// and the track is primary or the subtitle is closed-caption. The frame
/// rate is copied along with the delay.
pub fn propagate_delays(
    tracks: &[MediaTrack],
    subtitles: Vec<SubtitleTrack>,
) -> Vec<SubtitleTrack> {
    subtitles
        .into_iter()
        .map(|mut subtitle| {
            let owner = tracks.iter().find(|track| {
                track.delay.is_some()
                    && track.language.code == subtitle.language.code
                    && (track.primary || subtitle.closed_caption)
            });

            if let Some(track) = owner {
                subtitle.delay = track.delay;
                subtitle.frame_rate = track.frame_rate;
            }
            subtitle
        })
        .collect()
}
