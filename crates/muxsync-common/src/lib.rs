//! muxsync-common: the track model shared by every muxsync crate.
//!
//! - **Track model**: [`MediaTrack`], [`SubtitleTrack`], [`Font`] and the
//!   [`Language`] they are tagged with
//! - **Frame math**: [`frames_to_millis`] converts a frame delay into the
//!   millisecond offset both muxer backends expect
//! - **Lookups**: ISO 639 code conversion ([`lang`]) and font MIME types
//!   ([`fonts`])
//! - **Error handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use muxsync_common::{frames_to_millis, Language, MediaTrack};
//!
//! let mut track = MediaTrack::new("episode.jpn.mkv", Language::new("jpn", "Japanese"));
//! track.delay = Some(12);
//! track.frame_rate = Some(24.0);
//!
//! assert_eq!(track.delay_millis(), Some(500));
//! assert_eq!(frames_to_millis(1, 24000.0 / 1001.0), 42);
//! ```

pub mod error;
pub mod fonts;
pub mod lang;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
