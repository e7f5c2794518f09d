//! Common error types used throughout muxsync.
//!
//! Covers failures that are not tied to an external tool: invalid job input
//! and source files that could not be removed after a merge.

use std::path::PathBuf;

/// Common error type for muxsync.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// One or more source files could not be removed.
    #[error("Failed to remove {} source file(s)", failures.len())]
    Cleanup {
        /// Each path that could not be removed, with the reason.
        failures: Vec<(PathBuf, String)>,
    },
}

impl Error {
    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
