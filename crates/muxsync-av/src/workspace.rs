//! Per-track frame workspaces.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Private directory receiving one track's sampled frames.
///
/// Frames are named `001.png`, `002.png`, ... The directory is removed by
/// [`FrameWorkspace::cleanup`], or on drop as a fallback.
///
/// # Example
///
/// ```no_run
/// use muxsync_av::FrameWorkspace;
///
/// let workspace = FrameWorkspace::new("jpn")?;
/// // ffmpeg -i input.mkv -t 15 <workspace.frame_pattern()>
/// println!("{}", workspace.frame_path(1).display());
/// workspace.cleanup()?;
/// # Ok::<(), muxsync_av::Error>(())
/// ```
#[derive(Debug)]
pub struct FrameWorkspace {
    temp_dir: TempDir,
    label: String,
}

impl FrameWorkspace {
    /// Create a workspace in the system temp directory.
    pub fn new(label: &str) -> Result<Self> {
        Self::create(label, None)
    }

    /// Create a workspace below `parent`.
    pub fn in_dir(parent: &Path, label: &str) -> Result<Self> {
        Self::create(label, Some(parent))
    }

    fn create(label: &str, parent: Option<&Path>) -> Result<Self> {
        let prefix = format!("muxsync-{}-", sanitize(label));
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let temp_dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::Workspace(format!("failed to create frame dir for {label}: {e}")))?;

        Ok(Self {
            temp_dir,
            label: label.to_string(),
        })
    }

    /// Label the workspace was created for (usually the language code).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Directory holding the frames.
    pub fn frames_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// ffmpeg output pattern for sequential frames.
    pub fn frame_pattern(&self) -> PathBuf {
        self.temp_dir.path().join("%03d.png")
    }

    /// Path of the 1-based frame `number`.
    pub fn frame_path(&self, number: usize) -> PathBuf {
        self.temp_dir.path().join(format!("{number:03}.png"))
    }

    /// Remove the directory and every frame in it.
    ///
    /// A directory that is already gone is not an error.
    pub fn cleanup(self) -> Result<()> {
        match self.temp_dir.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Workspace(format!(
                "failed to remove frame dir for {}: {e}",
                self.label
            ))),
        }
    }
}

/// Keep labels safe for use in a directory name.
fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
