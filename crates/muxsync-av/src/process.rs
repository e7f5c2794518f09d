//! Running the muxer binaries.

use crate::{Error, Result};
use std::path::Path;
use std::process::Command;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes an external program to completion.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit.
    ///
    /// A non-zero exit is not an error at this level; callers decide which
    /// codes they accept.
    fn run(&self, program: &Path, args: &[String]) -> Result<ExitOutcome>;
}

/// [`ProcessRunner`] using [`std::process::Command`] with inherited stdio,
/// so the muxer's progress output reaches the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<ExitOutcome> {
        let tool = program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| program.to_string_lossy().to_string());

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {} with {} arguments", tool, args.len());

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| Error::spawn(&tool, e))?;

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}
