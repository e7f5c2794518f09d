use clap::{Parser, Subcommand};
use muxsync::mux::Backend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "muxsync")]
#[command(
    author,
    version,
    about = "Align video, audio and subtitle sources and mux them into one file"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect delays and mux the sources of a job file
    Merge {
        /// Job file describing the sources and output
        #[arg(required = true)]
        job: PathBuf,

        /// Print the muxer command without running it or deleting sources
        #[arg(long)]
        dry_run: bool,

        /// Use this backend if it is installed
        #[arg(long, value_parser = parse_backend)]
        force_backend: Option<Backend>,

        /// Skip delay detection
        #[arg(long)]
        no_sync: bool,
    },

    /// Print the ffmpeg and mkvmerge commands for a job file
    Plan {
        /// Job file describing the sources and output
        #[arg(required = true)]
        job: PathBuf,
    },

    /// Detect and print the delays of a job's video+audio tracks
    Sync {
        /// Job file describing the sources
        #[arg(required = true)]
        job: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display its video stream
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}
