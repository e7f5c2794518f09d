mod cli;

use muxsync::{
    config::{self, Config},
    job::{self, MergeJob},
    merger::{MergeOutcome, Merger},
    mux::{select_backends, AvailableBinaries, Backend},
    probe,
    sync::{SyncReport, SyncSettings, SyncStatus, Synchronizer},
};
use muxsync_av::{FfmpegSampler, ImageComparator, SystemRunner};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "muxsync=debug,muxsync_av=debug".to_string()
        } else {
            "muxsync=info,muxsync_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Merge {
            job,
            dry_run,
            force_backend,
            no_sync,
        } => merge_job(&job, cli.config.as_deref(), dry_run, force_backend, no_sync),
        Commands::Plan { job } => plan_job(&job, cli.config.as_deref()),
        Commands::Sync { job, json } => sync_job(&job, cli.config.as_deref(), json),
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("muxsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Probe, sample and compare the job's video+audio tracks.
///
/// Returns `None` when ffmpeg or ffprobe is missing.
fn detect_delays(merger: &mut Merger<'_>, config: &Config) -> Result<Option<SyncReport>> {
    let Some(ffmpeg) = AvailableBinaries::discover(&config.tools).ffmpeg else {
        tracing::warn!("FFmpeg not found, skipping delay detection");
        return Ok(None);
    };
    let prober = match probe::prober(&config.tools) {
        Ok(prober) => prober,
        Err(e) => {
            tracing::warn!("{:#}, skipping delay detection", e);
            return Ok(None);
        }
    };

    let window = config
        .sync
        .window()
        .with_context(|| format!("Invalid sync window: {}", config.sync.window_secs))?;
    let sampler = FfmpegSampler::new(ffmpeg, window);
    let comparator = ImageComparator::new(config.sync.pixel_tolerance, config.sync.max_diff_ratio)
        .with_compare_width(config.sync.compare_width);
    let synchronizer = Synchronizer::new(
        &prober,
        &sampler,
        &comparator,
        SyncSettings::from(&config.sync),
    );

    Ok(Some(merger.create_delays(&synchronizer)))
}

fn merge_job(
    job_path: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    force_backend: Option<Backend>,
    no_sync: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let job = job::load_job(job_path, &config)?;

    tracing::info!("Merging into {:?}", job.output);

    let binaries = AvailableBinaries::discover(&config.tools);
    let force = force_backend.or(config.merge.force_backend);
    let selection = select_backends(&binaries, job.container, force);

    let runner = SystemRunner;
    let cleanup = if dry_run {
        config::CleanupPolicy::Never
    } else {
        config.merge.cleanup
    };
    let mut merger = Merger::new(job, &runner, cleanup);

    if !no_sync && merger.job().video_and_audio.len() > 1 {
        if let Some(report) = detect_delays(&mut merger, &config)? {
            print_report(&report);
        }
    }

    if dry_run {
        match &selection.muxer {
            Some(selected) => {
                println!("[DRY RUN] Would run:");
                println!(
                    "{} {}",
                    selected.binary.display(),
                    merger.command(selected.backend)
                );
            }
            None => println!("[DRY RUN] No usable backend, muxing would be skipped"),
        }
        return Ok(());
    }

    let outcome = merger
        .run(&selection)
        .with_context(|| format!("Failed to merge job {:?}", job_path))?;

    match outcome {
        MergeOutcome::Success => println!("Output: {}", merger.job().output.display()),
        MergeOutcome::CompletedWithWarnings => println!(
            "Output: {} (finished with warnings)",
            merger.job().output.display()
        ),
        MergeOutcome::Skipped => println!("No usable backend found, nothing was muxed"),
    }

    Ok(())
}

fn plan_job(job_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let job = job::load_job(job_path, &config)?;

    print_plan(&job);
    Ok(())
}

fn print_plan(job: &MergeJob) {
    for backend in [Backend::Ffmpeg, Backend::Mkvmerge] {
        println!("{}:", backend);
        println!("  {} {}", backend, muxsync::mux::build_command(backend, job));
    }
}

fn sync_job(job_path: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let job = job::load_job(job_path, &config)?;

    if job.video_and_audio.len() < 2 {
        anyhow::bail!("Delay detection needs at least two video+audio tracks");
    }

    let runner = SystemRunner;
    let mut merger = Merger::new(job, &runner, config::CleanupPolicy::Never);
    let Some(report) = detect_delays(&mut merger, &config)? else {
        anyhow::bail!("ffmpeg and ffprobe are required for delay detection");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        let subtitles = &merger.job().subtitles;
        for subtitle in subtitles.iter().filter(|s| s.delay.is_some()) {
            println!(
                "  subtitle {} ({}): {} frames",
                subtitle.path.display(),
                subtitle.language,
                subtitle.delay.unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    if let Some(reference) = report.reference() {
        println!("Reference: {}", reference);
    }
    for track in &report.tracks {
        let status = match &track.status {
            SyncStatus::Reference => "reference".to_string(),
            SyncStatus::Synced { delay } => match track.frame_rate {
                Some(fps) => format!(
                    "{} frames ({} ms)",
                    delay,
                    muxsync_common::frames_to_millis(*delay, fps)
                ),
                None => format!("{} frames", delay),
            },
            SyncStatus::Unsynced => "no delay found".to_string(),
            SyncStatus::Failed { reason } => format!("failed: {}", reason),
        };
        println!("  {} {}: {}", track.language, track.path.display(), status);
    }
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let media_info = probe::probe_file(file, &config.tools)?;

    if json {
        let json_str = serde_json::to_string_pretty(&media_info)?;
        println!("{}", json_str);
    } else {
        println!("File: {}", media_info.file_path.display());
        println!("Container: {}", media_info.container);
        if let Some(duration) = media_info.duration {
            let secs = duration as u64;
            let mins = secs / 60;
            let hours = mins / 60;
            println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
        }

        match &media_info.video {
            Some(video) => {
                print!("Video: [{}] {} {}x{}", video.index, video.codec, video.width, video.height);
                if let Some(fps) = video.frame_rate {
                    print!(", {:.3} fps", fps);
                }
                println!();
            }
            None => println!("Video: none"),
        }
        println!("Audio streams: {}", media_info.audio_streams);
        println!("Subtitle streams: {}", media_info.subtitle_streams);
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = probe::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!(
        "  Sync window: {}s, confirmation frames: {}",
        config.sync.window_secs, config.sync.confirmation_frames
    );
    println!(
        "  Pixel tolerance: {}, max diff ratio: {}",
        config.sync.pixel_tolerance, config.sync.max_diff_ratio
    );
    match config.merge.force_backend {
        Some(backend) => println!("  Forced backend: {}", backend),
        None => println!("  Forced backend: none"),
    }
    println!("  Cleanup: {:?}", config.merge.cleanup);
    println!("  Font families: {}", config.fonts.families.len());

    Ok(())
}
