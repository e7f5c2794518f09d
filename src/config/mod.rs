mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./muxsync.toml",
        "~/.config/muxsync/config.toml",
        "/etc/muxsync/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let sync = &config.sync;
    if sync.window().is_none() {
        anyhow::bail!(
            "Sync window must be a positive number of seconds, got {}",
            sync.window_secs
        );
    }

    if sync.confirmation_frames == 0 {
        anyhow::bail!("Sync confirmation frames cannot be 0");
    }

    if !(0.0..=1.0).contains(&sync.max_diff_ratio) {
        anyhow::bail!(
            "Sync max_diff_ratio must be between 0 and 1, got {}",
            sync.max_diff_ratio
        );
    }

    if sync.compare_width == 0 {
        anyhow::bail!("Sync compare width cannot be 0");
    }

    if let Some(dir) = &config.fonts.dir {
        if !dir.exists() {
            tracing::warn!("Fonts directory does not exist: {:?}", dir);
        }
    }

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
        ("mkvmerge", &config.tools.mkvmerge_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mux::Backend;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sync.window_secs, 15.0);
        assert_eq!(config.sync.confirmation_frames, 30);
        assert_eq!(config.merge.cleanup, CleanupPolicy::Always);
        assert_eq!(config.merge.cc_tag, "CC");
        assert!(config.merge.force_backend.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[tools]
mkvmerge_path = "/opt/mkvtoolnix/mkvmerge"

[sync]
window_secs = 20
confirmation_frames = 24

[merge]
force_backend = "ffmpeg"
cleanup = "on-success"
cc_tag = "[CC]"

[fonts]
dir = "/srv/fonts"

[fonts.families]
"Open Sans" = ["OpenSans-Regular.ttf", "OpenSans-Bold.ttf"]
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sync.window_secs, 20.0);
        assert_eq!(config.sync.confirmation_frames, 24);
        assert_eq!(config.sync.pixel_tolerance, 12);
        assert_eq!(config.merge.force_backend, Some(Backend::Ffmpeg));
        assert_eq!(config.merge.cleanup, CleanupPolicy::OnSuccess);
        assert_eq!(config.merge.cc_tag, "[CC]");
        assert_eq!(config.fonts.families["Open Sans"].len(), 2);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let file = write_config("[sync]\nwindow_secs = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("window"));
    }

    #[test]
    fn test_validate_rejects_oversized_window() {
        let file = write_config("[sync]\nwindow_secs = 1e30\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("window"));

        let mut config = Config::default();
        config.sync.window_secs = f64::INFINITY;
        assert!(validate_config(&config).is_err());
        config.sync.window_secs = -2.0;
        assert!(validate_config(&config).is_err());
        config.sync.window_secs = 0.5;
        assert_eq!(config.sync.window(), Some(std::time::Duration::from_millis(500)));
    }

    #[test]
    fn test_validate_rejects_zero_confirmation() {
        let mut config = Config::default();
        config.sync.confirmation_frames = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_ratio_out_of_range() {
        let mut config = Config::default();
        config.sync.max_diff_ratio = 1.5;
        assert!(validate_config(&config).is_err());

        config.sync.max_diff_ratio = 1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unknown_cleanup_policy_fails_to_parse() {
        let file = write_config("[merge]\ncleanup = \"sometimes\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_cleanup_policy_applies() {
        assert!(CleanupPolicy::Always.applies(false));
        assert!(CleanupPolicy::OnSuccess.applies(true));
        assert!(!CleanupPolicy::OnSuccess.applies(false));
        assert!(!CleanupPolicy::Never.applies(true));
        assert_eq!("on-success".parse(), Ok(CleanupPolicy::OnSuccess));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_config(Path::new("/nonexistent/muxsync.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
