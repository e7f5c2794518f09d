//! Resolving subtitle font families into attachable font files.

use muxsync_common::fonts::font_mime;
use muxsync_common::{Font, SubtitleTrack};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Collect the font files needed by `subtitles`.
///
/// Every family a subtitle references is looked up in `families`; each of
/// its files is attached if it exists in `fonts_dir` and is not empty.
/// Families and files are deduplicated, first occurrence wins.
pub fn make_fonts_list(
    fonts_dir: &Path,
    subtitles: &[SubtitleTrack],
    families: &BTreeMap<String, Vec<String>>,
) -> Vec<Font> {
    let mut seen_families = HashSet::new();
    let mut required: Vec<&str> = Vec::new();
    for family in subtitles.iter().flat_map(|s| s.fonts.iter()) {
        if seen_families.insert(family.as_str()) {
            required.push(family);
        }
    }

    if !subtitles.is_empty() {
        let locales: Vec<&str> = subtitles
            .iter()
            .map(|s| s.language.locale_or_code())
            .collect();
        info!(
            "Subtitles: {} (Total: {})",
            locales.join(", "),
            locales.len()
        );
    }
    if !required.is_empty() {
        info!(
            "Required fonts: {} (Total: {})",
            required.join(", "),
            required.len()
        );
    }

    let mut seen_files: HashSet<PathBuf> = HashSet::new();
    let mut fonts = Vec::new();
    for family in required {
        let Some(files) = families.get(family) else {
            debug!("No font files known for family {}", family);
            continue;
        };

        for file in files {
            let path = fonts_dir.join(file);
            if !is_usable_font(&path) || !seen_files.insert(path.clone()) {
                continue;
            }
            fonts.push(Font {
                name: file.clone(),
                mime: font_mime(file).to_string(),
                path,
            });
        }
    }

    fonts
}

/// Build a [`Font`] for an explicitly listed file, if it is usable.
pub fn font_from_path(path: &Path) -> Option<Font> {
    if !is_usable_font(path) {
        return None;
    }
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some(Font {
        mime: font_mime(&name).to_string(),
        name,
        path: path.to_path_buf(),
    })
}

fn is_usable_font(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
