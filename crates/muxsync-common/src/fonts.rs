//! Font file MIME types for Matroska attachments.

use std::path::Path;

/// MIME type written for TrueType fonts and collections.
pub const MIME_TRUETYPE: &str = "application/x-truetype-font";
/// MIME type written for OpenType fonts.
pub const MIME_OPENTYPE: &str = "application/vnd.ms-opentype";
/// Fallback MIME type for unknown font formats.
pub const MIME_FALLBACK: &str = "application/octet-stream";

/// Determine the attachment MIME type of a font file from its extension.
///
/// # Examples
///
/// ```
/// use muxsync_common::fonts::font_mime;
///
/// assert_eq!(font_mime("arialbd.ttf"), "application/x-truetype-font");
/// assert_eq!(font_mime("NotoSans.otf"), "application/vnd.ms-opentype");
/// ```
pub fn font_mime(file_name: impl AsRef<Path>) -> &'static str {
    let ext = file_name
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("ttf") | Some("ttc") => MIME_TRUETYPE,
        Some("otf") => MIME_OPENTYPE,
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => MIME_FALLBACK,
    }
}
