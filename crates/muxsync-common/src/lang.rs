//! ISO 639 language code conversion.
//!
//! Sources usually tag audio with two-letter ISO 639-1 codes while Matroska
//! and MP4 metadata expect the three-letter ISO 639-2/B form.

/// ISO 639-1 to ISO 639-2/B pairs for the languages commonly seen in
/// streaming releases.
const ISO_639_1_TO_2: &[(&str, &str)] = &[
    ("ar", "ara"),
    ("ca", "cat"),
    ("cs", "cze"),
    ("da", "dan"),
    ("de", "ger"),
    ("el", "gre"),
    ("en", "eng"),
    ("es", "spa"),
    ("fi", "fin"),
    ("fr", "fre"),
    ("he", "heb"),
    ("hi", "hin"),
    ("hu", "hun"),
    ("id", "ind"),
    ("it", "ita"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("ms", "may"),
    ("nl", "dut"),
    ("no", "nor"),
    ("pl", "pol"),
    ("pt", "por"),
    ("ro", "rum"),
    ("ru", "rus"),
    ("sv", "swe"),
    ("ta", "tam"),
    ("te", "tel"),
    ("th", "tha"),
    ("tr", "tur"),
    ("uk", "ukr"),
    ("vi", "vie"),
    ("zh", "chi"),
];

/// Convert an ISO 639-1 code into its ISO 639-2/B form.
///
/// Mandarin (`cmn`) maps to `chi`. Unknown codes yield `default`.
///
/// # Examples
///
/// ```
/// use muxsync_common::lang::language_code;
///
/// assert_eq!(language_code("ja", "eng"), "jpn");
/// assert_eq!(language_code("cmn", "eng"), "chi");
/// assert_eq!(language_code("xx", "und"), "und");
/// ```
pub fn language_code<'a>(from: &str, default: &'a str) -> &'a str {
    if from == "cmn" {
        return "chi";
    }

    let from = from.to_ascii_lowercase();
    ISO_639_1_TO_2
        .iter()
        .find(|(two, _)| *two == from)
        .map(|(_, three)| *three)
        .unwrap_or(default)
}
