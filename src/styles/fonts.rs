//! Font-family cleaning
//!
//! A computed `font-family` is a comma-separated fallback list. Each entry is
//! trimmed and unquoted; entries mentioning `system-ui` or `generic` are
//! engine fallbacks and are skipped. Generic family keywords such as
//! `sans-serif` do not match either substring and pass through.

use std::collections::HashSet;

/// Substrings that mark a font entry as a system fallback
pub const EXCLUDED_FONT_MARKERS: [&str; 2] = ["system-ui", "generic"];

/// Clean one entry of a font-family list.
///
/// Returns `None` for empty entries and excluded fallbacks.
pub fn clean_font_name(piece: &str) -> Option<String> {
    let cleaned: String = piece.trim().chars().filter(|c| *c != '"' && *c != '\'').collect();

    if cleaned.is_empty() {
        return None;
    }
    if EXCLUDED_FONT_MARKERS.iter().any(|m| cleaned.contains(m)) {
        return None;
    }
    Some(cleaned)
}

/// Split a computed font-family value into cleaned font names
pub fn split_font_family(value: &str) -> Vec<String> {
    value.split(',').filter_map(clean_font_name).collect()
}

/// Collect cleaned, distinct font names from font-family values, keeping
/// first-seen order and at most `cap` entries.
///
/// Identity is exact string equality, so `Arial` and `ARIAL` are distinct.
pub fn collect_fonts<I, S>(values: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .flat_map(|v| split_font_family(v.as_ref()))
        .filter(|name| seen.insert(name.clone()))
        .take(cap)
        .collect()
}
