//! Computed-color normalization
//!
//! Browsers serialize computed colors as `rgb(r, g, b)` or
//! `rgba(r, g, b, a)`. Those are turned into lowercase `#rrggbb`; any other
//! form (named colors, `hsl()`, `color(...)`) is dropped.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn rgb_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)(?:,\s*[\d.]+)?\)")
            .expect("rgb pattern is a valid regex")
    })
}

/// Whether a computed color is fully transparent and should be skipped
pub fn is_transparent(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "transparent" || raw == "rgba(0, 0, 0, 0)"
}

/// Convert one computed color string into `#rrggbb`.
///
/// The first `rgb(...)`/`rgba(...)` occurrence is used, so multi-value
/// border colors resolve to their top edge. Channels outside `0..=255`
/// make the whole value invalid. Alpha is discarded.
pub fn normalize_color(raw: &str) -> Option<String> {
    let caps = rgb_pattern().captures(raw)?;

    let mut hex = String::with_capacity(7);
    hex.push('#');
    for idx in 1..=3 {
        let channel: u8 = caps.get(idx)?.as_str().parse().ok()?;
        hex.push_str(&format!("{:02x}", channel));
    }
    Some(hex)
}

/// Normalize a sequence of raw colors, dropping unparseable values and
/// duplicates while keeping first-seen order.
pub fn normalize_colors<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|c| normalize_color(c.as_ref()))
        .filter(|hex| seen.insert(hex.clone()))
        .collect()
}
