//! Website style extraction
//!
//! ```text
//! URL ──▶ StyleExtractor ──▶ PageStyleSource (Chromium via CDP)
//!               │                   │
//!               │                   ▼
//!               │          in-page routine: computed colors + fonts
//!               ▼
//!     transparency filter ─▶ hex normalization ─▶ dedup + caps
//!               │
//!               ▼
//!      ScrapedStyles { colors ≤ 10, fonts ≤ 5 }
//! ```

pub mod chrome;
pub mod color;
pub mod extractor;
pub mod fonts;

pub use chrome::ChromeStyleSource;
pub use color::{is_transparent, normalize_color, normalize_colors};
pub use extractor::{
    PageStyleSource, RawStyles, ScrapedStyles, StyleExtractor, MAX_COLORS, MAX_FONTS,
};
pub use fonts::{clean_font_name, collect_fonts, split_font_family};
