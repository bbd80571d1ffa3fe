//! Website style extraction
//!
//! [`StyleExtractor`] turns a URL into a small palette and font list. Loading
//! the page and reading computed style is delegated to a [`PageStyleSource`];
//! the extractor owns the host-side pass (transparency filter, hex
//! normalization, deduplication, caps) and the error boundary.

use crate::error::{Result, ScrapeError};
use crate::styles::color::{is_transparent, normalize_colors};
use crate::styles::fonts::collect_fonts;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Most colors returned for one page
pub const MAX_COLORS: usize = 10;

/// Most font names returned for one page
pub const MAX_FONTS: usize = 5;

/// Default bound for loading and reading one page
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(30);

/// Palette and fonts extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedStyles {
    /// Distinct `#rrggbb` colors in first-seen order, at most [`MAX_COLORS`]
    pub colors: Vec<String>,
    /// Distinct font names in first-seen order, at most [`MAX_FONTS`]
    pub fonts: Vec<String>,
}

/// Raw values collected inside the page, as they cross the browser boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyles {
    /// Computed color strings, e.g. `rgb(59, 130, 246)`
    #[serde(default)]
    pub colors: Vec<String>,
    /// Font names or font-family values
    #[serde(default)]
    pub fonts: Vec<String>,
}

impl RawStyles {
    /// Apply the host-side pass.
    ///
    /// Raw colors are filtered for transparency, deduplicated by exact
    /// string and capped before normalization, then deduplicated again as
    /// hex. Fonts go through the same cleaning the page applies, which is a
    /// no-op for well-formed input.
    pub fn into_scraped(self) -> ScrapedStyles {
        let mut seen = HashSet::new();
        let raw_colors: Vec<&str> = self
            .colors
            .iter()
            .map(String::as_str)
            .filter(|c| !is_transparent(c))
            .filter(|c| seen.insert(*c))
            .take(MAX_COLORS)
            .collect();

        ScrapedStyles {
            colors: normalize_colors(raw_colors),
            fonts: collect_fonts(&self.fonts, MAX_FONTS),
        }
    }
}

/// Something that can load a page and read its computed style.
///
/// Implementations must release every resource they acquire before
/// returning, on success and failure alike.
#[async_trait]
pub trait PageStyleSource: Send + Sync {
    /// Load `url` and collect raw colors and fonts, bounded by `timeout`
    async fn load_and_collect(&self, url: &str, timeout: Duration) -> Result<RawStyles>;
}

/// Extracts a palette and font list from a website
#[derive(Clone)]
pub struct StyleExtractor {
    source: Arc<dyn PageStyleSource>,
    timeout: Duration,
}

impl StyleExtractor {
    /// Create an extractor over any style source
    pub fn new(source: Arc<dyn PageStyleSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_EXTRACT_TIMEOUT,
        }
    }

    /// Override the per-page bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-page bound
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Extract colors and fonts from `url`.
    ///
    /// Failures are logged in full and returned as an opaque [`ScrapeError`].
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> std::result::Result<ScrapedStyles, ScrapeError> {
        let start = Instant::now();

        let raw = self
            .source
            .load_and_collect(url, self.timeout)
            .await
            .map_err(|e| {
                let kind = ScrapeError::from(&e);
                warn!(error = %e, ?kind, "Style extraction failed");
                kind
            })?;

        let styles = raw.into_scraped();
        info!(
            colors = styles.colors.len(),
            fonts = styles.fonts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extracted website styles"
        );
        Ok(styles)
    }
}
