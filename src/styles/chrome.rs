//! Chromium-backed style source
//!
//! Each call launches its own browser session, navigates, runs the
//! collection routine inside the page and closes the session before
//! returning, whatever the outcome.

use crate::browser::{
    BrowserConfig, BrowserSession, NavigationOptions, PageNavigator, SessionLimiter, WaitUntil,
};
use crate::error::{BrowserError, ExtractionError, Result};
use crate::styles::extractor::{PageStyleSource, RawStyles};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Walks every element and collects computed colors and font names.
///
/// Runs in the page; only the JSON result comes back.
pub const COLLECT_STYLES_SCRIPT: &str = r#"
    (() => {
        const colors = new Set();
        const fonts = new Set();
        const visible = (value) =>
            value && value !== 'transparent' && value !== 'rgba(0, 0, 0, 0)';

        for (const element of document.querySelectorAll('*')) {
            const style = window.getComputedStyle(element);

            for (const value of [style.backgroundColor, style.color, style.borderColor]) {
                if (visible(value)) colors.add(value);
            }

            if (!style.fontFamily) continue;
            for (const piece of style.fontFamily.split(',')) {
                const name = piece.trim().replace(/['"]/g, '');
                if (name && !name.includes('system-ui') && !name.includes('generic')) {
                    fonts.add(name);
                }
            }
        }

        return {
            colors: Array.from(colors).slice(0, 10),
            fonts: Array.from(fonts).slice(0, 5),
        };
    })()
"#;

/// Style source that drives a real Chromium through CDP
#[derive(Debug, Clone)]
pub struct ChromeStyleSource {
    config: BrowserConfig,
    limiter: SessionLimiter,
}

impl ChromeStyleSource {
    /// Create a source launching browsers with `config`, at most
    /// `limiter.max_sessions()` at a time
    pub fn new(config: BrowserConfig, limiter: SessionLimiter) -> Self {
        Self { config, limiter }
    }

    /// The browser launch configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The session limiter shared by every call
    pub fn limiter(&self) -> &SessionLimiter {
        &self.limiter
    }

    /// Open a page, load `url` and run the collection script, all before
    /// `deadline`
    async fn collect(
        &self,
        session: &BrowserSession,
        url: &str,
        deadline: Instant,
    ) -> Result<RawStyles> {
        let remaining = time_left(deadline);
        let page = tokio::time::timeout(remaining, session.new_page())
            .await
            .map_err(|_| BrowserError::Timeout(remaining.as_millis() as u64))??;

        let options = NavigationOptions {
            timeout_ms: time_left(deadline).as_millis() as u64,
            wait_until: WaitUntil::NetworkIdle,
            idle_ms: self.config.network_idle_ms,
        };
        let navigation = PageNavigator::goto(&page, url, &options).await?;
        debug!(final_url = %navigation.final_url, "Page ready, collecting styles");

        let remaining = time_left(deadline);
        let evaluation = tokio::time::timeout(remaining, page.evaluate(COLLECT_STYLES_SCRIPT))
            .await
            .map_err(|_| ExtractionError::Timeout(remaining.as_millis() as u64))?
            .map_err(|e| ExtractionError::JsExecutionFailed(e.to_string()))?;

        let raw: RawStyles = evaluation
            .into_value()
            .map_err(|e| ExtractionError::UnexpectedResult(e.to_string()))?;
        Ok(raw)
    }
}

/// Time until `deadline`, zero once it has passed
fn time_left(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

#[async_trait]
impl PageStyleSource for ChromeStyleSource {
    /// Waiting for a slot, launching, loading and evaluating all share one
    /// `timeout` budget. Closing the session afterwards is bounded separately.
    #[instrument(skip(self))]
    async fn load_and_collect(&self, url: &str, timeout: Duration) -> Result<RawStyles> {
        let deadline = Instant::now() + timeout;
        let _permit = self.limiter.acquire(timeout).await?;
        let session = BrowserSession::launch_within(&self.config, time_left(deadline)).await?;

        let collected = self.collect(&session, url, deadline).await;

        if let Err(e) = session.close().await {
            warn!("Browser session did not close cleanly: {}", e);
        }
        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::extractor::{MAX_COLORS, MAX_FONTS};

    #[test]
    fn test_script_caps_match_host_caps() {
        assert!(COLLECT_STYLES_SCRIPT.contains(&format!("slice(0, {})", MAX_COLORS)));
        assert!(COLLECT_STYLES_SCRIPT.contains(&format!("slice(0, {})", MAX_FONTS)));
    }

    #[test]
    fn test_script_reads_computed_style() {
        assert!(COLLECT_STYLES_SCRIPT.contains("getComputedStyle"));
        for property in ["backgroundColor", "style.color", "borderColor", "fontFamily"] {
            assert!(COLLECT_STYLES_SCRIPT.contains(property), "missing {}", property);
        }
    }

    #[test]
    fn test_time_left_saturates() {
        let ahead = Instant::now() + Duration::from_secs(30);
        let left = time_left(ahead);
        assert!(left > Duration::from_secs(29) && left <= Duration::from_secs(30));

        let passed = Instant::now() - Duration::from_millis(10);
        assert_eq!(time_left(passed), Duration::ZERO);
    }

    #[test]
    fn test_source_keeps_limiter() {
        let source = ChromeStyleSource::new(BrowserConfig::default(), SessionLimiter::new(2));
        assert_eq!(source.limiter().max_sessions(), 2);
        assert_eq!(source.config().timeout_ms, 30000);
    }
}
