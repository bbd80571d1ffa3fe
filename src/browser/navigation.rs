//! Page navigation functionality
//!
//! This module handles URL validation and bounded navigation with a
//! configurable readiness condition. Network idle is observed through CDP
//! network events rather than guessed from a timer.

use crate::error::{NavigationError, Result};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::Page;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use url::Url;

/// Longest URL accepted for navigation
pub const MAX_URL_LENGTH: usize = 2048;

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Hard bound on the whole navigation, readiness wait included (default: 30000)
    pub timeout_ms: u64,
    /// Wait until condition (default: network idle)
    pub wait_until: WaitUntil,
    /// Quiet period for [`WaitUntil::NetworkIdle`] in ms (default: 500)
    pub idle_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            wait_until: WaitUntil::NetworkIdle,
            idle_ms: 500,
        }
    }
}

/// Condition to wait for after navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Wait until load event fires
    Load,
    /// Wait until DOMContentLoaded event fires
    DomContentLoaded,
    /// Wait until no request has been in flight for the idle period
    NetworkIdle,
}

/// Result of a navigation operation
#[derive(Debug)]
pub struct NavigationResult {
    /// Final URL after any redirects
    pub final_url: String,
    /// Page title
    pub title: Option<String>,
    /// Navigation duration in milliseconds
    pub duration_ms: u64,
}

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Validate a URL for navigation.
    ///
    /// Accepts absolute `http`/`https` URLs with a host, up to
    /// [`MAX_URL_LENGTH`] characters.
    pub fn validate(url: &str) -> std::result::Result<Url, String> {
        if url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(format!(
                "URL exceeds maximum length of {} characters",
                MAX_URL_LENGTH
            ));
        }

        let parsed = Url::parse(url).map_err(|e| format!("{}: {}", e, url))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("URL must start with http:// or https://: {}", url));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(format!("URL has no host: {}", url));
        }

        Ok(parsed)
    }
}

enum NetworkEvent {
    Started(String),
    Settled(String),
}

/// Page navigator with bounded navigation
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL and wait for the configured readiness condition.
    ///
    /// The whole sequence, including the readiness wait, is bounded by
    /// `timeout_ms`. No retries are attempted.
    #[instrument(skip(page, opts))]
    pub async fn goto(
        page: &Page,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<NavigationResult> {
        UrlValidator::validate(url).map_err(NavigationError::InvalidUrl)?;

        info!("Navigating to: {}", url);
        let start = Instant::now();

        let timeout = Duration::from_millis(opts.timeout_ms);
        let mut result = tokio::time::timeout(timeout, Self::navigate_once(page, url, opts))
            .await
            .map_err(|_| NavigationError::Timeout(opts.timeout_ms))??;

        result.duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Navigation complete: {} -> {} in {}ms",
            url, result.final_url, result.duration_ms
        );
        Ok(result)
    }

    async fn navigate_once(
        page: &Page,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<NavigationResult> {
        // Listeners go in before navigation so the first requests are seen
        let network = match opts.wait_until {
            WaitUntil::NetworkIdle => Some(Self::network_events(page).await?),
            _ => None,
        };

        page.goto(url)
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        match network {
            Some(events) => {
                Self::wait_for_network_idle(events, Duration::from_millis(opts.idle_ms)).await
            }
            None => Self::wait_for_ready_state(page, opts.wait_until).await?,
        }

        let final_url = page
            .url()
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        let title = page.get_title().await.ok().flatten();

        Ok(NavigationResult {
            final_url,
            title,
            duration_ms: 0,
        })
    }

    async fn network_events(page: &Page) -> Result<BoxStream<'static, NetworkEvent>> {
        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?
            .map(|e| NetworkEvent::Started(e.request_id.inner().clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?
            .map(|e| NetworkEvent::Settled(e.request_id.inner().clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?
            .map(|e| NetworkEvent::Settled(e.request_id.inner().clone()));

        Ok(stream::select(started, stream::select(finished, failed)).boxed())
    }

    /// Resolve once no request has been in flight for `idle`.
    ///
    /// Any network event restarts the quiet period.
    async fn wait_for_network_idle(mut events: BoxStream<'static, NetworkEvent>, idle: Duration) {
        let mut in_flight: HashSet<String> = HashSet::new();
        loop {
            let quiet = tokio::time::sleep(idle);
            tokio::select! {
                event = events.next() => match event {
                    Some(NetworkEvent::Started(id)) => {
                        in_flight.insert(id);
                    }
                    Some(NetworkEvent::Settled(id)) => {
                        in_flight.remove(&id);
                    }
                    None => return,
                },
                _ = quiet, if in_flight.is_empty() => return,
            }
        }
    }

    async fn wait_for_ready_state(page: &Page, wait_until: WaitUntil) -> Result<()> {
        let script = match wait_until {
            WaitUntil::DomContentLoaded => {
                r#"
                    new Promise(resolve => {
                        if (document.readyState !== 'loading') {
                            resolve(true);
                        } else {
                            document.addEventListener('DOMContentLoaded', () => resolve(true));
                        }
                    })
                "#
            }
            WaitUntil::Load | WaitUntil::NetworkIdle => {
                r#"
                    new Promise(resolve => {
                        if (document.readyState === 'complete') {
                            resolve(true);
                        } else {
                            window.addEventListener('load', () => resolve(true));
                        }
                    })
                "#
            }
        };

        page.evaluate(script)
            .await
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;
        Ok(())
    }
}
