//! Browser lifecycle management
//!
//! Every [`BrowserSession`] is its own Chromium process with a throwaway
//! profile directory, so no cookies, cache or storage survive between
//! sessions. Teardown happens on [`BrowserSession::close`], and again on drop
//! for paths that never reach it (errors, cancelled futures).

use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Bound on each browser shutdown step: close, process exit, handler exit
const HANDLER_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width (default: 1920)
    pub width: u32,
    /// Browser window height (default: 1080)
    pub height: u32,
    /// Enable the Chromium sandbox (default: false, containers rarely allow it)
    pub sandbox: bool,
    /// User agent string (None = use default)
    pub user_agent: Option<String>,
    /// Launch, navigation and evaluation timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Quiet period that counts as "network idle" in milliseconds (default: 500)
    pub network_idle_ms: u64,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            sandbox: false,
            user_agent: None,
            timeout_ms: 30000,
            network_idle_ms: 500,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Create a new config builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// The configured timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// Set navigation timeout
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set the network quiet period
    pub fn network_idle_ms(mut self, ms: u64) -> Self {
        self.config.network_idle_ms = ms;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// File name prefix of every throwaway profile directory
pub const PROFILE_DIR_PREFIX: &str = "ba-web-profile-";

/// Throwaway Chromium profile directory, removed on drop
#[derive(Debug)]
struct ProfileDir {
    path: PathBuf,
}

impl ProfileDir {
    fn create() -> Result<Self> {
        let name = format!("{}{}", PROFILE_DIR_PREFIX, Uuid::new_v4());
        let path = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(
                "Failed to remove browser profile {}: {}",
                self.path.display(),
                e
            );
        } else {
            debug!("Removed browser profile {}", self.path.display());
        }
    }
}

/// One isolated browser process.
///
/// The profile directory is only removed once the process has exited,
/// both on [`BrowserSession::close`] and on drop.
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: JoinHandle<()>,
    profile: Option<ProfileDir>,
}

impl BrowserSession {
    /// Launch a fresh browser with its own profile directory
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        Self::launch_within(config, config.timeout()).await
    }

    /// Launch a fresh browser, giving up after `limit`.
    ///
    /// CDP requests made through the session are also capped at `limit`.
    #[instrument(skip(config), fields(headless = config.headless))]
    pub async fn launch_within(config: &BrowserConfig, limit: Duration) -> Result<Self> {
        let profile = ProfileDir::create()?;
        let cdp_config = build_cdp_config(config, profile.path(), limit)?;

        let (browser, mut handler) = tokio::time::timeout(limit, Browser::launch(cdp_config))
            .await
            .map_err(|_| BrowserError::Timeout(limit.as_millis() as u64))?
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser session launched");

        Ok(Self {
            browser: Some(browser),
            handler: handler_task,
            profile: Some(profile),
        })
    }

    /// Profile directory this session's browser writes into
    pub fn profile_dir(&self) -> Option<&Path> {
        self.profile.as_ref().map(ProfileDir::path)
    }

    fn browser(&self) -> Result<&Browser> {
        self.browser
            .as_ref()
            .ok_or_else(|| Error::generic("browser session already closed"))
    }

    /// Open a blank page in this session
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<Page> {
        let page = self
            .browser()?
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;
        debug!("Created new page");
        Ok(page)
    }

    /// Close the browser and wait for the process and handler to exit.
    ///
    /// Every step is bounded by a short grace period; a browser that does
    /// not close or exit in time is killed.
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = match tokio::time::timeout(HANDLER_SHUTDOWN_GRACE, browser.close()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Error::cdp(e.to_string())),
            Err(_) => {
                let grace_ms = HANDLER_SHUTDOWN_GRACE.as_millis() as u64;
                Err(BrowserError::Timeout(grace_ms).into())
            }
        };
        if let Err(ref e) = closed {
            warn!("Browser close failed, killing process: {}", e);
            kill(&mut browser).await;
        }
        reap(&mut browser).await;

        let _ = tokio::time::timeout(HANDLER_SHUTDOWN_GRACE, &mut self.handler).await;
        drop(self.profile.take());

        info!("Browser session closed");
        closed
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();

        let (Some(mut browser), profile) = (self.browser.take(), self.profile.take()) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    kill(&mut browser).await;
                    reap(&mut browser).await;
                    drop(profile);
                });
            }
            // No runtime left to reap on; chromiumoxide kills the child as it drops
            Err(_) => {
                drop(browser);
                drop(profile);
            }
        }
    }
}

async fn kill(browser: &mut Browser) {
    if let Some(Err(e)) = browser.kill().await {
        warn!("Failed to kill browser process: {}", e);
    }
}

/// Wait for the browser process to exit, killing it after the grace period
async fn reap(browser: &mut Browser) {
    match tokio::time::timeout(HANDLER_SHUTDOWN_GRACE, browser.wait()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Failed to reap browser process: {}", e),
        Err(_) => {
            warn!("Browser process did not exit, killing it");
            kill(browser).await;
            let waited = tokio::time::timeout(HANDLER_SHUTDOWN_GRACE, browser.wait()).await;
            if let Ok(Err(e)) = waited {
                warn!("Failed to reap browser process: {}", e);
            }
        }
    }
}

fn build_cdp_config(
    config: &BrowserConfig,
    profile: &Path,
    request_timeout: Duration,
) -> Result<CdpBrowserConfig> {
    let mut builder = CdpBrowserConfig::builder()
        .user_data_dir(profile)
        .request_timeout(request_timeout)
        .viewport(Viewport {
            width: config.width,
            height: config.height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        });

    if !config.headless {
        builder = builder.with_head();
    }

    if !config.sandbox {
        builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
    }

    if let Some(ref ua) = config.user_agent {
        builder = builder.arg(format!("--user-agent={}", ua));
    }

    if let Some(ref path) = config.chrome_path {
        builder = builder.chrome_executable(path);
    }

    for arg in &config.extra_args {
        builder = builder.arg(arg);
    }

    builder
        .build()
        .map_err(|e| BrowserError::ConfigError(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert!(!config.sandbox);
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.network_idle_ms, 500);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::builder()
            .headless(false)
            .viewport(1280, 720)
            .sandbox(true)
            .user_agent("TestBot/1.0")
            .timeout_ms(60000)
            .network_idle_ms(250)
            .arg("--disable-gpu")
            .build();

        assert!(!config.headless);
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert!(config.sandbox);
        assert_eq!(config.user_agent, Some("TestBot/1.0".to_string()));
        assert_eq!(config.timeout_ms, 60000);
        assert_eq!(config.network_idle_ms, 250);
        assert_eq!(config.extra_args, vec!["--disable-gpu"]);
    }

    #[test]
    fn test_profile_dir_removed_on_drop() {
        let profile = ProfileDir::create().expect("create profile dir");
        let path = profile.path().to_path_buf();
        assert!(path.is_dir());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(PROFILE_DIR_PREFIX));
        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_profile_dirs_are_unique() {
        let a = ProfileDir::create().expect("create profile dir");
        let b = ProfileDir::create().expect("create profile dir");
        assert_ne!(a.path(), b.path());
    }
}
