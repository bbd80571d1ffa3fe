//! Browser module tests
//!
//! Configuration, URL validation and the session limiter run everywhere.
//! Tests marked `#[ignore]` drive a real Chrome/Chromium:
//! `cargo test -- --ignored`.

use beforeafter_web::browser::{
    BrowserConfig, BrowserSession, NavigationOptions, SessionLimiter, UrlValidator, WaitUntil,
    DEFAULT_MAX_SESSIONS, PROFILE_DIR_PREFIX,
};
use beforeafter_web::error::{BrowserError, Error, ScrapeError};
use beforeafter_web::styles::{ChromeStyleSource, StyleExtractor, MAX_COLORS, MAX_FONTS};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_test::{assert_err, assert_ok, block_on};

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
    assert!(config.user_agent.is_none());
    assert!(config.chrome_path.is_none());
    assert!(config.extra_args.is_empty());
}

#[test]
fn test_browser_config_builder() {
    let config = BrowserConfig::builder()
        .headless(false)
        .viewport(1280, 720)
        .sandbox(true)
        .user_agent("PaletteBot/1.0")
        .timeout_ms(10000)
        .network_idle_ms(250)
        .chrome_path("/usr/bin/chromium")
        .arg("--disable-gpu")
        .build();

    assert!(!config.headless);
    assert_eq!((config.width, config.height), (1280, 720));
    assert!(config.sandbox);
    assert_eq!(config.user_agent.as_deref(), Some("PaletteBot/1.0"));
    assert_eq!(config.timeout_ms, 10000);
    assert_eq!(config.network_idle_ms, 250);
    assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    assert_eq!(config.extra_args, vec!["--disable-gpu"]);
}

#[test]
fn test_navigation_options_default() {
    let opts = NavigationOptions::default();
    assert_eq!(opts.timeout_ms, 30000);
    assert_eq!(opts.wait_until, WaitUntil::NetworkIdle);
    assert_eq!(opts.idle_ms, 500);
}

#[test]
fn test_url_validator() {
    assert_ok!(UrlValidator::validate("https://example.com"));
    assert_ok!(UrlValidator::validate("http://127.0.0.1:8080/path?q=1"));

    assert_err!(UrlValidator::validate(""));
    assert_err!(UrlValidator::validate("example.com"));
    assert_err!(UrlValidator::validate("javascript:alert(1)"));
    assert_err!(UrlValidator::validate("data:text/html,<p>x</p>"));
    assert_err!(UrlValidator::validate(&format!(
        "https://example.com/{}",
        "a".repeat(2048)
    )));
}

#[test]
fn test_session_limiter_bounds_sessions() {
    block_on(async {
        let limiter = SessionLimiter::new(2);
        let first = limiter.acquire(Duration::from_millis(50)).await.unwrap();
        let _second = limiter.acquire(Duration::from_millis(50)).await.unwrap();
        assert_eq!(limiter.active(), 2);

        let third = limiter.acquire(Duration::from_millis(20)).await;
        assert!(matches!(
            third,
            Err(Error::Browser(BrowserError::Timeout(20)))
        ));

        drop(first);
        assert_eq!(limiter.available(), 1);
        assert_ok!(limiter.acquire(Duration::from_millis(50)).await);
    });
}

#[test]
fn test_session_limiter_default() {
    let limiter = SessionLimiter::default();
    assert_eq!(limiter.max_sessions(), DEFAULT_MAX_SESSIONS);
    assert_eq!(SessionLimiter::new(0).max_sessions(), 1);
}

/// Tests that launch browsers take turns so profile directory snapshots
/// only ever see their own sessions
static LAUNCHES: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

fn extractor_with(
    config: BrowserConfig,
    limiter: &SessionLimiter,
    timeout: Duration,
) -> StyleExtractor {
    let source = ChromeStyleSource::new(config, limiter.clone());
    StyleExtractor::new(Arc::new(source)).with_timeout(timeout)
}

fn live_extractor(limiter: &SessionLimiter, timeout: Duration) -> StyleExtractor {
    let config = BrowserConfig::builder()
        .timeout_ms(timeout.as_millis() as u64)
        .build();
    extractor_with(config, limiter, timeout)
}

/// Browser profile directories currently in the temp dir
fn profile_dirs() -> HashSet<PathBuf> {
    let Ok(entries) = std::fs::read_dir(std::env::temp_dir()) else {
        return HashSet::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(PROFILE_DIR_PREFIX))
        })
        .collect()
}

/// Executable that ignores its arguments and never announces a DevTools URL
#[cfg(unix)]
fn silent_browser() -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let name = format!("ba-web-silent-browser-{}", std::process::id());
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn test_launch_failure_releases_slot_and_profile() {
    let _turn = LAUNCHES.lock().await;
    let before = profile_dirs();
    let limiter = SessionLimiter::new(1);
    let config = BrowserConfig::builder()
        .chrome_path("/nonexistent/ba-web/chromium")
        .timeout_ms(5000)
        .build();

    let err = extractor_with(config, &limiter, Duration::from_secs(5))
        .extract("https://example.com")
        .await
        .unwrap_err();

    assert_eq!(err, ScrapeError::Unavailable);
    assert_eq!(limiter.available(), limiter.max_sessions());
    assert!(profile_dirs().is_subset(&before));
}

#[cfg(unix)]
#[tokio::test]
async fn test_slot_wait_and_launch_share_one_timeout() {
    let _turn = LAUNCHES.lock().await;
    let before = profile_dirs();
    let timeout = Duration::from_millis(800);
    let limiter = SessionLimiter::new(1);
    let config = BrowserConfig::builder()
        .chrome_path(silent_browser().to_string_lossy())
        .timeout_ms(timeout.as_millis() as u64)
        .build();

    // Another caller holds the only slot for most of the budget
    let held = limiter.acquire(Duration::from_millis(50)).await.unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(held);
    });

    let start = Instant::now();
    let err = extractor_with(config, &limiter, timeout)
        .extract("https://example.com")
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err, ScrapeError::Unavailable);
    assert!(elapsed < timeout + Duration::from_millis(400), "took {:?}", elapsed);
    assert_eq!(limiter.available(), limiter.max_sessions());
    assert!(profile_dirs().is_subset(&before));
}

/// Serve one HTML page on an ephemeral local port
async fn serve_page(html: &'static str) -> String {
    use axum::response::Html;
    use axum::routing::get;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = axum::Router::new().route("/", get(move || async move { Html(html) }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium"]
async fn test_live_extraction_from_local_page() {
    let url = serve_page(
        r#"<!doctype html>
        <html><body style="background: rgb(59, 130, 246); font-family: 'Helvetica Neue', Arial, system-ui, sans-serif">
            <h1 style="color: rgb(16, 16, 16)">Hello</h1>
            <p style="color: rgb(16, 16, 16); border: 1px solid rgb(255, 0, 0)">World</p>
        </body></html>"#,
    )
    .await;

    let _turn = LAUNCHES.lock().await;
    let styles = live_extractor(&SessionLimiter::new(2), Duration::from_secs(30))
        .extract(&url)
        .await
        .unwrap();

    assert!(styles.colors.contains(&"#3b82f6".to_string()), "{:?}", styles);
    assert!(styles.colors.contains(&"#101010".to_string()), "{:?}", styles);
    assert!(styles.colors.len() <= MAX_COLORS);
    assert!(styles.fonts.len() <= MAX_FONTS);
    assert!(styles.fonts.contains(&"Helvetica Neue".to_string()), "{:?}", styles);
    assert!(!styles.fonts.iter().any(|f| f.contains("system-ui")));
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium"]
async fn test_live_blank_page_succeeds() {
    let url = serve_page("<!doctype html><html><body></body></html>").await;

    let _turn = LAUNCHES.lock().await;
    let styles = live_extractor(&SessionLimiter::new(2), Duration::from_secs(30))
        .extract(&url)
        .await
        .unwrap();
    assert!(styles.colors.len() <= MAX_COLORS);
    assert!(styles.fonts.len() <= MAX_FONTS);
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium"]
async fn test_live_unreachable_host_fails_within_timeout() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let timeout = Duration::from_secs(10);
    let limiter = SessionLimiter::new(2);
    let _turn = LAUNCHES.lock().await;
    let before = profile_dirs();

    let start = Instant::now();
    let err = live_extractor(&limiter, timeout)
        .extract(&format!("http://127.0.0.1:{}/", port))
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err, ScrapeError::Navigation);
    assert!(elapsed < timeout + Duration::from_secs(2), "took {:?}", elapsed);
    assert_eq!(limiter.available(), limiter.max_sessions());
    assert!(profile_dirs().is_subset(&before));
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium"]
async fn test_live_dropped_session_removes_profile() {
    let _turn = LAUNCHES.lock().await;
    let session = BrowserSession::launch(&BrowserConfig::default()).await.unwrap();
    let profile = session.profile_dir().unwrap().to_path_buf();
    assert!(profile.is_dir());

    // Dropped without close, as when a request future is cancelled
    drop(session);

    let start = Instant::now();
    while profile.exists() && start.elapsed() < Duration::from_secs(10) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!profile.exists());
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium"]
async fn test_live_session_close_is_bounded() {
    let _turn = LAUNCHES.lock().await;
    let session = BrowserSession::launch(&BrowserConfig::default()).await.unwrap();
    let profile = session.profile_dir().unwrap().to_path_buf();
    let _page = session.new_page().await.unwrap();

    let start = Instant::now();
    assert_ok!(session.close().await);
    assert!(start.elapsed() < Duration::from_secs(15));
    assert!(!profile.exists());
}
