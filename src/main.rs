//! Before/after embed service
//!
//! Serves website style extraction and embed management over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use beforeafter_web::browser::{BrowserConfig, SessionLimiter};
use beforeafter_web::config::ServerConfig;
use beforeafter_web::embed::{InMemoryEmbedStore, LocalBlobStore};
use beforeafter_web::handlers::AppState;
use beforeafter_web::styles::{ChromeStyleSource, StyleExtractor};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Before/after embed service
#[derive(Parser, Debug)]
#[command(name = "ba-web")]
#[command(version)]
#[command(about = "Before/after embeds with website palette extraction")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "BA_WEB_PORT", default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, env = "BA_WEB_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long, env = "BA_WEB_CHROME_PATH")]
    chrome_path: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Keep the Chrome sandbox enabled
    #[arg(long, env = "BA_WEB_SANDBOX")]
    sandbox: bool,

    /// Page load and extraction bound in milliseconds
    #[arg(long, env = "BA_WEB_TIMEOUT_MS", default_value = "30000")]
    timeout_ms: u64,

    /// Maximum concurrently open browser sessions
    #[arg(long, env = "BA_WEB_MAX_SESSIONS", default_value = "4")]
    max_sessions: usize,

    /// Directory for uploaded images
    #[arg(long, env = "BA_WEB_UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Public URL prefix for uploaded images
    #[arg(long, env = "BA_WEB_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Allowed CORS origin (repeatable); localhost only when omitted
    #[arg(long = "allow-origin", env = "BA_WEB_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut browser = BrowserConfig::builder()
            .headless(!self.headful)
            .sandbox(self.sandbox)
            .timeout_ms(self.timeout_ms);
        if let Some(path) = self.chrome_path {
            browser = browser.chrome_path(path);
        }

        ServerConfig {
            host: self.host,
            port: self.port,
            allowed_origins: self.allowed_origins,
            uploads_dir: self.uploads_dir,
            public_base_url: self.public_base_url,
            max_sessions: self.max_sessions,
            browser: browser.build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.into_config();
    tracing::info!(
        "ba-web {} starting on {}:{}",
        beforeafter_web::VERSION,
        config.host,
        config.port
    );

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .with_context(|| format!("creating uploads dir {}", config.uploads_dir.display()))?;

    let source = ChromeStyleSource::new(
        config.browser.clone(),
        SessionLimiter::new(config.max_sessions),
    );
    let extractor = StyleExtractor::new(Arc::new(source)).with_timeout(config.browser.timeout());
    let blobs = LocalBlobStore::new(&config.uploads_dir, config.uploads_base_url());
    let state = AppState::new(
        extractor,
        Arc::new(InMemoryEmbedStore::new()),
        Arc::new(blobs),
    );

    beforeafter_web::server::serve(&config, state)
        .await
        .context("server failed")?;
    Ok(())
}
