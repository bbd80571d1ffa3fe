//! Before/After Web - before/after image embeds with website style extraction
//!
//! This crate powers a small service that turns two uploaded images into an
//! embeddable toggle widget, styled with the palette and typeface of the
//! customer's own website.
//!
//! # Features
//!
//! - **Style Extraction**: Computed colors and fonts read from a live page via
//!   ChromiumOxide (CDP), one isolated browser per call
//! - **Embeds**: Records, image blob storage and widget code generation
//! - **HTTP API**: axum router for scraping, embed CRUD, health and status
//!
//! # Architecture
//!
//! ```text
//! HTTP ──▶ handlers ──▶ StyleExtractor ──▶ ChromeStyleSource ──▶ BrowserSession (CDP)
//!             │                                  │
//!             │                                  ▼
//!             │                          PageNavigator (network idle)
//!             ▼
//!     EmbedStore + BlobStore ──▶ generate_embed_code
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use beforeafter_web::browser::{BrowserConfig, SessionLimiter};
//! use beforeafter_web::styles::{ChromeStyleSource, StyleExtractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = ChromeStyleSource::new(BrowserConfig::default(), SessionLimiter::default());
//!     let extractor = StyleExtractor::new(Arc::new(source));
//!
//!     let styles = extractor.extract("https://example.com").await?;
//!     println!("colors: {:?}, fonts: {:?}", styles.colors, styles.fonts);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod cors;
pub mod embed;
pub mod error;
pub mod handlers;
pub mod server;
pub mod styles;

// Re-exports for convenience
pub use config::ServerConfig;
pub use embed::{generate_embed_code, Embed, EmbedStore};
pub use error::{Error, Result, ScrapeError};
pub use server::build_router;
pub use styles::{ScrapedStyles, StyleExtractor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
