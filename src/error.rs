//! Error types for the before/after embed service
//!
//! Internal layers (browser, navigation, in-page extraction, embed storage)
//! report detailed `thiserror` enums. The style-extraction boundary collapses
//! them into [`ScrapeError`], which only says which stage failed.

use thiserror::Error;

/// The main error type for crate operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Embed record and blob storage errors
    #[error("Embed error: {0}")]
    Embed(#[from] EmbedError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Timeout waiting for a free browser session slot
    #[error("Browser operation timed out after {0}ms")]
    Timeout(u64),

    /// Session limiter was shut down
    #[error("Browser session limiter closed")]
    LimiterClosed,
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// JavaScript execution failed
    #[error("JavaScript execution failed: {0}")]
    JsExecutionFailed(String),

    /// The in-page routine returned something other than the expected shape
    #[error("Unexpected evaluation result: {0}")]
    UnexpectedResult(String),

    /// Evaluation did not finish in time
    #[error("Evaluation timed out after {0}ms")]
    Timeout(u64),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Embed record and blob storage errors
#[derive(Error, Debug)]
pub enum EmbedError {
    /// Record missing, or owned by someone else
    #[error("Embed not found: {0}")]
    NotFound(u64),

    /// Uploaded image payload is unusable
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Blob storage write failed
    #[error("Blob storage failed: {0}")]
    Storage(String),
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque failure returned by style extraction.
///
/// Only the failing stage is exposed; driver detail stays in the logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeError {
    /// The page could not be loaded in time
    #[error("could not load page")]
    Navigation,

    /// The in-page collection routine failed
    #[error("could not extract styles")]
    Extraction,

    /// No browser session could be started
    #[error("browser unavailable")]
    Unavailable,
}

impl From<&Error> for ScrapeError {
    fn from(err: &Error) -> Self {
        match err {
            Error::Navigation(_) => ScrapeError::Navigation,
            Error::Browser(_) | Error::Io(_) => ScrapeError::Unavailable,
            _ => ScrapeError::Extraction,
        }
    }
}

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_navigation_error() {
        let err = NavigationError::Timeout(30000);
        assert_eq!(err.to_string(), "Navigation timed out after 30000ms");
    }

    #[test]
    fn test_scrape_error_classification() {
        let nav: Error = NavigationError::LoadFailed("net::ERR_CONNECTION_REFUSED".into()).into();
        assert_eq!(ScrapeError::from(&nav), ScrapeError::Navigation);

        let js: Error = ExtractionError::JsExecutionFailed("SecurityError".into()).into();
        assert_eq!(ScrapeError::from(&js), ScrapeError::Extraction);

        let launch: Error = BrowserError::LaunchFailed("missing executable".into()).into();
        assert_eq!(ScrapeError::from(&launch), ScrapeError::Unavailable);

        assert_eq!(ScrapeError::from(&Error::cdp("closed")), ScrapeError::Extraction);
    }

    #[test]
    fn test_scrape_error_hides_detail() {
        assert_eq!(ScrapeError::Navigation.to_string(), "could not load page");
        assert_eq!(ScrapeError::Extraction.to_string(), "could not extract styles");
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
