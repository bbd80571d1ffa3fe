//! Browser automation module
//!
//! This module provides headless browser control through ChromiumOxide:
//! isolated per-call sessions, bounded navigation, and a cap on how many
//! sessions may be open at once.

pub mod controller;
pub mod navigation;
pub mod pool;

pub use controller::{BrowserConfig, BrowserConfigBuilder, BrowserSession, PROFILE_DIR_PREFIX};
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, UrlValidator, WaitUntil};
pub use pool::{SessionLimiter, SessionPermit, DEFAULT_MAX_SESSIONS};
