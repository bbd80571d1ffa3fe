//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::browser::{BrowserConfig, DEFAULT_MAX_SESSIONS};
use crate::error::{Error, Result};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Default request body limit; two base64 images fit comfortably
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Everything the binary needs to serve the API
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// CORS origins; empty admits localhost only
    pub allowed_origins: Vec<String>,
    /// Directory uploaded images are written to and served from
    pub uploads_dir: PathBuf,
    /// Public URL prefix of `uploads_dir`; derived from the bind address when unset
    pub public_base_url: Option<String>,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Concurrently open browser sessions
    pub max_sessions: usize,
    /// Browser launch and navigation settings
    pub browser: BrowserConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            uploads_dir: PathBuf::from("uploads"),
            public_base_url: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_sessions: DEFAULT_MAX_SESSIONS,
            browser: BrowserConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| Error::generic(format!("invalid bind address {}: {}", addr, e)))
    }

    /// URL prefix under which uploaded images are served
    pub fn uploads_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}/uploads", self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.browser.timeout_ms, 30000);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3001");

        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_uploads_base_url() {
        let config = ServerConfig::default();
        assert_eq!(config.uploads_base_url(), "http://127.0.0.1:3001/uploads");

        let config = ServerConfig {
            public_base_url: Some("https://cdn.example.com/ba/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.uploads_base_url(), "https://cdn.example.com/ba");
    }
}
