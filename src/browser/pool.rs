//! Concurrency cap for open browser sessions.
//!
//! Sessions are never reused; the limiter only bounds how many isolated
//! browser processes can be alive at once.

use crate::error::{BrowserError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Default number of browser sessions allowed at once
pub const DEFAULT_MAX_SESSIONS: usize = 4;

/// Slot for one open browser session, released on drop
#[derive(Debug)]
pub struct SessionPermit {
    _permit: OwnedSemaphorePermit,
}

/// Bounds the number of concurrently open browser sessions
#[derive(Debug, Clone)]
pub struct SessionLimiter {
    semaphore: Arc<Semaphore>,
    max_sessions: usize,
}

impl SessionLimiter {
    /// Create a limiter; a limit of zero is raised to one
    pub fn new(max_sessions: usize) -> Self {
        let max_sessions = max_sessions.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
        }
    }

    /// Wait up to `wait` for a free slot
    pub async fn acquire(&self, wait: Duration) -> Result<SessionPermit> {
        let permit = tokio::time::timeout(wait, Arc::clone(&self.semaphore).acquire_owned())
            .await
            .map_err(|_| BrowserError::Timeout(wait.as_millis() as u64))?
            .map_err(|_| BrowserError::LimiterClosed)?;

        debug!(
            available = self.available(),
            max = self.max_sessions,
            "Acquired browser session slot"
        );
        Ok(SessionPermit { _permit: permit })
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Sessions currently holding a slot
    pub fn active(&self) -> usize {
        self.max_sessions - self.available()
    }

    /// Maximum allowed concurrent sessions
    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

impl Default for SessionLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_permits_are_released_on_drop() {
        let limiter = SessionLimiter::new(2);
        let a = limiter.acquire(Duration::from_millis(10)).await.unwrap();
        let _b = limiter.acquire(Duration::from_millis(10)).await.unwrap();
        assert_eq!(limiter.available(), 0);
        assert_eq!(limiter.active(), 2);

        drop(a);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_acquire_times_out_when_full() {
        let limiter = SessionLimiter::new(1);
        let _held = limiter.acquire(Duration::from_millis(10)).await.unwrap();

        let err = limiter.acquire(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, Error::Browser(BrowserError::Timeout(20))));
    }

    #[test]
    fn test_zero_limit_is_raised() {
        let limiter = SessionLimiter::new(0);
        assert_eq!(limiter.max_sessions(), 1);
        assert_eq!(SessionLimiter::default().max_sessions(), DEFAULT_MAX_SESSIONS);
    }
}
