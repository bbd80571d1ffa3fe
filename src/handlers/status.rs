//! Health and status endpoints
//!
//! - `/health` - liveness check
//! - `/status` - version, uptime, scrape counters, memory and scrape latency
//!
//! ```text
//! scrape_handler ──record_scrape──▶ ServiceMetrics ◀── status_handler
//!                                    │  counters          │
//!                                    │  LatencyHistogram   ▼
//!                                    └──────────────▶ StatusResponse (JSON)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, instrument};

use crate::handlers::AppState;

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the server answers
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Service status with runtime metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Crate version
    pub version: String,
    /// Crate name
    pub name: String,
    /// Seconds since start
    pub uptime_seconds: u64,
    /// Style extractions that returned a result
    pub scrapes_succeeded: u64,
    /// Style extractions that failed
    pub scrapes_failed: u64,
    /// Embeds created since start
    pub embeds_created: u64,
    /// Process memory
    pub memory: MemoryMetrics,
    /// Style extraction latency
    pub latency: LatencyMetrics,
    /// ISO8601 time the status was generated
    pub timestamp: String,
}

/// Process memory from sysinfo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Resident set size in bytes
    pub rss_bytes: u64,
    /// Virtual memory in bytes
    pub virtual_bytes: u64,
}

/// Latency percentiles in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Median
    pub p50_ms: f64,
    /// 95th percentile
    pub p95_ms: f64,
    /// 99th percentile
    pub p99_ms: f64,
    /// Slowest recorded
    pub max_ms: f64,
    /// Number of samples
    pub samples: u64,
}

/// Latency histogram, 1ms to 10 minutes at 3 significant figures
#[derive(Debug)]
pub struct LatencyHistogram {
    inner: RwLock<Histogram<u64>>,
}

impl LatencyHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        let histogram = Histogram::new_with_bounds(1, 600_000, 3)
            .expect("constant histogram bounds are valid");
        Self {
            inner: RwLock::new(histogram),
        }
    }

    /// Record one sample; out-of-range values saturate
    pub fn record(&self, duration: Duration) {
        let ms = (duration.as_millis() as u64).max(1);
        self.inner.write().saturating_record(ms);
    }

    /// Number of samples
    pub fn count(&self) -> u64 {
        self.inner.read().len()
    }

    /// Percentile summary
    pub fn metrics(&self) -> LatencyMetrics {
        let hist = self.inner.read();
        LatencyMetrics {
            p50_ms: hist.value_at_percentile(50.0) as f64,
            p95_ms: hist.value_at_percentile(95.0) as f64,
            p99_ms: hist.value_at_percentile(99.0) as f64,
            max_ms: hist.max() as f64,
            samples: hist.len(),
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters shared by the handlers
#[derive(Debug)]
pub struct ServiceMetrics {
    start_time: Instant,
    scrapes_succeeded: AtomicU64,
    scrapes_failed: AtomicU64,
    embeds_created: AtomicU64,
    scrape_latency: LatencyHistogram,
}

impl ServiceMetrics {
    /// Fresh counters, uptime starting now
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            scrapes_succeeded: AtomicU64::new(0),
            scrapes_failed: AtomicU64::new(0),
            embeds_created: AtomicU64::new(0),
            scrape_latency: LatencyHistogram::new(),
        }
    }

    /// Seconds since start
    #[inline]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Record the outcome and duration of one style extraction
    pub fn record_scrape(&self, elapsed: Duration, succeeded: bool) {
        if succeeded {
            self.scrapes_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.scrapes_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.scrape_latency.record(elapsed);
    }

    /// Count a newly created embed
    #[inline]
    pub fn record_embed_created(&self) -> u64 {
        self.embeds_created.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Successful extractions
    #[inline]
    pub fn scrapes_succeeded(&self) -> u64 {
        self.scrapes_succeeded.load(Ordering::Relaxed)
    }

    /// Failed extractions
    #[inline]
    pub fn scrapes_failed(&self) -> u64 {
        self.scrapes_failed.load(Ordering::Relaxed)
    }

    /// Embeds created
    #[inline]
    pub fn embeds_created(&self) -> u64 {
        self.embeds_created.load(Ordering::Relaxed)
    }

    /// Extraction latency percentiles
    pub fn latency_metrics(&self) -> LatencyMetrics {
        self.scrape_latency.metrics()
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_memory_metrics() -> MemoryMetrics {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    match system.process(pid) {
        Some(process) => MemoryMetrics {
            rss_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
        },
        None => {
            debug!("Current process not visible to sysinfo");
            MemoryMetrics::default()
        }
    }
}

/// `GET /health`
#[instrument(skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// `GET /status`
#[instrument(skip_all)]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;
    let response = StatusResponse {
        version: crate::VERSION.to_string(),
        name: crate::NAME.to_string(),
        uptime_seconds: metrics.uptime_seconds(),
        scrapes_succeeded: metrics.scrapes_succeeded(),
        scrapes_failed: metrics.scrapes_failed(),
        embeds_created: metrics.embeds_created(),
        memory: collect_memory_metrics(),
        latency: metrics.latency_metrics(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_default() {
        assert_eq!(HealthResponse::default().status, "healthy");
    }

    #[test]
    fn test_scrape_counters() {
        let metrics = ServiceMetrics::new();
        metrics.record_scrape(Duration::from_millis(800), true);
        metrics.record_scrape(Duration::from_millis(1200), true);
        metrics.record_scrape(Duration::from_millis(30_000), false);

        assert_eq!(metrics.scrapes_succeeded(), 2);
        assert_eq!(metrics.scrapes_failed(), 1);
        assert_eq!(metrics.latency_metrics().samples, 3);
    }

    #[test]
    fn test_latency_percentiles_ordered() {
        let histogram = LatencyHistogram::new();
        for ms in [5, 10, 20, 50, 400] {
            histogram.record(Duration::from_millis(ms));
        }

        let metrics = histogram.metrics();
        assert_eq!(metrics.samples, 5);
        assert!(metrics.p50_ms > 0.0);
        assert!(metrics.p95_ms >= metrics.p50_ms);
        assert!(metrics.p99_ms >= metrics.p95_ms);
        assert!((399.0..=401.0).contains(&metrics.max_ms));
    }

    #[test]
    fn test_sub_millisecond_and_huge_samples_are_kept() {
        let histogram = LatencyHistogram::new();
        histogram.record(Duration::from_micros(10));
        histogram.record(Duration::from_secs(3600));
        assert_eq!(histogram.count(), 2);
    }

    #[test]
    fn test_embed_counter() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.record_embed_created(), 1);
        assert_eq!(metrics.record_embed_created(), 2);
        assert_eq!(metrics.embeds_created(), 2);
    }

    #[test]
    fn test_memory_metrics_for_current_process() {
        let memory = collect_memory_metrics();
        assert!(memory.virtual_bytes >= memory.rss_bytes || memory.rss_bytes == 0);
    }
}
