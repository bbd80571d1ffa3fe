//! CORS configuration for the HTTP API
//!
//! The dashboard calling the API is the only cross-origin client. With no
//! origins configured the policy admits localhost only; otherwise exactly the
//! configured origins are admitted.
//!
//! # Example
//!
//! ```rust,no_run
//! use beforeafter_web::cors::cors_layer;
//! use axum::Router;
//!
//! let app: Router = Router::new().layer(cors_layer(&["https://app.example.com".to_string()]));
//! ```

use crate::handlers::USER_ID_HEADER;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use url::Url;

/// Allowed methods for the embed API
pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Default max age for preflight cache (1 hour)
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Build the CORS layer.
///
/// An empty `origins` list means localhost-only. Origins that are not valid
/// header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::predicate(|origin, _| is_localhost_origin(origin))
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o.trim_end_matches('/')) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
        .max_age(Duration::from_secs(DEFAULT_MAX_AGE_SECS))
}

/// Whether an Origin header names a loopback host (`localhost`,
/// `127.0.0.1`, `[::1]`) over http or https
pub fn is_localhost_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Ok(url) = Url::parse(origin) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    )
}
