//! `POST /api/scrape`

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::browser::UrlValidator;
use crate::handlers::{ApiError, ApiJson, AppState};
use crate::styles::ScrapedStyles;

/// Request body for a style extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Absolute http(s) URL of the site
    pub url: String,
}

/// Extract a palette and fonts from the requested site
#[instrument(skip(state, req), fields(url = %req.url))]
pub async fn scrape_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ScrapeRequest>,
) -> Result<Json<ScrapedStyles>, ApiError> {
    let url = UrlValidator::validate(req.url.trim()).map_err(ApiError::BadRequest)?;

    let start = Instant::now();
    let result = state.extractor.extract(url.as_str()).await;
    state.metrics.record_scrape(start.elapsed(), result.is_ok());

    let styles = result?;
    info!(
        colors = styles.colors.len(),
        fonts = styles.fonts.len(),
        "Scrape request served"
    );
    Ok(Json(styles))
}
