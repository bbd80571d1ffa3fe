//! HTTP handlers
//!
//! - [`status`] - `/health`, `/status`
//! - [`scrape`] - `/api/scrape`
//! - [`embeds`] - `/api/embeds` CRUD and embed code

pub mod embeds;
pub mod error;
pub mod extract;
pub mod scrape;
pub mod status;

use std::sync::Arc;

use crate::embed::{BlobStore, EmbedStore};
use crate::styles::StyleExtractor;

pub use embeds::{
    create_embed_handler, delete_embed_handler, embed_code_handler, get_embed_handler,
    list_embeds_handler, update_embed_handler, CreateEmbedRequest, CreateEmbedResponse,
    EmbedCodeResponse, ImageUpload, OwnerId,
};
pub use error::ApiError;
pub use extract::{ApiJson, ApiPath};
pub use scrape::{scrape_handler, ScrapeRequest};
pub use status::{
    health_handler, status_handler, HealthResponse, LatencyHistogram, LatencyMetrics,
    MemoryMetrics, ServiceMetrics, StatusResponse,
};

/// Header carrying the pre-authenticated caller id
pub const USER_ID_HEADER: &str = "x-user-id";

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Website style extraction
    pub extractor: StyleExtractor,
    /// Embed records
    pub embeds: Arc<dyn EmbedStore>,
    /// Uploaded images
    pub blobs: Arc<dyn BlobStore>,
    /// Counters reported by `/status`
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Wire the handlers to their collaborators with fresh metrics
    pub fn new(
        extractor: StyleExtractor,
        embeds: Arc<dyn EmbedStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            extractor,
            embeds,
            blobs,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}
