//! Router assembly and serving
//!
//! ```text
//! /health, /status            status handlers
//! /api/scrape                 style extraction
//! /api/embeds[/:id[/code]]    embed CRUD + embed code
//! /uploads/*                  uploaded images (local blob store only)
//! ```

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
use crate::cors::cors_layer;
use crate::error::Result;
use crate::handlers::{
    create_embed_handler, delete_embed_handler, embed_code_handler, get_embed_handler,
    health_handler, list_embeds_handler, scrape_handler, status_handler, update_embed_handler,
    AppState,
};

/// Options for [`build_router`]
#[derive(Debug, Clone)]
pub struct RouterOptions<'a> {
    /// CORS origins; empty admits localhost only
    pub allowed_origins: &'a [String],
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Serve this directory under `/uploads`
    pub uploads_dir: Option<&'a Path>,
}

impl Default for RouterOptions<'_> {
    fn default() -> Self {
        Self {
            allowed_origins: &[],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            uploads_dir: None,
        }
    }
}

/// Build the API router over `state`
pub fn build_router(state: AppState, opts: RouterOptions<'_>) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/api/scrape", post(scrape_handler))
        .route(
            "/api/embeds",
            post(create_embed_handler).get(list_embeds_handler),
        )
        .route(
            "/api/embeds/:id",
            get(get_embed_handler)
                .patch(update_embed_handler)
                .delete(delete_embed_handler),
        )
        .route("/api/embeds/:id/code", get(embed_code_handler))
        .with_state(state);

    let router = match opts.uploads_dir {
        Some(dir) => api.nest_service("/uploads", ServeDir::new(dir)),
        None => api,
    };

    router
        .layer(DefaultBodyLimit::max(opts.max_body_bytes))
        .layer(cors_layer(opts.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl+C
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = build_router(
        state,
        RouterOptions {
            allowed_origins: &config.allowed_origins,
            max_body_bytes: config.max_body_bytes,
            uploads_dir: Some(&config.uploads_dir),
        },
    );

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
