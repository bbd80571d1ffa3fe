//! Embed CRUD and embed-code endpoints
//!
//! All routes except the embed code require the caller identity in
//! [`USER_ID_HEADER`]. Records owned by someone else are reported as missing.

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::embed::{
    decode_image, generate_embed_code, image_key, Embed, EmbedUpdate, ImageSlot, NewEmbed,
    DEFAULT_HEIGHT, DEFAULT_TOGGLE_STYLE, DEFAULT_WIDTH,
};
use crate::handlers::{ApiError, ApiJson, ApiPath, AppState, USER_ID_HEADER};

/// Authenticated caller, read from [`USER_ID_HEADER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(OwnerId)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Base64 image with its MIME type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpload {
    /// Standard base64 payload
    pub data: String,
    /// e.g. `image/png`
    pub mime_type: String,
}

fn default_toggle_style() -> String {
    DEFAULT_TOGGLE_STYLE.to_string()
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

/// Body of `POST /api/embeds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmbedRequest {
    /// Display name
    pub name: String,
    /// Image shown first
    pub before_image: ImageUpload,
    /// Image shown after toggling
    pub after_image: ImageUpload,
    /// Site the palette came from
    #[serde(default)]
    pub website_url: Option<String>,
    /// Palette, accent first
    #[serde(default)]
    pub colors: Vec<String>,
    /// Fonts, primary first
    #[serde(default)]
    pub fonts: Vec<String>,
    /// Toggle control style
    #[serde(default = "default_toggle_style")]
    pub toggle_style: String,
    /// Widget width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Widget height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

/// Result of `POST /api/embeds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmbedResponse {
    /// Always true
    pub success: bool,
    /// Id of the new record
    pub id: u64,
}

/// Result of `GET /api/embeds/:id/code`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedCodeResponse {
    /// HTML snippet to paste into a page
    pub code: String,
}

async fn upload_image(
    state: &AppState,
    owner: OwnerId,
    slot: ImageSlot,
    image: &ImageUpload,
) -> Result<(String, String), ApiError> {
    let key = image_key(owner.0, slot, &image.mime_type)?;
    let bytes = decode_image(&image.data)?;
    let stored = state.blobs.put(&key, bytes, &image.mime_type).await?;
    Ok((stored.url, stored.key))
}

/// Fetch a record the caller owns
async fn owned_embed(state: &AppState, owner: OwnerId, id: u64) -> Result<Embed, ApiError> {
    match state.embeds.get(id).await? {
        Some(embed) if embed.user_id == owner.0 => Ok(embed),
        Some(_) => {
            debug!(id, user_id = owner.0, "Embed owned by another user");
            Err(ApiError::NotFound)
        }
        None => Err(ApiError::NotFound),
    }
}

/// `POST /api/embeds`
#[instrument(skip(state, req), fields(user_id = owner.0))]
pub async fn create_embed_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    ApiJson(req): ApiJson<CreateEmbedRequest>,
) -> Result<(StatusCode, Json<CreateEmbedResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name cannot be empty".to_string()));
    }

    let (before_image_url, before_image_key) =
        upload_image(&state, owner, ImageSlot::Before, &req.before_image).await?;
    let (after_image_url, after_image_key) =
        upload_image(&state, owner, ImageSlot::After, &req.after_image).await?;

    let embed = state
        .embeds
        .create(NewEmbed {
            user_id: owner.0,
            name: req.name,
            before_image_url,
            before_image_key,
            after_image_url,
            after_image_key,
            website_url: req.website_url.filter(|u| !u.trim().is_empty()),
            colors: req.colors,
            fonts: req.fonts,
            toggle_style: req.toggle_style,
            width: req.width,
            height: req.height,
        })
        .await?;

    state.metrics.record_embed_created();
    info!(id = embed.id, "Embed created");
    Ok((
        StatusCode::CREATED,
        Json(CreateEmbedResponse {
            success: true,
            id: embed.id,
        }),
    ))
}

/// `GET /api/embeds`
#[instrument(skip(state), fields(user_id = owner.0))]
pub async fn list_embeds_handler(
    State(state): State<AppState>,
    owner: OwnerId,
) -> Result<Json<Vec<Embed>>, ApiError> {
    Ok(Json(state.embeds.list_by_owner(owner.0).await?))
}

/// `GET /api/embeds/:id`
#[instrument(skip(state), fields(user_id = owner.0))]
pub async fn get_embed_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<Embed>, ApiError> {
    Ok(Json(owned_embed(&state, owner, id).await?))
}

/// `PATCH /api/embeds/:id`
#[instrument(skip(state, update), fields(user_id = owner.0))]
pub async fn update_embed_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    ApiPath(id): ApiPath<u64>,
    ApiJson(update): ApiJson<EmbedUpdate>,
) -> Result<Json<Value>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }
    owned_embed(&state, owner, id).await?;

    state
        .embeds
        .update(id, update)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(id, "Embed updated");
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/embeds/:id`
#[instrument(skip(state), fields(user_id = owner.0))]
pub async fn delete_embed_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<Value>, ApiError> {
    owned_embed(&state, owner, id).await?;

    if !state.embeds.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    info!(id, "Embed deleted");
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/embeds/:id/code`, public
#[instrument(skip(state))]
pub async fn embed_code_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<EmbedCodeResponse>, ApiError> {
    let embed = state.embeds.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(EmbedCodeResponse {
        code: generate_embed_code(&embed),
    }))
}
