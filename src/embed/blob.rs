//! Blob storage for uploaded before/after images

use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::RwLock;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Where a blob ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Storage key
    pub key: String,
    /// Public URL serving the blob
    pub url: String,
}

/// Minimal blob storage: write bytes under a key, get a public URL back
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredBlob>;
}

/// Which side of the before/after pair an image is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    /// Shown first
    Before,
    /// Shown after toggling
    After,
}

impl ImageSlot {
    fn as_str(self) -> &'static str {
        match self {
            ImageSlot::Before => "before",
            ImageSlot::After => "after",
        }
    }
}

/// File extension for an image MIME type (`image/png` → `png`)
pub fn image_extension(mime_type: &str) -> Result<String> {
    let subtype = mime_type
        .strip_prefix("image/")
        .ok_or_else(|| EmbedError::InvalidImage(format!("not an image type: {}", mime_type)))?;

    let valid = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    if !valid {
        return Err(EmbedError::InvalidImage(format!("bad image subtype: {}", mime_type)).into());
    }
    Ok(subtype.to_ascii_lowercase())
}

/// Storage key for an uploaded image:
/// `embeds/<user>/<slot>-<unix millis>-<6 random chars>.<ext>`
pub fn image_key(user_id: u64, slot: ImageSlot, mime_type: &str) -> Result<String> {
    let ext = image_extension(mime_type)?;
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    Ok(format!(
        "embeds/{}/{}-{}-{}.{}",
        user_id,
        slot.as_str(),
        chrono::Utc::now().timestamp_millis(),
        suffix,
        ext
    ))
}

/// Decode a base64 image payload
pub fn decode_image(data: &str) -> Result<Vec<u8>> {
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| EmbedError::InvalidImage(e.to_string()))?;
    if bytes.is_empty() {
        return Err(EmbedError::InvalidImage("empty image".to_string()).into());
    }
    Ok(bytes)
}

/// Reject keys that could escape the storage root
fn checked_relative(key: &str) -> Result<&Path> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(EmbedError::Storage(format!("invalid key: {}", key)).into());
    }
    Ok(path)
}

/// Blob store writing files under a local directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Store files under `root`, served from `public_base_url`
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredBlob> {
        let path = self.root.join(checked_relative(key)?);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EmbedError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| EmbedError::Storage(e.to_string()))?;

        debug!(path = %path.display(), "Stored blob");
        Ok(StoredBlob {
            key: key.to_string(),
            url: format!("{}/{}", self.public_base_url, key),
        })
    }
}

/// Blob store keeping everything in memory
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl InMemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type and bytes stored under `key`
    pub fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.blobs.read().get(key).cloned()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredBlob> {
        checked_relative(key)?;
        self.blobs
            .write()
            .insert(key.to_string(), (content_type.to_string(), bytes));
        Ok(StoredBlob {
            key: key.to_string(),
            url: format!("memory://{}", key),
        })
    }
}
