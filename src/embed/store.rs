//! Embed record storage

use crate::embed::model::{Embed, EmbedUpdate, NewEmbed};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

/// CRUD over embed records
#[async_trait]
pub trait EmbedStore: Send + Sync {
    /// Insert a record and return it with its assigned id
    async fn create(&self, embed: NewEmbed) -> Result<Embed>;

    /// Fetch one record
    async fn get(&self, id: u64) -> Result<Option<Embed>>;

    /// All records owned by `user_id`, newest first
    async fn list_by_owner(&self, user_id: u64) -> Result<Vec<Embed>>;

    /// Apply a partial update; `None` if the record does not exist
    async fn update(&self, id: u64, update: EmbedUpdate) -> Result<Option<Embed>>;

    /// Remove a record; `false` if it did not exist
    async fn delete(&self, id: u64) -> Result<bool>;
}

#[derive(Debug, Default)]
struct Records {
    last_id: u64,
    embeds: BTreeMap<u64, Embed>,
}

/// Process-local store, ids assigned sequentially from 1
#[derive(Debug, Default)]
pub struct InMemoryEmbedStore {
    records: RwLock<Records>,
}

impl InMemoryEmbedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().embeds.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EmbedStore for InMemoryEmbedStore {
    async fn create(&self, embed: NewEmbed) -> Result<Embed> {
        let mut records = self.records.write();
        records.last_id += 1;
        let id = records.last_id;

        let embed = embed.into_embed(id, Utc::now());
        records.embeds.insert(id, embed.clone());
        debug!(id, user_id = embed.user_id, "Created embed");
        Ok(embed)
    }

    async fn get(&self, id: u64) -> Result<Option<Embed>> {
        Ok(self.records.read().embeds.get(&id).cloned())
    }

    async fn list_by_owner(&self, user_id: u64) -> Result<Vec<Embed>> {
        let records = self.records.read();
        let mut owned: Vec<Embed> = records
            .embeds
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Ids break ties between records created within the same instant
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn update(&self, id: u64, update: EmbedUpdate) -> Result<Option<Embed>> {
        let mut records = self.records.write();
        let Some(embed) = records.embeds.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(embed, Utc::now());
        debug!(id, "Updated embed");
        Ok(Some(embed.clone()))
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let removed = self.records.write().embeds.remove(&id).is_some();
        debug!(id, removed, "Deleted embed");
        Ok(removed)
    }
}
