//! Embed records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Toggle style used when none is given
pub const DEFAULT_TOGGLE_STYLE: &str = "switch";

/// Widget width in pixels when none is given
pub const DEFAULT_WIDTH: u32 = 600;

/// Widget height in pixels when none is given
pub const DEFAULT_HEIGHT: u32 = 400;

/// A persisted before/after widget configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Record id
    pub id: u64,
    /// Owning user
    pub user_id: u64,
    /// Display name
    pub name: String,
    /// Public URL of the "before" image
    pub before_image_url: String,
    /// Blob storage key of the "before" image
    pub before_image_key: String,
    /// Public URL of the "after" image
    pub after_image_url: String,
    /// Blob storage key of the "after" image
    pub after_image_key: String,
    /// Site the palette was taken from, if any
    pub website_url: Option<String>,
    /// Palette, accent first
    pub colors: Vec<String>,
    /// Font names, primary first
    pub fonts: Vec<String>,
    /// Toggle control style
    pub toggle_style: String,
    /// Widget width in pixels
    pub width: u32,
    /// Widget height in pixels
    pub height: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create an [`Embed`]; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmbed {
    /// Owning user
    pub user_id: u64,
    /// Display name
    pub name: String,
    /// Public URL of the "before" image
    pub before_image_url: String,
    /// Blob storage key of the "before" image
    pub before_image_key: String,
    /// Public URL of the "after" image
    pub after_image_url: String,
    /// Blob storage key of the "after" image
    pub after_image_key: String,
    /// Site the palette was taken from, if any
    pub website_url: Option<String>,
    /// Palette, accent first
    pub colors: Vec<String>,
    /// Font names, primary first
    pub fonts: Vec<String>,
    /// Toggle control style
    pub toggle_style: String,
    /// Widget width in pixels
    pub width: u32,
    /// Widget height in pixels
    pub height: u32,
}

impl NewEmbed {
    /// Materialize the record
    pub fn into_embed(self, id: u64, now: DateTime<Utc>) -> Embed {
        Embed {
            id,
            user_id: self.user_id,
            name: self.name,
            before_image_url: self.before_image_url,
            before_image_key: self.before_image_key,
            after_image_url: self.after_image_url,
            after_image_key: self.after_image_key,
            website_url: self.website_url,
            colors: self.colors,
            fonts: self.fonts,
            toggle_style: self.toggle_style,
            width: self.width,
            height: self.height,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedUpdate {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New palette, accent first
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    /// New font names, primary first
    #[serde(default)]
    pub fonts: Option<Vec<String>>,
    /// New toggle control style
    #[serde(default)]
    pub toggle_style: Option<String>,
    /// New widget width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// New widget height in pixels
    #[serde(default)]
    pub height: Option<u32>,
}

impl EmbedUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields to `embed` and bump `updated_at`
    pub fn apply(self, embed: &mut Embed, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            embed.name = name;
        }
        if let Some(colors) = self.colors {
            embed.colors = colors;
        }
        if let Some(fonts) = self.fonts {
            embed.fonts = fonts;
        }
        if let Some(toggle_style) = self.toggle_style {
            embed.toggle_style = toggle_style;
        }
        if let Some(width) = self.width {
            embed.width = width;
        }
        if let Some(height) = self.height {
            embed.height = height;
        }
        embed.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) fn sample_new_embed(user_id: u64, name: &str) -> NewEmbed {
    NewEmbed {
        user_id,
        name: name.to_string(),
        before_image_url: "https://cdn.example.com/before.png".to_string(),
        before_image_key: "embeds/1/before.png".to_string(),
        after_image_url: "https://cdn.example.com/after.png".to_string(),
        after_image_key: "embeds/1/after.png".to_string(),
        website_url: None,
        colors: vec!["#3b82f6".to_string()],
        fonts: vec!["Inter".to_string()],
        toggle_style: DEFAULT_TOGGLE_STYLE.to_string(),
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_applies_only_set_fields() {
        let now = Utc::now();
        let mut embed = sample_new_embed(1, "Kitchen").into_embed(7, now);

        let later = now + chrono::Duration::seconds(5);
        EmbedUpdate {
            name: Some("Kitchen remodel".to_string()),
            width: Some(800),
            ..Default::default()
        }
        .apply(&mut embed, later);

        assert_eq!(embed.name, "Kitchen remodel");
        assert_eq!(embed.width, 800);
        assert_eq!(embed.height, DEFAULT_HEIGHT);
        assert_eq!(embed.colors, vec!["#3b82f6"]);
        assert_eq!(embed.created_at, now);
        assert_eq!(embed.updated_at, later);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(EmbedUpdate::default().is_empty());
        assert!(!EmbedUpdate {
            height: Some(300),
            ..Default::default()
        }
        .is_empty());
    }
}
