//! Embed records, image storage and widget generation

pub mod blob;
pub mod code;
pub mod model;
pub mod store;

pub use blob::{
    decode_image, image_extension, image_key, BlobStore, ImageSlot, InMemoryBlobStore,
    LocalBlobStore, StoredBlob,
};
pub use code::{generate_embed_code, DEFAULT_ACCENT_COLOR, DEFAULT_FONT_STACK};
pub use model::{Embed, EmbedUpdate, NewEmbed, DEFAULT_HEIGHT, DEFAULT_TOGGLE_STYLE, DEFAULT_WIDTH};
pub use store::{EmbedStore, InMemoryEmbedStore};
