//! # Block Model Baker
//!
//! A Rust library for baking Minecraft block and item models into
//! renderer-ready quads.
//!
//! ## Overview
//!
//! This library takes a resource pack as input, resolves model inheritance
//! and texture slots, and bakes every block state into immutable quad
//! collections split by cull direction. Identical descriptions are baked once
//! per session and shared.
//!
//! ## Quick Start
//!
//! ```ignore
//! use block_model_baker::{bake_blocks, load_resource_pack, BakeConfig, SpriteAtlas};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! // Load a resource pack
//! let pack = load_resource_pack("path/to/pack.zip")?;
//!
//! // One sprite per texture, grouped by atlas
//! let sprites = Arc::new(SpriteAtlas::from_pack(&pack));
//!
//! // Bake every block state
//! let baked = bake_blocks(&pack, sprites, &HashMap::new(), &BakeConfig::default());
//! ```
//!
//! ## Single Models
//!
//! Items and individual models are baked through a [`ModelBaker`] session:
//!
//! ```ignore
//! use block_model_baker::{ModelBaker, ResourceLocation};
//!
//! let baker = ModelBaker::new(&pack, sprites);
//! let stick = baker.bake_item_model(&ResourceLocation::minecraft("item/stick"));
//! ```

pub mod atlas;
pub mod baker;
pub mod error;
pub mod resolver;
pub mod resource_pack;
pub mod types;

// Re-export main types for convenience
pub use atlas::{Material, Sprite, SpriteAtlas, SpriteGetter, SpriteLookup};
pub use baker::{
    bake_blocks, BakeConfig, BakedItemModel, BakingResult, BlockModelPart, BlockStateModel,
    ModelBaker, UnbakedRoot, VisualGroup,
};
pub use error::{BakeError, Result};
pub use resolver::{BlockState, ModelResolver, Property, ResolvedModel, StateDefinition};
pub use resource_pack::{BlockModel, BlockModelDefinition, ModelElement, ResourcePack};
pub use types::{
    Axis, BakedQuad, Direction, ModelState, QuadCollection, Quadrant, ResourceLocation,
};

/// Load a resource pack from a file path (ZIP or directory).
pub fn load_resource_pack<P: AsRef<std::path::Path>>(path: P) -> Result<ResourcePack> {
    resource_pack::loader::load_from_path(path)
}

/// Load a resource pack from the bytes of a ZIP archive.
pub fn load_resource_pack_from_bytes(data: &[u8]) -> Result<ResourcePack> {
    resource_pack::loader::load_from_bytes(data)
}
