//! Resource pack loading and parsing.
//!
//! This module handles loading Minecraft resource packs (ZIP files or directories)
//! and parsing their contents including blockstates, models, and textures.

pub mod blockstate;
pub mod loader;
pub mod model;
pub mod texture;

pub use blockstate::{BlockModelDefinition, Condition, MultipartSelector, Variant, VariantList};
pub use model::{BlockModel, DisplayContext, GuiLight, ItemTransform, ModelElement, ModelFace};
pub use texture::{AnimationMeta, TextureData};

use crate::types::ResourceLocation;
use std::collections::HashMap;
use std::sync::Arc;

/// A loaded Minecraft resource pack.
///
/// Blockstates are keyed by block id (`minecraft:stone`), models by model
/// path (`minecraft:block/stone`) and textures by texture path
/// (`minecraft:block/stone`), all without file extensions.
#[derive(Debug, Default, Clone)]
pub struct ResourcePack {
    blockstates: HashMap<ResourceLocation, BlockModelDefinition>,
    models: HashMap<ResourceLocation, BlockModel>,
    textures: HashMap<ResourceLocation, Arc<TextureData>>,
}

impl ResourcePack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a blockstate definition by block id.
    pub fn get_blockstate(&self, block: &ResourceLocation) -> Option<&BlockModelDefinition> {
        self.blockstates.get(block)
    }

    /// Get a model by location.
    pub fn get_model(&self, location: &ResourceLocation) -> Option<&BlockModel> {
        self.models.get(location)
    }

    /// Get a texture by location.
    pub fn get_texture(&self, location: &ResourceLocation) -> Option<&Arc<TextureData>> {
        self.textures.get(location)
    }

    pub fn add_blockstate(&mut self, block: ResourceLocation, definition: BlockModelDefinition) {
        self.blockstates.insert(block, definition);
    }

    pub fn add_model(&mut self, location: ResourceLocation, model: BlockModel) {
        self.models.insert(location, model);
    }

    pub fn add_texture(&mut self, location: ResourceLocation, texture: TextureData) {
        self.textures.insert(location, Arc::new(texture));
    }

    /// Attach animation metadata to an already loaded texture.
    pub fn apply_mcmeta(&mut self, location: &ResourceLocation, meta: AnimationMeta) -> bool {
        match self.textures.get_mut(location) {
            Some(texture) => {
                Arc::make_mut(texture).apply_mcmeta(meta);
                true
            }
            None => false,
        }
    }

    pub fn blockstates(&self) -> impl Iterator<Item = (&ResourceLocation, &BlockModelDefinition)> {
        self.blockstates.iter()
    }

    pub fn models(&self) -> impl Iterator<Item = (&ResourceLocation, &BlockModel)> {
        self.models.iter()
    }

    pub fn textures(&self) -> impl Iterator<Item = (&ResourceLocation, &Arc<TextureData>)> {
        self.textures.iter()
    }

    /// Get the total number of blockstate definitions.
    pub fn blockstate_count(&self) -> usize {
        self.blockstates.len()
    }

    /// Get the total number of models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Get the total number of textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Get all namespaces in the resource pack.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<_> = self
            .blockstates
            .keys()
            .chain(self.models.keys())
            .chain(self.textures.keys())
            .map(|location| location.namespace())
            .collect();
        namespaces.sort();
        namespaces.dedup();
        namespaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_lookup_and_counts() {
        let mut pack = ResourcePack::new();
        pack.add_model(ResourceLocation::minecraft("block/stone"), BlockModel::new());
        pack.add_model(
            ResourceLocation::parse("mymod:block/custom").unwrap(),
            BlockModel::new(),
        );
        pack.add_texture(
            ResourceLocation::minecraft("block/stone"),
            TextureData::new(1, 1, vec![255; 4]),
        );

        assert!(pack
            .get_model(&ResourceLocation::parse("block/stone").unwrap())
            .is_some());
        assert_eq!(pack.model_count(), 2);
        assert_eq!(pack.texture_count(), 1);
        assert_eq!(pack.namespaces(), vec!["minecraft", "mymod"]);
    }

    #[test]
    fn test_apply_mcmeta_to_loaded_texture() {
        let mut pack = ResourcePack::new();
        let location = ResourceLocation::minecraft("block/water_still");
        pack.add_texture(location.clone(), TextureData::new(1, 2, vec![255; 8]));

        assert!(pack.apply_mcmeta(&location, AnimationMeta::default()));
        assert!(pack.get_texture(&location).unwrap().animation.is_some());
        assert!(!pack.apply_mcmeta(&ResourceLocation::minecraft("block/lava"), AnimationMeta::default()));
    }
}
