//! Model baking.
//!
//! This module turns resolved models into immutable quads and maps every
//! block state of a pack to a shared baked model.

pub mod block_model;
pub mod cache;
pub mod dispatcher;
pub mod face;
pub mod geometry;
pub mod item_generator;
pub mod session;

pub use block_model::{BlockModelPart, BlockStateModel, UnbakedMultipart, UnbakedRoot, VisualGroup};
pub use cache::SingleFlight;
pub use dispatcher::{bake_blocks, instantiate_roots, BakingResult};
pub use face::bake_quad;
pub use geometry::bake_elements;
pub use session::{BakedItemModel, ModelBaker};

use crate::atlas::block_atlas;
use crate::types::ResourceLocation;

/// Baking configuration.
#[derive(Debug, Clone)]
pub struct BakeConfig {
    /// Worker threads used by [`bake_blocks`].
    pub workers: usize,
    /// The atlas block models must draw from.
    pub block_atlas: ResourceLocation,
    /// Replace block models using sprites from other atlases with the missing model.
    pub reject_foreign_sprites: bool,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            block_atlas: block_atlas(),
            reject_foreign_sprites: true,
        }
    }
}

impl BakeConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_reject_foreign_sprites(mut self, reject: bool) -> Self {
        self.reject_foreign_sprites = reject;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_keeps_other_fields() {
        let config = BakeConfig::default()
            .with_workers(0)
            .with_reject_foreign_sprites(false);
        assert_eq!(config.workers, 1);
        assert!(!config.reject_foreign_sprites);
        assert_eq!(config.block_atlas, block_atlas());

        let config = BakeConfig {
            workers: 3,
            ..BakeConfig::default()
        };
        assert!(config.reject_foreign_sprites);
    }
}
