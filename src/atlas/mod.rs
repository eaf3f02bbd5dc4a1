//! Sprite atlases.
//!
//! Textures are grouped into atlas pages by directory. Baking only needs
//! each sprite's UV region and per-pixel transparency; placing sprites on a
//! shared image is left to the renderer.

mod getter;
mod region;
mod sprite;

pub use region::AtlasRegion;
pub use getter::SpriteGetter;
pub use sprite::{Sprite, SpriteAtlas, SpriteLookup};

use crate::types::ResourceLocation;

/// Atlas holding every block and item texture.
pub const BLOCK_ATLAS: &str = "minecraft:textures/atlas/blocks.png";

/// Name of the missing-texture sprite.
pub const MISSING_TEXTURE: &str = "minecraft:missingno";

pub fn block_atlas() -> ResourceLocation {
    ResourceLocation::minecraft("textures/atlas/blocks.png")
}

pub fn missing_texture() -> ResourceLocation {
    ResourceLocation::minecraft("missingno")
}

/// Atlas a texture belongs to, decided by its top-level directory.
///
/// `block/` and `item/` textures (and bare names) share the block atlas,
/// anything else goes to `<namespace>:textures/atlas/<dir>.png`.
pub fn atlas_for(texture: &ResourceLocation) -> ResourceLocation {
    match texture.path().split_once('/') {
        Some(("block", _)) | Some(("item", _)) | None => block_atlas(),
        Some((dir, _)) => ResourceLocation::new(
            texture.namespace(),
            format!("textures/atlas/{}.png", dir),
        ),
    }
}

/// A texture reference bound to the atlas it lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Material {
    pub atlas: ResourceLocation,
    pub texture: ResourceLocation,
    /// Render as translucent even if the texture is fully opaque.
    pub force_translucent: bool,
}

impl Material {
    pub fn new(texture: ResourceLocation) -> Self {
        Self {
            atlas: atlas_for(&texture),
            texture,
            force_translucent: false,
        }
    }

    pub fn with_force_translucent(mut self, force_translucent: bool) -> Self {
        self.force_translucent = force_translucent;
        self
    }

    /// The missing-texture material on the block atlas.
    pub fn missing() -> Self {
        Self::new(missing_texture())
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.texture, self.atlas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_for_texture_directory() {
        let stone = ResourceLocation::minecraft("block/stone");
        assert_eq!(atlas_for(&stone).to_string(), BLOCK_ATLAS);

        let apple = ResourceLocation::parse("mymod:item/apple").unwrap();
        assert_eq!(atlas_for(&apple), block_atlas());

        let chest = ResourceLocation::minecraft("entity/chest/normal");
        assert_eq!(
            atlas_for(&chest).to_string(),
            "minecraft:textures/atlas/entity.png"
        );
    }

    #[test]
    fn test_missing_material() {
        let missing = Material::missing();
        assert_eq!(missing.texture.to_string(), MISSING_TEXTURE);
        assert_eq!(missing.atlas, block_atlas());
    }
}
