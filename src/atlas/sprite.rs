use super::{atlas_for, block_atlas, missing_texture, AtlasRegion, Material};
use crate::resource_pack::{ResourcePack, TextureData};
use crate::types::ResourceLocation;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A texture placed on an atlas page.
#[derive(Clone)]
pub struct Sprite {
    name: ResourceLocation,
    atlas: ResourceLocation,
    region: AtlasRegion,
    contents: Arc<TextureData>,
}

impl Sprite {
    pub fn new(
        name: ResourceLocation,
        atlas: ResourceLocation,
        region: AtlasRegion,
        contents: Arc<TextureData>,
    ) -> Self {
        Self {
            name,
            atlas,
            region,
            contents,
        }
    }

    /// A sprite covering the whole UV space of its own texture.
    pub fn standalone(name: ResourceLocation, contents: TextureData) -> Self {
        let atlas = atlas_for(&name);
        Self::new(name, atlas, AtlasRegion::FULL, Arc::new(contents))
    }

    pub fn name(&self) -> &ResourceLocation {
        &self.name
    }

    pub fn atlas(&self) -> &ResourceLocation {
        &self.atlas
    }

    pub fn region(&self) -> &AtlasRegion {
        &self.region
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.contents.frame_width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.contents.frame_height()
    }

    /// Map a local U (0-1) into atlas space.
    pub fn get_u(&self, u: f32) -> f32 {
        self.region.u_min + self.region.width() * u
    }

    /// Map a local V (0-1) into atlas space.
    pub fn get_v(&self, v: f32) -> f32 {
        self.region.v_min + self.region.height() * v
    }

    pub fn unique_frames(&self) -> Vec<u32> {
        self.contents.unique_frames()
    }

    /// Whether the pixel at (x, y) of `frame` is fully transparent.
    /// Pixels outside the sprite count as transparent.
    pub fn is_transparent(&self, frame: u32, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return true;
        }
        self.contents.frame_alpha(frame, x as u32, y as u32) == 0
    }
}

impl PartialEq for Sprite {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.atlas == other.atlas
    }
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sprite")
            .field("name", &self.name)
            .field("atlas", &self.atlas)
            .field("region", &self.region)
            .finish()
    }
}

/// Source of sprites for a bake session.
pub trait SpriteLookup: Send + Sync {
    /// Find the sprite for a material.
    fn find(&self, material: &Material) -> Option<Arc<Sprite>>;

    /// The missing-texture sprite.
    fn missing(&self) -> Arc<Sprite>;
}

/// In-memory sprite lookup, one page per atlas.
#[derive(Debug)]
pub struct SpriteAtlas {
    pages: HashMap<ResourceLocation, HashMap<ResourceLocation, Arc<Sprite>>>,
    missing: Arc<Sprite>,
}

impl Default for SpriteAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteAtlas {
    /// An atlas holding only the missing-texture sprite.
    pub fn new() -> Self {
        let missing = Arc::new(Sprite::new(
            missing_texture(),
            block_atlas(),
            AtlasRegion::FULL,
            Arc::new(TextureData::placeholder()),
        ));
        Self {
            pages: HashMap::new(),
            missing,
        }
    }

    /// Register a sprite on its atlas page.
    pub fn insert(&mut self, sprite: Sprite) {
        self.pages
            .entry(sprite.atlas().clone())
            .or_default()
            .insert(sprite.name().clone(), Arc::new(sprite));
    }

    /// One full-region sprite per texture of a pack, on the page its directory selects.
    pub fn from_pack(pack: &ResourcePack) -> Self {
        let mut atlas = Self::new();
        for (location, texture) in pack.textures() {
            atlas.insert(Sprite::new(
                location.clone(),
                atlas_for(location),
                AtlasRegion::FULL,
                Arc::clone(texture),
            ));
        }
        for (page, sprites) in &atlas.pages {
            log::debug!("{} sprites on {}", sprites.len(), page);
        }
        atlas
    }

    pub fn sprite_count(&self) -> usize {
        self.pages.values().map(|page| page.len()).sum()
    }
}

impl SpriteLookup for SpriteAtlas {
    fn find(&self, material: &Material) -> Option<Arc<Sprite>> {
        if material.texture == missing_texture() {
            return Some(Arc::clone(&self.missing));
        }
        self.pages
            .get(&material.atlas)
            .and_then(|page| page.get(&material.texture))
            .cloned()
    }

    fn missing(&self) -> Arc<Sprite> {
        Arc::clone(&self.missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(width: u32, height: u32) -> TextureData {
        TextureData::new(width, height, vec![255; (width * height * 4) as usize])
    }

    #[test]
    fn test_sprite_uv_mapping() {
        let sprite = Sprite::new(
            ResourceLocation::minecraft("block/stone"),
            block_atlas(),
            AtlasRegion {
                u_min: 0.5,
                v_min: 0.25,
                u_max: 0.75,
                v_max: 0.5,
            },
            Arc::new(opaque(16, 16)),
        );
        assert_eq!(sprite.get_u(0.0), 0.5);
        assert_eq!(sprite.get_u(1.0), 0.75);
        assert_eq!(sprite.get_v(0.5), 0.375);
    }

    #[test]
    fn test_sprite_transparency_out_of_bounds() {
        let sprite = Sprite::standalone(ResourceLocation::minecraft("item/stick"), opaque(4, 4));
        assert!(!sprite.is_transparent(0, 0, 0));
        assert!(sprite.is_transparent(0, -1, 0));
        assert!(sprite.is_transparent(0, 0, 4));
    }

    #[test]
    fn test_lookup_and_missing() {
        let mut atlas = SpriteAtlas::new();
        let stone = ResourceLocation::minecraft("block/stone");
        atlas.insert(Sprite::standalone(stone.clone(), opaque(16, 16)));

        let found = atlas.find(&Material::new(stone)).unwrap();
        assert_eq!(found.name().path(), "block/stone");
        assert!(atlas
            .find(&Material::new(ResourceLocation::minecraft("block/dirt")))
            .is_none());
        assert_eq!(atlas.find(&Material::missing()).unwrap().name(), &missing_texture());
    }

    #[test]
    fn test_from_pack_places_every_texture() {
        let mut pack = ResourcePack::new();
        pack.add_texture(ResourceLocation::minecraft("block/stone"), opaque(16, 16));
        pack.add_texture(ResourceLocation::minecraft("item/apple"), opaque(16, 16));
        pack.add_texture(ResourceLocation::minecraft("entity/pig"), opaque(64, 32));

        let atlas = SpriteAtlas::from_pack(&pack);
        assert_eq!(atlas.sprite_count(), 3);

        let pig = atlas
            .find(&Material::new(ResourceLocation::minecraft("entity/pig")))
            .unwrap();
        assert_eq!(pig.atlas().to_string(), "minecraft:textures/atlas/entity.png");
        assert_eq!(pig.region(), &AtlasRegion::FULL);
        assert_eq!((pig.width(), pig.height()), (64, 32));
        assert_eq!(atlas.missing().atlas(), &block_atlas());
    }
}
