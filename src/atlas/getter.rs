use super::{Material, Sprite, SpriteLookup};
use crate::resolver::ResolvedTextures;
use crate::types::ResourceLocation;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Resolves texture slots of a model to sprites, falling back to the
/// missing sprite. Each missing reference is reported once per model.
pub struct SpriteGetter {
    lookup: Arc<dyn SpriteLookup>,
    reported: Mutex<HashSet<(ResourceLocation, String)>>,
}

impl SpriteGetter {
    pub fn new(lookup: Arc<dyn SpriteLookup>) -> Self {
        Self {
            lookup,
            reported: Mutex::new(HashSet::new()),
        }
    }

    pub fn missing(&self) -> Arc<Sprite> {
        self.lookup.missing()
    }

    /// Sprite for a resolved slot name.
    pub fn get_slot(
        &self,
        textures: &ResolvedTextures,
        slot: &str,
        model: &ResourceLocation,
    ) -> Arc<Sprite> {
        match textures.get(slot) {
            Some(material) => self.get(material, model),
            None => {
                if self.first_report(model, format!("#{}", slot)) {
                    log::warn!("Unable to resolve texture reference: #{} in {}", slot, model);
                }
                self.missing()
            }
        }
    }

    /// Sprite for a face's `texture` value: `#slot` or a direct texture location.
    pub fn get_face(
        &self,
        textures: &ResolvedTextures,
        reference: &str,
        model: &ResourceLocation,
    ) -> Arc<Sprite> {
        match reference.strip_prefix('#') {
            Some(slot) => self.get_slot(textures, slot, model),
            None => match ResourceLocation::parse(reference) {
                Some(texture) => self.get(&Material::new(texture), model),
                None => {
                    if self.first_report(model, reference.to_string()) {
                        log::warn!("Invalid texture reference '{}' in {}", reference, model);
                    }
                    self.missing()
                }
            },
        }
    }

    /// Sprite for a concrete material.
    pub fn get(&self, material: &Material, model: &ResourceLocation) -> Arc<Sprite> {
        match self.lookup.find(material) {
            Some(sprite) => sprite,
            None => {
                if self.first_report(model, material.to_string()) {
                    log::warn!("Missing texture {} in {}", material, model);
                }
                self.missing()
            }
        }
    }

    fn first_report(&self, model: &ResourceLocation, what: String) -> bool {
        self.reported.lock().insert((model.clone(), what))
    }
}

impl std::fmt::Debug for SpriteGetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteGetter")
            .field("reported", &self.reported.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SpriteAtlas;
    use crate::resource_pack::TextureData;

    fn getter() -> SpriteGetter {
        let mut atlas = SpriteAtlas::new();
        atlas.insert(Sprite::standalone(
            ResourceLocation::minecraft("block/stone"),
            TextureData::new(1, 1, vec![255; 4]),
        ));
        SpriteGetter::new(Arc::new(atlas))
    }

    #[test]
    fn test_slot_lookup_and_fallback() {
        let getter = getter();
        let model = ResourceLocation::minecraft("block/test");
        let mut textures = ResolvedTextures::default();
        textures.insert("all", Material::new(ResourceLocation::minecraft("block/stone")));
        textures.insert("gone", Material::new(ResourceLocation::minecraft("block/gone")));

        assert_eq!(getter.get_slot(&textures, "all", &model).name().path(), "block/stone");
        assert_eq!(getter.get_slot(&textures, "nope", &model), getter.missing());
        assert_eq!(getter.get_slot(&textures, "gone", &model), getter.missing());
    }

    #[test]
    fn test_face_reference_forms() {
        let getter = getter();
        let model = ResourceLocation::minecraft("block/test");
        let mut textures = ResolvedTextures::default();
        textures.insert("all", Material::new(ResourceLocation::minecraft("block/stone")));

        assert_eq!(getter.get_face(&textures, "#all", &model).name().path(), "block/stone");
        assert_eq!(
            getter.get_face(&textures, "minecraft:block/stone", &model).name().path(),
            "block/stone"
        );
        assert_eq!(getter.get_face(&textures, "", &model), getter.missing());
    }
}
