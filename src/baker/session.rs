//! One bake session: resolved models, sprites and the shared bake caches.

use super::block_model::{BlockModelPart, BlockStateModel, UnbakedMultipart, UnbakedRoot};
use super::cache::SingleFlight;
use super::geometry::bake_elements;
use super::item_generator::generate_elements;
use crate::atlas::{Sprite, SpriteGetter, SpriteLookup};
use crate::resolver::{missing_location, Geometry, ModelResolver, ResolvedModel};
use crate::resource_pack::{
    DisplayContext, GuiLight, ItemTransform, ResourcePack, Variant, VariantList,
};
use crate::types::{ModelState, QuadCollection, ResourceLocation};
use std::collections::HashMap;
use std::sync::Arc;

type PartKey = (ResourceLocation, ModelState);

/// A standalone baked model with its display settings, as used for items.
#[derive(Debug)]
pub struct BakedItemModel {
    pub location: ResourceLocation,
    pub quads: Arc<QuadCollection>,
    pub ambient_occlusion: bool,
    pub gui_light: GuiLight,
    pub particle: Arc<Sprite>,
    pub transforms: HashMap<DisplayContext, ItemTransform>,
    /// True when the model could not be found and the missing model was baked instead.
    pub is_missing: bool,
}

/// Bakes models for one resource pack. Every cache lives as long as the session.
///
/// All methods take `&self` and may be called from several threads; each
/// distinct part, variant list and multipart combination is baked once.
pub struct ModelBaker<'a> {
    resolver: ModelResolver<'a>,
    sprites: SpriteGetter,
    parts: SingleFlight<PartKey, Arc<BlockModelPart>>,
    roots: SingleFlight<UnbakedRoot, Arc<BlockStateModel>>,
    variants: SingleFlight<VariantList, Arc<BlockStateModel>>,
}

impl<'a> ModelBaker<'a> {
    pub fn new(pack: &'a ResourcePack, sprites: Arc<dyn SpriteLookup>) -> Self {
        Self {
            resolver: ModelResolver::new(pack),
            sprites: SpriteGetter::new(sprites),
            parts: SingleFlight::new(),
            roots: SingleFlight::new(),
            variants: SingleFlight::new(),
        }
    }

    pub fn resolver(&self) -> &ModelResolver<'a> {
        &self.resolver
    }

    pub fn sprites(&self) -> &SpriteGetter {
        &self.sprites
    }

    /// Bake a model under an orientation.
    pub fn bake_part(&self, location: &ResourceLocation, state: ModelState) -> Arc<BlockModelPart> {
        self.parts.get_or_compute((location.clone(), state), || {
            let resolved = self.resolver.resolve(location);
            Arc::new(self.bake_resolved(&resolved, &state))
        })
    }

    fn bake_resolved(&self, resolved: &ResolvedModel, state: &ModelState) -> BlockModelPart {
        let location = &resolved.location;
        let quads = match &resolved.geometry {
            Geometry::Elements(elements) => {
                bake_elements(elements, &resolved.textures, &self.sprites, state, location)
            }
            Geometry::Generated => {
                let elements = generate_elements(&resolved.textures, &self.sprites, location);
                bake_elements(&elements, &resolved.textures, &self.sprites, state, location)
            }
        };
        BlockModelPart {
            quads: Arc::new(quads),
            ambient_occlusion: resolved.ambient_occlusion,
            particle: self.sprites.get_slot(&resolved.textures, "particle", location),
        }
    }

    /// The missing model, unrotated.
    pub fn missing(&self) -> Arc<BlockStateModel> {
        self.bake_variants(&VariantList::new(vec![Variant::new(missing_location())]))
    }

    /// Bake a variant list: a single part, or a weighted choice.
    pub fn bake_variants(&self, list: &VariantList) -> Arc<BlockStateModel> {
        self.variants.get_or_compute(list.clone(), || {
            let mut parts: Vec<(u32, Arc<BlockModelPart>)> = list
                .iter()
                .map(|variant| {
                    (
                        variant.weight,
                        self.bake_part(&variant.model, variant.model_state()),
                    )
                })
                .collect();
            let model = if parts.len() == 1 {
                let (_, part) = parts.remove(0);
                BlockStateModel::Single(part)
            } else {
                BlockStateModel::Weighted(parts)
            };
            Arc::new(model)
        })
    }

    fn bake_multipart(&self, multipart: &UnbakedMultipart, matched: &[usize]) -> BlockStateModel {
        let selectors = matched
            .iter()
            .filter_map(|&i| multipart.selectors.get(i))
            .map(|(_, list)| self.bake_variants(list))
            .collect();
        BlockStateModel::Multipart(selectors)
    }

    /// Bake a block-state root. Equal roots share one baked model.
    pub fn bake_root(&self, root: &UnbakedRoot) -> Arc<BlockStateModel> {
        self.roots.get_or_compute(root.clone(), || match root {
            UnbakedRoot::Variants(list) => self.bake_variants(list),
            UnbakedRoot::Multipart { multipart, matched } => {
                Arc::new(self.bake_multipart(multipart, matched))
            }
        })
    }

    /// Bake one model with its display transforms, unrotated.
    pub fn bake_item_model(&self, location: &ResourceLocation) -> BakedItemModel {
        let resolved = self.resolver.resolve(location);
        let part = self.bake_part(location, ModelState::identity());
        BakedItemModel {
            location: location.clone(),
            quads: Arc::clone(&part.quads),
            ambient_occlusion: part.ambient_occlusion,
            gui_light: resolved.gui_light,
            particle: Arc::clone(&part.particle),
            transforms: resolved.display.clone(),
            is_missing: resolved.is_missing,
        }
    }

    /// Number of distinct parts baked so far.
    pub fn baked_part_count(&self) -> usize {
        self.parts.len()
    }
}

impl std::fmt::Debug for ModelBaker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBaker")
            .field("parts", &self.parts.len())
            .field("roots", &self.roots.len())
            .field("sprites", &self.sprites)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{Sprite, SpriteAtlas};
    use crate::baker::instantiate_roots;
    use crate::resolver::{BlockState, Property, StateDefinition};
    use crate::resource_pack::{BlockModel, BlockModelDefinition, TextureData};
    use crate::types::{Direction, Quadrant};

    fn create_test_pack() -> ResourcePack {
        let mut pack = ResourcePack::new();
        let model = |json: &str| -> BlockModel { serde_json::from_str(json).unwrap() };
        pack.add_model(
            ResourceLocation::minecraft("block/cube_all"),
            model(
                r##"{
                    "textures": { "particle": "#all" },
                    "elements": [{ "from": [0, 0, 0], "to": [16, 16, 16], "faces": {
                        "down":  { "texture": "#all", "cullface": "down" },
                        "up":    { "texture": "#all", "cullface": "up" },
                        "north": { "texture": "#all", "cullface": "north" },
                        "south": { "texture": "#all", "cullface": "south" },
                        "west":  { "texture": "#all", "cullface": "west" },
                        "east":  { "texture": "#all", "cullface": "east" } } }]
                }"##,
            ),
        );
        pack.add_model(
            ResourceLocation::minecraft("block/stone"),
            model(r#"{ "parent": "block/cube_all", "textures": { "all": "block/stone" } }"#),
        );
        pack.add_model(
            ResourceLocation::minecraft("item/generated"),
            model(r#"{ "parent": "builtin/generated", "gui_light": "front" }"#),
        );
        pack.add_model(
            ResourceLocation::minecraft("item/stick"),
            model(
                r#"{ "parent": "item/generated", "textures": { "layer0": "item/stick" },
                     "display": { "ground": { "scale": [0.5, 0.5, 0.5] } } }"#,
            ),
        );
        pack
    }

    fn sprites() -> Arc<dyn SpriteLookup> {
        let mut atlas = SpriteAtlas::new();
        atlas.insert(Sprite::standalone(
            ResourceLocation::minecraft("block/stone"),
            TextureData::new(16, 16, vec![255; 16 * 16 * 4]),
        ));
        atlas.insert(Sprite::standalone(
            ResourceLocation::minecraft("item/stick"),
            TextureData::new(1, 1, vec![255; 4]),
        ));
        Arc::new(atlas)
    }

    fn stone() -> Variant {
        Variant::new(ResourceLocation::minecraft("block/stone"))
    }

    #[test]
    fn test_same_root_bakes_once() {
        let pack = create_test_pack();
        let baker = ModelBaker::new(&pack, sprites());
        let root = UnbakedRoot::Variants(VariantList::new(vec![stone()]));

        let first = baker.bake_root(&root);
        let second = baker.bake_root(&root.clone());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(baker.baked_part_count(), 1);

        let parts = first.collect_parts(0);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].quads.len(), 6);
        assert_eq!(parts[0].particle.name(), &ResourceLocation::minecraft("block/stone"));
    }

    #[test]
    fn test_concurrent_roots_share_parts() {
        let pack = create_test_pack();
        let baker = ModelBaker::new(&pack, sprites());
        let mut rotated = stone();
        rotated.y = Quadrant::R90;
        let roots = [
            UnbakedRoot::Variants(VariantList::new(vec![stone()])),
            UnbakedRoot::Variants(VariantList::new(vec![stone(), rotated.clone()])),
            UnbakedRoot::Variants(VariantList::new(vec![rotated])),
        ];

        let baked: Vec<Arc<BlockStateModel>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..6)
                .map(|i| {
                    let baker = &baker;
                    let root = &roots[i % 3];
                    scope.spawn(move || baker.bake_root(root))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(Arc::ptr_eq(&baked[0], &baked[3]));
        assert!(Arc::ptr_eq(&baked[1], &baked[4]));
        // Two orientations of one model.
        assert_eq!(baker.baked_part_count(), 2);
        let weighted = baked[1].all_parts();
        assert!(Arc::ptr_eq(&weighted[0], &baked[0].all_parts()[0]));
        assert!(Arc::ptr_eq(&weighted[1], &baked[2].all_parts()[0]));
    }

    #[test]
    fn test_concurrent_multipart_roots_share_models() {
        let pack = create_test_pack();
        let baker = ModelBaker::new(&pack, sprites());
        let definition = StateDefinition::new(
            ResourceLocation::minecraft("stone_wall"),
            vec![
                Property::boolean("north"),
                Property::boolean("east"),
                Property::boolean("waterlogged"),
            ],
        );
        let blockstate: BlockModelDefinition = serde_json::from_str(
            r#"{ "multipart": [
                    { "apply": { "model": "block/stone" } },
                    { "when": { "north": "true" }, "apply": { "model": "block/stone", "y": 90 } },
                    { "when": { "east": "true" }, "apply": { "model": "block/stone", "y": 90 } } ] }"#,
        )
        .unwrap();

        // Each thread instantiates its own roots, so only structural equality links them.
        let baked: Vec<Vec<(BlockState, Arc<BlockStateModel>)>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let (baker, definition, blockstate) = (&baker, &definition, &blockstate);
                    scope.spawn(move || {
                        instantiate_roots(definition, blockstate)
                            .unwrap()
                            .into_iter()
                            .map(|(state, root)| (state, baker.bake_root(&root.unwrap())))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(baked[0].len(), 8);
        for other in &baked[1..] {
            for ((state, model), (other_state, other_model)) in baked[0].iter().zip(other) {
                assert_eq!(state, other_state);
                assert!(Arc::ptr_eq(model, other_model), "{}", state);
            }
        }

        let model_for = |north: &str, east: &str, waterlogged: &str| {
            baked[0]
                .iter()
                .find(|(state, _)| {
                    state.get("north") == Some(north)
                        && state.get("east") == Some(east)
                        && state.get("waterlogged") == Some(waterlogged)
                })
                .map(|(_, model)| Arc::clone(model))
                .unwrap()
        };
        // No selector reads waterlogged, so both values match the same selectors.
        assert!(Arc::ptr_eq(
            &model_for("true", "false", "true"),
            &model_for("true", "false", "false")
        ));
        assert!(!Arc::ptr_eq(
            &model_for("true", "false", "false"),
            &model_for("false", "true", "false")
        ));

        let selectors = |model: Arc<BlockStateModel>| match &*model {
            BlockStateModel::Multipart(selectors) => selectors.clone(),
            other => panic!("expected a multipart model, got {:?}", other),
        };
        let both = selectors(model_for("true", "true", "false"));
        let east = selectors(model_for("false", "true", "false"));
        assert_eq!(both.len(), 3);
        assert_eq!(east.len(), 2);
        // Both side selectors apply one variant list, baked once.
        assert!(Arc::ptr_eq(&both[1], &both[2]));
        assert!(Arc::ptr_eq(&both[2], &east[1]));
        assert!(Arc::ptr_eq(&both[0], &east[0]));
        // Stone upright and stone turned 90 degrees.
        assert_eq!(baker.baked_part_count(), 2);
    }

    #[test]
    fn test_missing_model_bakes_placeholder_cube() {
        let pack = create_test_pack();
        let lookup = sprites();
        let baker = ModelBaker::new(&pack, Arc::clone(&lookup));
        let missing = baker.missing();
        let parts = missing.collect_parts(0);
        assert_eq!(parts[0].quads.len(), 6);
        for dir in Direction::ALL {
            let quads = parts[0].quads.quads(Some(dir));
            assert_eq!(quads.len(), 1);
            assert_eq!(quads[0].sprite, lookup.missing());
        }
        assert!(Arc::ptr_eq(&missing, &baker.missing()));
    }

    #[test]
    fn test_bake_item_model() {
        let pack = create_test_pack();
        let baker = ModelBaker::new(&pack, sprites());
        let stick = baker.bake_item_model(&ResourceLocation::minecraft("item/stick"));
        assert!(!stick.is_missing);
        assert_eq!(stick.gui_light, GuiLight::Front);
        // One opaque pixel: front, back and four sides.
        assert_eq!(stick.quads.len(), 6);
        assert_eq!(stick.transforms[&DisplayContext::Ground].scale, [0.5, 0.5, 0.5]);

        let unknown = baker.bake_item_model(&ResourceLocation::minecraft("item/unknown"));
        assert!(unknown.is_missing);
        assert_eq!(unknown.quads.len(), 6);
    }
}
