//! Model inheritance resolution.

use super::texture_slots::{ResolvedTextures, TextureSlotResolver, TextureSlots};
use crate::atlas::MISSING_TEXTURE;
use crate::baker::cache::SingleFlight;
use crate::error::BakeError;
use crate::resource_pack::{
    BlockModel, DisplayContext, GuiLight, ItemTransform, ModelElement, ModelFace, ResourcePack,
};
use crate::types::{Direction, ResourceLocation};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Parent that makes a model an item billboard generated from its layers.
pub fn generated_location() -> ResourceLocation {
    ResourceLocation::minecraft("builtin/generated")
}

/// Location of the built-in missing model.
pub fn missing_location() -> ResourceLocation {
    ResourceLocation::minecraft("builtin/missing")
}

/// The placeholder cube used when a model cannot be loaded.
pub fn missing_model() -> BlockModel {
    let faces: BTreeMap<Direction, ModelFace> = Direction::ALL
        .iter()
        .map(|&dir| (dir, ModelFace::new("#missing").with_cullface(dir)))
        .collect();
    BlockModel {
        textures: TextureSlots::new()
            .with("missing", MISSING_TEXTURE)
            .with("particle", MISSING_TEXTURE),
        elements: Some(vec![ModelElement {
            from: [0.0, 0.0, 0.0],
            to: [16.0, 16.0, 16.0],
            rotation: None,
            shade: true,
            light_emission: 0,
            faces,
        }]),
        ..Default::default()
    }
}

/// Where a resolved model's quads come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Cuboid elements from the nearest model in the chain that declares them.
    Elements(Vec<ModelElement>),
    /// Generated from `layer0..layer4` sprites.
    Generated,
}

/// A model with every inherited property flattened.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub location: ResourceLocation,
    pub geometry: Geometry,
    pub textures: ResolvedTextures,
    pub ambient_occlusion: bool,
    pub gui_light: GuiLight,
    pub display: HashMap<DisplayContext, ItemTransform>,
    /// True when the model itself could not be loaded.
    pub is_missing: bool,
}

impl ResolvedModel {
    pub fn elements(&self) -> &[ModelElement] {
        match &self.geometry {
            Geometry::Elements(elements) => elements,
            Geometry::Generated => &[],
        }
    }

    pub fn transform(&self, context: DisplayContext) -> ItemTransform {
        self.display.get(&context).copied().unwrap_or_default()
    }
}

/// Resolves model inheritance chains. Results are shared per location.
pub struct ModelResolver<'a> {
    pack: &'a ResourcePack,
    missing: BlockModel,
    cache: SingleFlight<ResourceLocation, Arc<ResolvedModel>>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(pack: &'a ResourcePack) -> Self {
        Self {
            pack,
            missing: missing_model(),
            cache: SingleFlight::new(),
        }
    }

    /// Resolve a model with all inherited properties.
    ///
    /// A model that does not exist resolves to the missing model. A missing
    /// parent or a parent cycle is replaced by the missing model as parent.
    pub fn resolve(&self, location: &ResourceLocation) -> Arc<ResolvedModel> {
        self.cache.get_or_compute(location.clone(), || {
            Arc::new(self.resolve_uncached(location))
        })
    }

    /// The missing model, resolved.
    pub fn missing(&self) -> Arc<ResolvedModel> {
        self.resolve(&missing_location())
    }

    fn resolve_uncached(&self, location: &ResourceLocation) -> ResolvedModel {
        let mut chain: Vec<&BlockModel> = Vec::new();
        let mut seen = HashSet::new();
        let mut generated = false;
        let mut is_missing = *location == missing_location();
        let mut current = location.clone();

        loop {
            if current == generated_location() {
                generated = true;
                break;
            }
            if !seen.insert(current.clone()) {
                log::warn!(
                    "{}",
                    BakeError::ParentCycle(format!("{} -> {}", location, current))
                );
                chain.push(&self.missing);
                break;
            }
            let model = if current == missing_location() {
                Some(&self.missing)
            } else {
                self.pack.get_model(&current)
            };
            let Some(model) = model else {
                if chain.is_empty() {
                    log::warn!("{}", BakeError::ModelNotFound(current.to_string()));
                    is_missing = true;
                } else {
                    log::warn!("Unable to resolve parent {} of {}", current, location);
                }
                chain.push(&self.missing);
                break;
            };
            chain.push(model);
            match &model.parent {
                Some(parent) => current = parent.clone(),
                None => break,
            }
        }

        let mut slots = TextureSlotResolver::new();
        for model in &chain {
            slots.add_last(model.textures.clone());
        }

        let geometry = match chain.iter().find_map(|m| m.elements.as_ref()) {
            Some(elements) => Geometry::Elements(elements.clone()),
            None if generated => Geometry::Generated,
            None => Geometry::Elements(Vec::new()),
        };

        let mut display = HashMap::new();
        for context in DisplayContext::ALL {
            if let Some(transform) = chain.iter().find_map(|m| m.display.get(&context)) {
                display.insert(context, *transform);
            }
        }

        ResolvedModel {
            location: location.clone(),
            geometry,
            textures: slots.resolve(location),
            ambient_occlusion: chain
                .iter()
                .find_map(|m| m.ambient_occlusion)
                .unwrap_or(true),
            gui_light: chain.iter().find_map(|m| m.gui_light).unwrap_or_default(),
            display,
            is_missing,
        }
    }
}
