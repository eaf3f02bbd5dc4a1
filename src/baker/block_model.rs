//! Unbaked block-state roots and their baked models.

use crate::atlas::Sprite;
use crate::resolver::{BlockState, StatePredicate};
use crate::resource_pack::VariantList;
use crate::types::{BakedQuad, Direction, QuadCollection, ResourceLocation};
use std::collections::BTreeSet;
use std::sync::Arc;

/// One baked variant: geometry for a model under one orientation.
#[derive(Debug)]
pub struct BlockModelPart {
    pub quads: Arc<QuadCollection>,
    pub ambient_occlusion: bool,
    pub particle: Arc<Sprite>,
}

impl BlockModelPart {
    /// Names of every sprite this part draws with, plus its particle.
    pub fn sprites(&self) -> BTreeSet<(ResourceLocation, ResourceLocation)> {
        self.quads
            .all()
            .map(|quad| &quad.sprite)
            .chain(std::iter::once(&self.particle))
            .map(|sprite| (sprite.atlas().clone(), sprite.name().clone()))
            .collect()
    }
}

/// A baked model for a block state.
#[derive(Debug)]
pub enum BlockStateModel {
    Single(Arc<BlockModelPart>),
    /// Parts with their weights; the total is always positive.
    Weighted(Vec<(u32, Arc<BlockModelPart>)>),
    /// The matched selectors of a multipart definition, in declaration order.
    Multipart(Vec<Arc<BlockStateModel>>),
}

impl BlockStateModel {
    /// Parts drawn for a position seed. Weighted picks are deterministic in `seed`.
    pub fn collect_parts(&self, seed: u64) -> Vec<Arc<BlockModelPart>> {
        let mut parts = Vec::new();
        self.collect_into(seed, &mut parts);
        parts
    }

    fn collect_into(&self, seed: u64, parts: &mut Vec<Arc<BlockModelPart>>) {
        match self {
            BlockStateModel::Single(part) => parts.push(Arc::clone(part)),
            BlockStateModel::Weighted(entries) => {
                if let Some(part) = pick_weighted(entries, seed) {
                    parts.push(Arc::clone(part));
                }
            }
            BlockStateModel::Multipart(selectors) => {
                for model in selectors {
                    model.collect_into(seed, parts);
                }
            }
        }
    }

    /// Quads for a cull direction (`None` = unculled) across all drawn parts.
    pub fn quads(&self, direction: Option<Direction>, seed: u64) -> Vec<BakedQuad> {
        self.collect_parts(seed)
            .iter()
            .flat_map(|part| part.quads.quads(direction).iter().cloned())
            .collect()
    }

    /// Particle sprite of the first part, if there is one.
    pub fn particle_icon(&self) -> Option<Arc<Sprite>> {
        match self {
            BlockStateModel::Single(part) => Some(Arc::clone(&part.particle)),
            BlockStateModel::Weighted(entries) => {
                entries.first().map(|(_, part)| Arc::clone(&part.particle))
            }
            BlockStateModel::Multipart(selectors) => {
                selectors.iter().find_map(|model| model.particle_icon())
            }
        }
    }

    /// Every part this model may draw, for any seed.
    pub fn all_parts(&self) -> Vec<Arc<BlockModelPart>> {
        match self {
            BlockStateModel::Single(part) => vec![Arc::clone(part)],
            BlockStateModel::Weighted(entries) => {
                entries.iter().map(|(_, part)| Arc::clone(part)).collect()
            }
            BlockStateModel::Multipart(selectors) => {
                selectors.iter().flat_map(|model| model.all_parts()).collect()
            }
        }
    }
}

fn pick_weighted(entries: &[(u32, Arc<BlockModelPart>)], seed: u64) -> Option<&Arc<BlockModelPart>> {
    let total: u64 = entries.iter().map(|(weight, _)| *weight as u64).sum();
    if total == 0 {
        return None;
    }
    let mut remaining = seed % total;
    for (weight, part) in entries {
        let weight = *weight as u64;
        if remaining < weight {
            return Some(part);
        }
        remaining -= weight;
    }
    None
}

/// The multipart section of one block's definition, with validated conditions.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct UnbakedMultipart {
    pub block: ResourceLocation,
    pub selectors: Vec<(StatePredicate, VariantList)>,
}

impl UnbakedMultipart {
    /// Indices of the selectors that apply to `state`.
    pub fn matching(&self, state: &BlockState) -> Vec<usize> {
        self.selectors
            .iter()
            .enumerate()
            .filter(|(_, (predicate, _))| predicate.test(state))
            .map(|(i, _)| i)
            .collect()
    }
}

/// What a block state bakes from.
///
/// Structurally equal roots bake to the same shared model within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnbakedRoot {
    Variants(VariantList),
    Multipart {
        multipart: Arc<UnbakedMultipart>,
        matched: Vec<usize>,
    },
}

/// States in the same group render identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisualGroup {
    Variants(VariantList),
    Multipart {
        block: ResourceLocation,
        matched: Vec<usize>,
    },
    Missing,
}

impl UnbakedRoot {
    pub fn visual_group(&self) -> VisualGroup {
        match self {
            UnbakedRoot::Variants(list) => VisualGroup::Variants(list.clone()),
            UnbakedRoot::Multipart { multipart, matched } => VisualGroup::Multipart {
                block: multipart.block.clone(),
                matched: matched.clone(),
            },
        }
    }
}
