//! Selection of per-state roots and the parallel bake of a whole pack.

use super::block_model::{BlockStateModel, UnbakedMultipart, UnbakedRoot, VisualGroup};
use super::session::ModelBaker;
use super::BakeConfig;
use crate::atlas::SpriteLookup;
use crate::error::{BakeError, Result};
use crate::resolver::{BlockState, StateDefinition, StatePredicate};
use crate::resource_pack::{BlockModelDefinition, ResourcePack};
use crate::types::ResourceLocation;
use crossbeam::channel::unbounded;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Map every state of a block to the root it bakes from.
///
/// Variant keys that name unknown properties or values are skipped. Two
/// different keys matching one state is an error for the whole block, as is
/// any invalid multipart condition. States that no variant key matches fall
/// through to the multipart section if there is one, and get `None` otherwise.
pub fn instantiate_roots(
    definition: &StateDefinition,
    blockstate: &BlockModelDefinition,
) -> Result<Vec<(BlockState, Option<UnbakedRoot>)>> {
    let states = definition.possible_states();
    let mut assigned: Vec<Option<(&str, UnbakedRoot)>> = vec![None; states.len()];

    if let Some(variants) = &blockstate.variants {
        for (key, list) in variants {
            let predicate = match StatePredicate::from_variant_key(definition, key) {
                Ok(predicate) => predicate,
                Err(e) => {
                    log::warn!(
                        "Skipping variant '{}' of {}: {}",
                        key,
                        definition.owner(),
                        e
                    );
                    continue;
                }
            };
            for (state, slot) in states.iter().zip(assigned.iter_mut()) {
                if !predicate.test(state) {
                    continue;
                }
                if let Some((previous, _)) = slot {
                    return Err(BakeError::OverlappingDefinition(format!(
                        "{} matched by '{}' and '{}'",
                        state, previous, key
                    )));
                }
                *slot = Some((key.as_str(), UnbakedRoot::Variants(list.clone())));
            }
        }
    }

    if let Some(selectors) = &blockstate.multipart {
        let selectors = selectors
            .iter()
            .map(|selector| {
                let predicate = match &selector.when {
                    Some(condition) => condition.instantiate(definition)?,
                    None => StatePredicate::Always,
                };
                Ok((predicate, selector.apply.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let multipart = Arc::new(UnbakedMultipart {
            block: definition.owner().clone(),
            selectors,
        });
        for (state, slot) in states.iter().zip(assigned.iter_mut()) {
            if slot.is_none() {
                let root = UnbakedRoot::Multipart {
                    multipart: Arc::clone(&multipart),
                    matched: multipart.matching(state),
                };
                *slot = Some(("", root));
            }
        }
    }

    Ok(states
        .into_iter()
        .zip(assigned)
        .map(|(state, slot)| (state, slot.map(|(_, root)| root)))
        .collect())
}

/// Every baked block state of a pack.
#[derive(Debug)]
pub struct BakingResult {
    pub models: HashMap<BlockState, Arc<BlockStateModel>>,
    pub visual_groups: HashMap<BlockState, VisualGroup>,
    pub missing: Arc<BlockStateModel>,
    /// Blocks whose definition failed and that use the missing model.
    pub failed_blocks: Vec<ResourceLocation>,
    /// Number of distinct roots replaced for using sprites off the block atlas.
    pub rejected_roots: usize,
    /// Number of distinct roots baked.
    pub baked_roots: usize,
}

impl BakingResult {
    pub fn get(&self, state: &BlockState) -> Option<&Arc<BlockStateModel>> {
        self.models.get(state)
    }

    /// Whether two states are known to render identically.
    pub fn same_visual_group(&self, a: &BlockState, b: &BlockState) -> bool {
        match (self.visual_groups.get(a), self.visual_groups.get(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

enum Assignment {
    Root(UnbakedRoot),
    Missing,
}

/// Sprites of `model` that are not on `atlas`.
fn foreign_sprites(model: &BlockStateModel, atlas: &ResourceLocation) -> BTreeSet<String> {
    model
        .all_parts()
        .iter()
        .flat_map(|part| part.sprites())
        .filter(|(sprite_atlas, _)| sprite_atlas != atlas)
        .map(|(sprite_atlas, name)| format!("{} ({})", name, sprite_atlas))
        .collect()
}

/// Bake every state of every blockstate in `pack` on a worker pool.
///
/// Blocks without an entry in `definitions` get properties inferred from
/// their blockstate file.
pub fn bake_blocks(
    pack: &ResourcePack,
    sprites: Arc<dyn SpriteLookup>,
    definitions: &HashMap<ResourceLocation, StateDefinition>,
    config: &BakeConfig,
) -> BakingResult {
    let start = Instant::now();
    let baker = ModelBaker::new(pack, sprites);
    let missing = baker.missing();

    let mut blocks: Vec<_> = pack.blockstates().collect();
    blocks.sort_by(|a, b| a.0.cmp(b.0));

    let mut assignments: Vec<(BlockState, Assignment)> = Vec::new();
    let mut failed_blocks = Vec::new();
    for (block, blockstate) in blocks {
        let definition = match definitions.get(block) {
            Some(definition) => definition.clone(),
            None => StateDefinition::infer(block.clone(), blockstate),
        };
        match instantiate_roots(&definition, blockstate) {
            Ok(roots) => assignments.extend(
                roots
                    .into_iter()
                    .filter_map(|(state, root)| root.map(|root| (state, Assignment::Root(root)))),
            ),
            Err(e) => {
                log::error!("Failed to load blockstate definition for {}: {}", block, e);
                failed_blocks.push(block.clone());
                assignments.extend(
                    definition
                        .possible_states()
                        .into_iter()
                        .map(|state| (state, Assignment::Missing)),
                );
            }
        }
    }

    let mut unique = HashSet::new();
    let roots: Vec<UnbakedRoot> = assignments
        .iter()
        .filter_map(|(_, assignment)| match assignment {
            Assignment::Root(root) if unique.insert(root) => Some(root.clone()),
            _ => None,
        })
        .collect();

    let baked = bake_parallel(&baker, roots, config);
    let baked_roots = baked.len();
    let mut rejected_roots = 0;
    let mut accepted: HashMap<UnbakedRoot, Arc<BlockStateModel>> = HashMap::new();
    for (root, model) in baked {
        if config.reject_foreign_sprites {
            let foreign = foreign_sprites(&model, &config.block_atlas);
            if !foreign.is_empty() {
                let names: Vec<String> = foreign.into_iter().collect();
                log::error!(
                    "{}",
                    BakeError::ForeignAtlas(format!(
                        "{:?} uses sprites outside {}: {}",
                        root.visual_group(),
                        config.block_atlas,
                        names.join(", ")
                    ))
                );
                rejected_roots += 1;
                continue;
            }
        }
        accepted.insert(root, model);
    }

    let mut models = HashMap::with_capacity(assignments.len());
    let mut visual_groups = HashMap::with_capacity(assignments.len());
    for (state, assignment) in assignments {
        let (model, group) = match assignment {
            Assignment::Root(root) => match accepted.get(&root) {
                Some(model) => (Arc::clone(model), root.visual_group()),
                None => (Arc::clone(&missing), VisualGroup::Missing),
            },
            Assignment::Missing => (Arc::clone(&missing), VisualGroup::Missing),
        };
        models.insert(state.clone(), model);
        visual_groups.insert(state, group);
    }

    log::debug!(
        "Baked {} states from {} roots ({} parts) in {:?}",
        models.len(),
        baked_roots,
        baker.baked_part_count(),
        start.elapsed()
    );

    BakingResult {
        models,
        visual_groups,
        missing,
        failed_blocks,
        rejected_roots,
        baked_roots,
    }
}

fn bake_parallel(
    baker: &ModelBaker<'_>,
    roots: Vec<UnbakedRoot>,
    config: &BakeConfig,
) -> Vec<(UnbakedRoot, Arc<BlockStateModel>)> {
    let (job_tx, job_rx) = unbounded::<UnbakedRoot>();
    let (result_tx, result_rx) = unbounded();
    let total = roots.len();
    for root in roots {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send(root);
    }
    drop(job_tx);

    let workers = config.workers.clamp(1, total.max(1));
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for root in job_rx.iter() {
                    let model = baker.bake_root(&root);
                    if result_tx.send((root, model)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let results: Vec<_> = result_rx.iter().collect();
    debug_assert_eq!(results.len(), total);
    results
}
