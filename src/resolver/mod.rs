//! Block state and model resolution.
//!
//! This module handles texture slot resolution, model inheritance chains,
//! and the block state predicates used by blockstate definitions.

pub mod model_resolver;
pub mod state;
pub mod texture_slots;

pub use model_resolver::{
    generated_location, missing_location, missing_model, Geometry, ModelResolver, ResolvedModel,
};
pub use state::{BlockState, Property, StateDefinition, StatePredicate};
pub use texture_slots::{ResolvedTextures, SlotContents, TextureSlotResolver, TextureSlots};
