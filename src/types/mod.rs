//! Shared types used throughout the library.

mod direction;
mod location;
mod quad;
mod transform;

pub use direction::{Axis, Direction, Quadrant};
pub use location::{ResourceLocation, DEFAULT_NAMESPACE};
pub use quad::{pack_uv, unpack_u, unpack_v, BakedQuad, QuadCollection, QuadCollectionBuilder};
pub use transform::{ElementRotation, ModelState, RotationValue};
