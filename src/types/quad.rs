//! Baked quads and their per-direction collections.

use super::Direction;
use crate::atlas::Sprite;
use glam::Vec3;
use std::sync::Arc;

/// Pack a UV pair into one word: U bits high, V bits low.
pub fn pack_uv(u: f32, v: f32) -> u64 {
    ((u.to_bits() as u64) << 32) | v.to_bits() as u64
}

pub fn unpack_u(packed: u64) -> f32 {
    f32::from_bits((packed >> 32) as u32)
}

pub fn unpack_v(packed: u64) -> f32 {
    f32::from_bits(packed as u32)
}

/// An immutable, renderer-ready quad.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedQuad {
    /// Block-space positions (0-1 for a full block).
    pub positions: [Vec3; 4],
    /// Atlas UVs, see [`pack_uv`].
    pub packed_uvs: [u64; 4],
    /// Tint index (-1 = untinted).
    pub tint_index: i32,
    /// Facing after all transforms, recomputed from the geometry.
    pub direction: Direction,
    pub sprite: Arc<Sprite>,
    pub shade: bool,
    pub light_emission: u8,
}

impl BakedQuad {
    pub fn is_tinted(&self) -> bool {
        self.tint_index >= 0
    }

    /// Atlas UV of vertex `i`.
    pub fn uv(&self, i: usize) -> [f32; 2] {
        let packed = self.packed_uvs[i];
        [unpack_u(packed), unpack_v(packed)]
    }
}

/// Quads split into always-drawn and cull-direction buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadCollection {
    unculled: Vec<BakedQuad>,
    culled: [Vec<BakedQuad>; 6],
}

impl QuadCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> QuadCollectionBuilder {
        QuadCollectionBuilder::default()
    }

    /// Quads for a cull direction, or the unculled quads for `None`.
    pub fn quads(&self, direction: Option<Direction>) -> &[BakedQuad] {
        match direction {
            Some(dir) => &self.culled[dir.index()],
            None => &self.unculled,
        }
    }

    /// Every quad, unculled first.
    pub fn all(&self) -> impl Iterator<Item = &BakedQuad> {
        self.unculled.iter().chain(self.culled.iter().flatten())
    }

    pub fn len(&self) -> usize {
        self.unculled.len() + self.culled.iter().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accumulates quads for a [`QuadCollection`].
#[derive(Debug, Default)]
pub struct QuadCollectionBuilder {
    collection: QuadCollection,
}

impl QuadCollectionBuilder {
    pub fn add_unculled(&mut self, quad: BakedQuad) -> &mut Self {
        self.collection.unculled.push(quad);
        self
    }

    pub fn add_culled(&mut self, direction: Direction, quad: BakedQuad) -> &mut Self {
        self.collection.culled[direction.index()].push(quad);
        self
    }

    pub fn build(self) -> QuadCollection {
        self.collection
    }
}
