//! Flat item geometry generated from layered sprites.
//!
//! Each `layerN` texture becomes a one-pixel-deep sheet: a front and back
//! face, plus thin side faces wherever an opaque pixel borders a transparent
//! one or the sprite edge.

use crate::atlas::{Sprite, SpriteGetter};
use crate::resolver::ResolvedTextures;
use crate::resource_pack::{ModelElement, ModelFace};
use crate::types::{Direction, ResourceLocation};
use std::collections::{BTreeMap, BTreeSet};

/// Texture slots read by the generator, in order.
pub const LAYERS: [&str; 5] = ["layer0", "layer1", "layer2", "layer3", "layer4"];

const MIN_Z: f32 = 7.5;
const MAX_Z: f32 = 8.5;
/// UV shrink on side faces, as a fraction of a sprite pixel.
const SIDE_UV_INSET: f32 = 0.1;

/// Side of a sprite pixel, in image space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeSide {
    Up,
    Down,
    Left,
    Right,
}

impl EdgeSide {
    const ALL: [EdgeSide; 4] = [EdgeSide::Up, EdgeSide::Down, EdgeSide::Left, EdgeSide::Right];

    fn offset(self) -> (i32, i32) {
        match self {
            EdgeSide::Up => (0, -1),
            EdgeSide::Down => (0, 1),
            EdgeSide::Left => (-1, 0),
            EdgeSide::Right => (1, 0),
        }
    }

    /// Model direction the side face points to.
    pub fn direction(self) -> Direction {
        match self {
            EdgeSide::Up => Direction::Up,
            EdgeSide::Down => Direction::Down,
            EdgeSide::Left => Direction::West,
            EdgeSide::Right => Direction::East,
        }
    }
}

/// An opaque pixel side that borders transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeFace {
    pub side: EdgeSide,
    pub x: i32,
    pub y: i32,
}

/// Edge faces of `sprite` across the given frames.
pub fn collect_edges(sprite: &Sprite, frames: impl IntoIterator<Item = u32>) -> BTreeSet<EdgeFace> {
    let (width, height) = (sprite.width() as i32, sprite.height() as i32);
    let mut edges = BTreeSet::new();
    for frame in frames {
        for y in 0..height {
            for x in 0..width {
                if sprite.is_transparent(frame, x, y) {
                    continue;
                }
                for side in EdgeSide::ALL {
                    let (dx, dy) = side.offset();
                    if sprite.is_transparent(frame, x + dx, y + dy) {
                        edges.insert(EdgeFace { side, x, y });
                    }
                }
            }
        }
    }
    edges
}

/// Build the elements of a generated item model.
///
/// Stops at the first `layerN` slot that is not bound.
pub fn generate_elements(
    textures: &ResolvedTextures,
    sprites: &SpriteGetter,
    model: &ResourceLocation,
) -> Vec<ModelElement> {
    let mut elements = Vec::new();
    for (index, layer) in LAYERS.iter().enumerate() {
        if !textures.contains(layer) {
            break;
        }
        let texture = format!("#{}", layer);
        let tint = index as i32;
        let sprite = sprites.get_slot(textures, layer, model);

        elements.push(sheet_element(&texture, tint));
        let edges = collect_edges(&sprite, sprite.unique_frames());
        elements.extend(
            edges
                .iter()
                .map(|edge| side_element(edge, &sprite, &texture, tint)),
        );
    }
    elements
}

fn face(texture: &str, uv: [f32; 4], tint: i32) -> ModelFace {
    ModelFace {
        tintindex: tint,
        ..ModelFace::new(texture).with_uv(uv)
    }
}

fn element(from: [f32; 3], to: [f32; 3], faces: BTreeMap<Direction, ModelFace>) -> ModelElement {
    ModelElement {
        from,
        to,
        rotation: None,
        shade: true,
        light_emission: 0,
        faces,
    }
}

/// Front and back of one layer; the back reads the texture mirrored.
fn sheet_element(texture: &str, tint: i32) -> ModelElement {
    let faces = BTreeMap::from([
        (Direction::South, face(texture, [0.0, 0.0, 16.0, 16.0], tint)),
        (Direction::North, face(texture, [16.0, 0.0, 0.0, 16.0], tint)),
    ]);
    element([0.0, 0.0, MIN_Z], [16.0, 16.0, MAX_Z], faces)
}

/// A zero-thickness element covering one pixel side.
fn side_element(edge: &EdgeFace, sprite: &Sprite, texture: &str, tint: i32) -> ModelElement {
    let x_scale = 16.0 / sprite.width() as f32;
    let y_scale = 16.0 / sprite.height() as f32;

    let left = edge.x as f32 * x_scale;
    let right = (edge.x + 1) as f32 * x_scale;
    // Image rows grow downwards, model y grows upwards.
    let top = 16.0 - edge.y as f32 * y_scale;
    let bottom = 16.0 - (edge.y + 1) as f32 * y_scale;

    let (from, to) = match edge.side {
        EdgeSide::Up => ([left, top, MIN_Z], [right, top, MAX_Z]),
        EdgeSide::Down => ([left, bottom, MIN_Z], [right, bottom, MAX_Z]),
        EdgeSide::Left => ([left, bottom, MIN_Z], [left, top, MAX_Z]),
        EdgeSide::Right => ([right, bottom, MIN_Z], [right, top, MAX_Z]),
    };

    let inset_u = SIDE_UV_INSET * x_scale;
    let inset_v = SIDE_UV_INSET * y_scale;
    let uv = [
        left + inset_u,
        edge.y as f32 * y_scale + inset_v,
        right - inset_u,
        (edge.y + 1) as f32 * y_scale - inset_v,
    ];

    let faces = BTreeMap::from([(edge.side.direction(), face(texture, uv, tint))]);
    element(from, to, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SpriteAtlas;
    use crate::baker::geometry::bake_elements;
    use crate::resolver::{TextureSlotResolver, TextureSlots};
    use crate::resource_pack::texture::parse_mcmeta;
    use crate::resource_pack::TextureData;
    use crate::types::ModelState;
    use std::sync::Arc;

    /// RGBA image from a row-major alpha map.
    fn texture(width: u32, height: u32, alpha: &[u8]) -> TextureData {
        let pixels = alpha.iter().flat_map(|&a| [200, 100, 50, a]).collect();
        TextureData::new(width, height, pixels)
    }

    fn sprite(name: &str, texture: TextureData) -> Sprite {
        Sprite::standalone(ResourceLocation::minecraft(name), texture)
    }

    fn getter(sprites: Vec<Sprite>) -> SpriteGetter {
        let mut atlas = SpriteAtlas::new();
        for sprite in sprites {
            atlas.insert(sprite);
        }
        SpriteGetter::new(Arc::new(atlas))
    }

    fn layers(names: &[&str]) -> ResolvedTextures {
        let mut slots = TextureSlots::new();
        for (i, name) in names.iter().enumerate() {
            slots = slots.with(LAYERS[i], name);
        }
        let mut resolver = TextureSlotResolver::new();
        resolver.add_last(slots);
        resolver.resolve(&"item/test")
    }

    #[test]
    fn test_opaque_sprite_edges() {
        let solid = sprite("item/solid", texture(2, 2, &[255; 4]));
        let edges = collect_edges(&solid, solid.unique_frames());
        // Every pixel borders two sprite sides.
        assert_eq!(edges.len(), 8);
        assert!(edges.contains(&EdgeFace { side: EdgeSide::Up, x: 0, y: 0 }));
        assert!(edges.contains(&EdgeFace { side: EdgeSide::Right, x: 1, y: 1 }));
        assert!(!edges.contains(&EdgeFace { side: EdgeSide::Right, x: 0, y: 0 }));
    }

    #[test]
    fn test_transparent_pixel_adds_inner_edges() {
        // Top-right pixel is transparent.
        let notched = sprite("item/notched", texture(2, 2, &[255, 0, 255, 255]));
        let edges = collect_edges(&notched, notched.unique_frames());
        assert_eq!(edges.len(), 8);
        assert!(edges.contains(&EdgeFace { side: EdgeSide::Right, x: 0, y: 0 }));
        assert!(edges.contains(&EdgeFace { side: EdgeSide::Up, x: 1, y: 1 }));
        assert!(!edges.iter().any(|e| e.x == 1 && e.y == 0));
    }

    #[test]
    fn test_edges_independent_of_frame_order() {
        // Two 2x2 frames stacked vertically with different shapes.
        let mut data = texture(2, 4, &[255, 0, 0, 0, 0, 0, 0, 255]);
        data.apply_mcmeta(parse_mcmeta(r#"{ "animation": { "frames": [1, 0, 1] } }"#).unwrap());
        let animated = sprite("item/animated", data);
        assert_eq!(animated.unique_frames(), vec![0, 1]);

        let forward = collect_edges(&animated, [0, 1]);
        let backward = collect_edges(&animated, [1, 0, 1]);
        assert_eq!(forward, backward);
        // A lone pixel in each frame, four sides each.
        assert_eq!(forward.len(), 8);
    }

    #[test]
    fn test_generated_quads() {
        let sprites = getter(vec![sprite("item/solid", texture(2, 2, &[255; 4]))]);
        let textures = layers(&["item/solid"]);
        let model = ResourceLocation::minecraft("item/test");
        let elements = generate_elements(&textures, &sprites, &model);
        assert_eq!(elements.len(), 9);

        let quads = bake_elements(&elements, &textures, &sprites, &ModelState::identity(), &model);
        // Front, back and eight sides, none culled.
        assert_eq!(quads.quads(None).len(), 10);
        let facing = |dir| quads.all().filter(|q| q.direction == dir).count();
        assert_eq!(facing(Direction::South), 1);
        assert_eq!(facing(Direction::North), 1);
        assert_eq!(facing(Direction::Up), 2);
        assert_eq!(facing(Direction::Down), 2);
        assert_eq!(facing(Direction::West), 2);
        assert_eq!(facing(Direction::East), 2);
        assert!(quads.all().all(|q| q.tint_index == 0));

        let up = quads.all().find(|q| q.direction == Direction::Up).unwrap();
        assert!(up.positions.iter().all(|p| p.y == 1.0));
        assert!(up.positions.iter().all(|p| p.z >= 7.5 / 16.0 && p.z <= 8.5 / 16.0));
    }

    #[test]
    fn test_layers_stop_at_first_gap() {
        let sprites = getter(vec![
            sprite("item/a", texture(1, 1, &[255])),
            sprite("item/b", texture(1, 1, &[255])),
        ]);
        let model = ResourceLocation::minecraft("item/test");

        let two = generate_elements(&layers(&["item/a", "item/b"]), &sprites, &model);
        // Sheet plus four sides per layer.
        assert_eq!(two.len(), 10);
        assert_eq!(two[5].faces.values().next().unwrap().tintindex, 1);

        let gap = TextureSlots::new().with("layer0", "item/a").with("layer2", "item/b");
        let mut resolver = TextureSlotResolver::new();
        resolver.add_last(gap);
        let one = generate_elements(&resolver.resolve(&"item/test"), &sprites, &model);
        assert_eq!(one.len(), 5);
    }
}
