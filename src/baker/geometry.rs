//! Assembly of element faces into a [`QuadCollection`].

use super::face::bake_quad;
use crate::atlas::SpriteGetter;
use crate::resolver::ResolvedTextures;
use crate::resource_pack::ModelElement;
use crate::types::{Axis, ModelState, QuadCollection, ResourceLocation};

/// Which axes of an element may carry faces.
///
/// A zero-thickness element only draws the faces perpendicular to its flat
/// axis; a point draws nothing.
fn drawn_axes(element: &ModelElement) -> [bool; 3] {
    let (from, to) = (element.from, element.to);
    let mut draw = [true; 3];
    if from[0] == to[0] {
        draw[1] = false;
        draw[2] = false;
    }
    if from[1] == to[1] {
        draw[0] = false;
        draw[2] = false;
    }
    if from[2] == to[2] {
        draw[0] = false;
        draw[1] = false;
    }
    draw
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

/// Bake every face of `elements` under `state`.
///
/// Faces with a cullface land in the bucket of that direction rotated by the
/// model orientation, everything else is unculled. A face that fails to bake
/// is logged and skipped.
pub fn bake_elements(
    elements: &[ModelElement],
    textures: &ResolvedTextures,
    sprites: &SpriteGetter,
    state: &ModelState,
    model: &ResourceLocation,
) -> QuadCollection {
    let transformation = state.transformation();
    let mut builder = QuadCollection::builder();

    for element in elements {
        let draw = drawn_axes(element);
        if !draw.iter().any(|d| *d) {
            continue;
        }
        for (&direction, face) in &element.faces {
            if !draw[axis_index(direction.axis())] {
                continue;
            }
            let sprite = sprites.get_face(textures, &face.texture, model);
            let quad = match bake_quad(element, face, direction, sprite, state) {
                Ok(quad) => quad,
                Err(e) => {
                    log::error!("Failed to bake {} face of {}: {}", direction, model, e);
                    continue;
                }
            };
            match face.cullface {
                Some(cullface) => {
                    builder.add_culled(cullface.rotate(&transformation), quad);
                }
                None => {
                    builder.add_unculled(quad);
                }
            }
        }
    }

    builder.build()
}
