//! Baking of a single element face into a [`BakedQuad`].

use crate::atlas::Sprite;
use crate::error::{BakeError, Result};
use crate::resource_pack::{ModelElement, ModelFace};
use crate::types::{pack_uv, BakedQuad, Direction, ModelState};
use glam::{Mat4, Vec3};
use std::sync::Arc;

/// Corner selector for one vertex: `true` picks the maximum on that axis.
type Corner = [bool; 3];

const MIN: bool = false;
const MAX: bool = true;

/// Canonical vertex order for each facing.
fn face_corners(direction: Direction) -> [Corner; 4] {
    match direction {
        Direction::Down => [
            [MIN, MIN, MAX],
            [MIN, MIN, MIN],
            [MAX, MIN, MIN],
            [MAX, MIN, MAX],
        ],
        Direction::Up => [
            [MIN, MAX, MIN],
            [MIN, MAX, MAX],
            [MAX, MAX, MAX],
            [MAX, MAX, MIN],
        ],
        Direction::North => [
            [MAX, MAX, MIN],
            [MAX, MIN, MIN],
            [MIN, MIN, MIN],
            [MIN, MAX, MIN],
        ],
        Direction::South => [
            [MIN, MAX, MAX],
            [MIN, MIN, MAX],
            [MAX, MIN, MAX],
            [MAX, MAX, MAX],
        ],
        Direction::West => [
            [MIN, MAX, MIN],
            [MIN, MIN, MIN],
            [MIN, MIN, MAX],
            [MIN, MAX, MAX],
        ],
        Direction::East => [
            [MAX, MAX, MAX],
            [MAX, MIN, MAX],
            [MAX, MIN, MIN],
            [MAX, MAX, MIN],
        ],
    }
}

fn select(corner: Corner, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(
        if corner[0] { max.x } else { min.x },
        if corner[1] { max.y } else { min.y },
        if corner[2] { max.z } else { min.z },
    )
}

/// UV rectangle a face gets when it declares none, in texels.
pub fn default_face_uv(from: [f32; 3], to: [f32; 3], direction: Direction) -> [f32; 4] {
    match direction {
        Direction::Down => [from[0], 16.0 - to[2], to[0], 16.0 - from[2]],
        Direction::Up => [from[0], from[2], to[0], to[2]],
        Direction::North => [16.0 - to[0], 16.0 - to[1], 16.0 - from[0], 16.0 - from[1]],
        Direction::South => [from[0], 16.0 - to[1], to[0], 16.0 - from[1]],
        Direction::West => [from[2], 16.0 - to[1], to[2], 16.0 - from[1]],
        Direction::East => [16.0 - to[2], 16.0 - to[1], 16.0 - from[2], 16.0 - from[1]],
    }
}

/// UV of rectangle corner `index`: 0 = (minU, minV), then counter-clockwise.
fn corner_uv(uv: &[f32; 4], index: usize) -> [f32; 2] {
    let u = if index == 0 || index == 1 { uv[0] } else { uv[2] };
    let v = if index == 0 || index == 3 { uv[1] } else { uv[3] };
    [u, v]
}

/// Bake one face of `element` declared for `facing`.
///
/// Fails only when an unrotated quad cannot be put into canonical winding.
pub fn bake_quad(
    element: &ModelElement,
    face: &ModelFace,
    facing: Direction,
    sprite: Arc<Sprite>,
    state: &ModelState,
) -> Result<BakedQuad> {
    let from = Vec3::from(element.from) / 16.0;
    let to = Vec3::from(element.to) / 16.0;
    let uv = face
        .uv
        .unwrap_or_else(|| default_face_uv(element.from, element.to, facing));
    let model_rotation = (!state.is_identity()).then(|| state.transformation());
    let uv_lock = state.inverse_face_transformation(facing);
    let corners = face_corners(facing);

    let mut positions = [Vec3::ZERO; 4];
    let mut uvs = [[0.0f32; 2]; 4];
    for i in 0..4 {
        let mut pos = select(corners[i], from, to);
        if let Some(rotation) = &element.rotation {
            pos = rotate_about(pos, rotation.transform(), rotation.origin);
        }
        if let Some(matrix) = &model_rotation {
            pos = rotate_about(pos, matrix, Vec3::splat(0.5));
        }
        positions[i] = pos;

        let [u, v] = corner_uv(&uv, face.rotation.rotate_vertex_index(i));
        let (mut u, mut v) = (u / 16.0, v / 16.0);
        if let Some(matrix) = &uv_lock {
            let locked = matrix.transform_point3(Vec3::new(u - 0.5, v - 0.5, 0.0));
            u = locked.x + 0.5;
            v = locked.y + 0.5;
        }
        uvs[i] = [u, v];
    }

    let found = calculate_facing(&positions);
    if element.rotation.is_none() {
        if let Some(direction) = found {
            recalculate_winding(&mut positions, &mut uvs, direction)?;
        }
    }

    Ok(BakedQuad {
        positions,
        packed_uvs: uvs.map(|[u, v]| pack_uv(sprite.get_u(u), sprite.get_v(v))),
        tint_index: face.tintindex,
        direction: found.unwrap_or(Direction::Up),
        sprite,
        shade: element.shade,
        light_emission: element.light_emission,
    })
}

fn rotate_about(pos: Vec3, matrix: &Mat4, origin: Vec3) -> Vec3 {
    matrix.transform_point3(pos - origin) + origin
}

/// Cardinal direction closest to the quad's normal, `None` for a degenerate quad.
pub fn calculate_facing(positions: &[Vec3; 4]) -> Option<Direction> {
    let a = positions[0] - positions[1];
    let b = positions[2] - positions[1];
    let normal = b.cross(a).normalize();
    if !normal.is_finite() {
        return None;
    }

    let mut best = None;
    let mut best_dot = 0.0f32;
    for direction in Direction::ALL {
        let dot = normal.dot(direction.normal());
        if dot >= 0.0 && (best.is_none() || dot > best_dot) {
            best = Some(direction);
            best_dot = dot;
        }
    }
    best
}

/// Reorder vertices (with their UVs) into the canonical order for `direction`.
fn recalculate_winding(
    positions: &mut [Vec3; 4],
    uvs: &mut [[f32; 2]; 4],
    direction: Direction,
) -> Result<()> {
    let min = positions.iter().copied().fold(Vec3::splat(f32::MAX), Vec3::min);
    let max = positions.iter().copied().fold(Vec3::splat(f32::MIN), Vec3::max);

    for (i, corner) in face_corners(direction).into_iter().enumerate() {
        let target = select(corner, min, max);
        let found = (i..4)
            .find(|&j| positions[j] == target)
            .ok_or_else(|| BakeError::WindingMismatch {
                direction: direction.to_string(),
                corner: i,
            })?;
        if found != i {
            positions.swap(i, found);
            uvs.swap(i, found);
        }
    }
    Ok(())
}

/// True when every vertex sits on the canonical min/max corner for the quad's facing.
#[cfg(test)]
pub(crate) fn has_canonical_winding(quad: &BakedQuad) -> bool {
    let min = quad.positions.iter().copied().fold(Vec3::splat(f32::MAX), Vec3::min);
    let max = quad.positions.iter().copied().fold(Vec3::splat(f32::MIN), Vec3::max);
    face_corners(quad.direction)
        .into_iter()
        .zip(quad.positions)
        .all(|(corner, pos)| select(corner, min, max) == pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_pack::TextureData;
    use crate::types::{
        unpack_u, unpack_v, Axis, ElementRotation, Quadrant, ResourceLocation, RotationValue,
    };
    use std::collections::BTreeMap;

    fn sprite() -> Arc<Sprite> {
        Arc::new(Sprite::standalone(
            ResourceLocation::minecraft("block/stone"),
            TextureData::new(16, 16, vec![255; 16 * 16 * 4]),
        ))
    }

    fn element(from: [f32; 3], to: [f32; 3]) -> ModelElement {
        ModelElement {
            from,
            to,
            rotation: None,
            shade: true,
            light_emission: 0,
            faces: BTreeMap::new(),
        }
    }

    fn uv(quad: &BakedQuad, i: usize) -> (f32, f32) {
        (unpack_u(quad.packed_uvs[i]), unpack_v(quad.packed_uvs[i]))
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_full_cube_default_uv_and_facing() {
        let cube = element([0.0; 3], [16.0; 3]);
        for dir in Direction::ALL {
            assert_eq!(default_face_uv(cube.from, cube.to, dir), [0.0, 0.0, 16.0, 16.0]);
            let quad =
                bake_quad(&cube, &ModelFace::new("#all"), dir, sprite(), &ModelState::identity())
                    .unwrap();
            assert_eq!(quad.direction, dir);
            assert!(has_canonical_winding(&quad));
            assert_eq!(uv(&quad, 0), (0.0, 0.0));
            assert_eq!(uv(&quad, 1), (0.0, 1.0));
            assert_eq!(uv(&quad, 2), (1.0, 1.0));
            assert_eq!(uv(&quad, 3), (1.0, 0.0));
        }
    }

    #[test]
    fn test_default_uv_for_partial_element() {
        let slab = [0.0, 0.0, 0.0];
        let top = [16.0, 8.0, 16.0];
        assert_eq!(default_face_uv(slab, top, Direction::North), [0.0, 8.0, 16.0, 16.0]);
        assert_eq!(default_face_uv(slab, top, Direction::Up), [0.0, 0.0, 16.0, 16.0]);
        let post = [6.0, 0.0, 2.0];
        let post_to = [10.0, 16.0, 4.0];
        assert_eq!(default_face_uv(post, post_to, Direction::Down), [6.0, 12.0, 10.0, 14.0]);
        assert_eq!(default_face_uv(post, post_to, Direction::East), [12.0, 0.0, 14.0, 16.0]);
    }

    #[test]
    fn test_face_uv_rotation_shifts_corners() {
        let cube = element([0.0; 3], [16.0; 3]);
        let mut face = ModelFace::new("#all");
        face.rotation = Quadrant::R90;
        let quad =
            bake_quad(&cube, &face, Direction::Up, sprite(), &ModelState::identity()).unwrap();
        assert_eq!(uv(&quad, 0), (0.0, 1.0));
        assert_eq!(uv(&quad, 3), (0.0, 0.0));
    }

    #[test]
    fn test_model_rotation_changes_facing() {
        let cube = element([0.0; 3], [16.0; 3]);
        let state = ModelState::new(Quadrant::R0, Quadrant::R90, false);
        let quad =
            bake_quad(&cube, &ModelFace::new("#all"), Direction::North, sprite(), &state).unwrap();
        assert_eq!(quad.direction, Direction::East);
        assert!(has_canonical_winding(&quad));

        let state = ModelState::new(Quadrant::R90, Quadrant::R0, false);
        let quad =
            bake_quad(&cube, &ModelFace::new("#all"), Direction::Up, sprite(), &state).unwrap();
        assert_eq!(quad.direction, Direction::North);
    }

    #[test]
    fn test_uv_lock_keeps_top_texture_world_aligned() {
        let half = element([0.0, 0.0, 0.0], [8.0, 16.0, 16.0]);
        let state = ModelState::new(Quadrant::R0, Quadrant::R90, true);
        let quad =
            bake_quad(&half, &ModelFace::new("#all"), Direction::Up, sprite(), &state).unwrap();
        assert_eq!(quad.direction, Direction::Up);
        // The rotated half covers x 0..1, z 0..0.5, so its world-aligned UVs
        // span the top half of the texture.
        for i in 0..4 {
            let (u, v) = uv(&quad, i);
            let p = quad.positions[i];
            assert!((u - p.x).abs() < 1e-5, "u {} at {:?}", u, p);
            assert!((v - p.z).abs() < 1e-5, "v {} at {:?}", v, p);
        }
    }

    /// UV a world-locked texture shows at `p` on a face pointing `facing`.
    fn world_uv(facing: Direction, p: Vec3) -> (f32, f32) {
        match facing {
            Direction::Up => (p.x, p.z),
            Direction::Down => (p.x, 1.0 - p.z),
            Direction::North => (1.0 - p.x, 1.0 - p.y),
            Direction::South => (p.x, 1.0 - p.y),
            Direction::West => (p.z, 1.0 - p.y),
            Direction::East => (1.0 - p.z, 1.0 - p.y),
        }
    }

    #[test]
    fn test_uv_lock_world_aligned_in_every_orientation() {
        let quadrants = [Quadrant::R0, Quadrant::R90, Quadrant::R180, Quadrant::R270];
        let block = element([2.0, 3.0, 4.0], [10.0, 12.0, 14.0]);
        for x in quadrants {
            for y in quadrants {
                let state = ModelState::new(x, y, true);
                for facing in Direction::ALL {
                    let quad =
                        bake_quad(&block, &ModelFace::new("#all"), facing, sprite(), &state)
                            .unwrap();
                    assert_eq!(quad.direction, facing.rotate(&state.transformation()));
                    assert!(has_canonical_winding(&quad), "x={:?} y={:?} {}", x, y, facing);
                    for i in 0..4 {
                        let (u, v) = uv(&quad, i);
                        let (wu, wv) = world_uv(quad.direction, quad.positions[i]);
                        assert!(
                            (u - wu).abs() < 1e-5 && (v - wv).abs() < 1e-5,
                            "x={:?} y={:?} {} vertex {}: ({}, {}) != ({}, {})",
                            x,
                            y,
                            facing,
                            i,
                            u,
                            v,
                            wu,
                            wv
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_rotated_element_keeps_bake_order() {
        let mut tilted = element([0.0; 3], [16.0; 3]);
        tilted.rotation = Some(ElementRotation::new(
            [8.0, 8.0, 8.0],
            RotationValue::Single {
                axis: Axis::Y,
                angle: 45.0,
            },
            false,
        ));
        let quad = bake_quad(
            &tilted,
            &ModelFace::new("#all"),
            Direction::Up,
            sprite(),
            &ModelState::identity(),
        )
        .unwrap();
        assert_eq!(quad.direction, Direction::Up);
        let c = std::f32::consts::FRAC_1_SQRT_2 / 2.0;
        // Corner (0,1,0) turned 45 degrees counter-clockwise about +Y.
        assert_close(quad.positions[0], Vec3::new(0.5 - c * 2.0, 1.0, 0.5));
    }

    #[test]
    fn test_flat_element_facing() {
        let plane = element([0.0, 0.0, 8.0], [16.0, 16.0, 8.0]);
        let quad = bake_quad(
            &plane,
            &ModelFace::new("#all"),
            Direction::South,
            sprite(),
            &ModelState::identity(),
        )
        .unwrap();
        assert_eq!(quad.direction, Direction::South);
        assert!(quad.positions.iter().all(|p| p.z == 0.5));
    }

    #[test]
    fn test_degenerate_quad_has_no_facing() {
        let positions = [Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::X];
        assert_eq!(calculate_facing(&positions), None);

        let line = element([0.0, 0.0, 0.0], [16.0, 0.0, 0.0]);
        let quad = bake_quad(
            &line,
            &ModelFace::new("#all"),
            Direction::North,
            sprite(),
            &ModelState::identity(),
        )
        .unwrap();
        assert_eq!(quad.direction, Direction::Up);
    }

    #[test]
    fn test_winding_restores_canonical_order() {
        let mut positions = [
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ];
        let mut uvs = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
        recalculate_winding(&mut positions, &mut uvs, Direction::Up).unwrap();
        assert_eq!(positions[0], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(positions[1], Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(positions[2], Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(positions[3], Vec3::new(1.0, 1.0, 0.0));
        // UVs travel with their vertex.
        assert_eq!(uvs, [[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_winding_mismatch_is_an_error() {
        let mut positions = [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.3, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        let mut uvs = [[0.0; 2]; 4];
        let err = recalculate_winding(&mut positions, &mut uvs, Direction::Up).unwrap_err();
        assert!(matches!(err, BakeError::WindingMismatch { corner: 1, .. }));
    }
}
