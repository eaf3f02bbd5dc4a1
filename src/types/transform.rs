//! Transform types for model orientation and element rotations.

use super::{Axis, Direction, Quadrant};
use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Orientation applied to a whole model by a blockstate variant.
///
/// Rotations are clockwise quarter turns around each axis (Minecraft
/// convention), combined as Y after X after Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ModelState {
    pub x: Quadrant,
    pub y: Quadrant,
    pub z: Quadrant,
    /// If true, UV coordinates stay aligned to world axes when the model rotates.
    pub uvlock: bool,
}

impl ModelState {
    pub fn new(x: Quadrant, y: Quadrant, uvlock: bool) -> Self {
        Self {
            x,
            y,
            z: Quadrant::R0,
            uvlock,
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Check if this is an identity transform (no rotation).
    pub fn is_identity(&self) -> bool {
        self.x == Quadrant::R0 && self.y == Quadrant::R0 && self.z == Quadrant::R0
    }

    /// Exact orientation matrix.
    pub fn rotation(&self) -> Mat3 {
        // Negate: Minecraft rotates clockwise, the matrices are right-handed (CCW).
        Axis::Y.quarter_turns(-self.y.steps())
            * Axis::X.quarter_turns(-self.x.steps())
            * Axis::Z.quarter_turns(-self.z.steps())
    }

    pub fn transformation(&self) -> Mat4 {
        Mat4::from_mat3(self.rotation())
    }

    /// UV transform for a face that keeps its texture locked to world axes.
    ///
    /// Maps centered UVs of `face` in model space to centered UVs of the
    /// rotated face in world space. `None` when UVs are not locked or the
    /// orientation is the identity.
    pub fn inverse_face_transformation(&self, face: Direction) -> Option<Mat4> {
        if !self.uvlock || self.is_identity() {
            return None;
        }
        let rotation = self.transformation();
        let rotated = face.rotate(&rotation);
        // UV v grows downwards while the face plane's y grows upwards.
        let flip_v = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
        Some(
            flip_v
                * face_to_world(rotated).transpose()
                * rotation
                * face_to_world(face)
                * flip_v,
        )
    }
}

/// Maps the south-facing UV plane (x right, y up, +z normal) onto `face`.
fn face_to_world(face: Direction) -> Mat4 {
    let m = match face {
        Direction::South => Mat3::IDENTITY,
        Direction::East => Axis::Y.quarter_turns(1),
        Direction::West => Axis::Y.quarter_turns(-1),
        Direction::North => Axis::Y.quarter_turns(2),
        Direction::Up => Axis::X.quarter_turns(-1),
        Direction::Down => Axis::X.quarter_turns(1),
    };
    Mat4::from_mat3(m)
}

/// The angle part of an element rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationValue {
    /// Rotation around a single axis, in degrees.
    Single { axis: Axis, angle: f32 },
    /// Independent X, Y, Z rotations in degrees, applied in X·Y·Z order.
    Euler { x: f32, y: f32, z: f32 },
}

impl RotationValue {
    pub fn quaternion(&self) -> Quat {
        match *self {
            RotationValue::Single { axis, angle } => {
                Quat::from_axis_angle(axis.unit_vector(), angle.to_radians())
            }
            RotationValue::Euler { x, y, z } => Quat::from_euler(
                EulerRot::XYZ,
                x.to_radians(),
                y.to_radians(),
                z.to_radians(),
            ),
        }
    }

    fn is_zero(&self) -> bool {
        match *self {
            RotationValue::Single { angle, .. } => angle == 0.0,
            RotationValue::Euler { x, y, z } => x == 0.0 && y == 0.0 && z == 0.0,
        }
    }
}

/// Element-level rotation from model element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawElementRotation")]
pub struct ElementRotation {
    /// Origin point in block space (0-1).
    pub origin: Vec3,
    pub value: RotationValue,
    /// Whether to rescale the element so it still spans the block after rotation.
    pub rescale: bool,
    transform: Mat4,
}

impl ElementRotation {
    /// Build a rotation. `origin` is in model units (0-16).
    pub fn new(origin: [f32; 3], value: RotationValue, rescale: bool) -> Self {
        let mut transform = Mat4::from_quat(value.quaternion());
        if rescale && !value.is_zero() {
            transform *= Mat4::from_scale(rescale_factors(&transform));
        }
        Self {
            origin: Vec3::from(origin) / 16.0,
            value,
            rescale,
            transform,
        }
    }

    /// Precomputed rotation (and rescale) matrix.
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub(crate) fn with_rescale(self, rescale: bool) -> Self {
        if rescale == self.rescale {
            return self;
        }
        Self::new((self.origin * 16.0).to_array(), self.value, rescale)
    }
}

/// Per-axis scale so that the rotated unit cube still spans one block.
fn rescale_factors(rotation: &Mat4) -> Vec3 {
    let factor = |axis: Vec3| {
        let rotated = rotation.transform_vector3(axis);
        1.0 / rotated.abs().max_element()
    };
    Vec3::new(factor(Vec3::X), factor(Vec3::Y), factor(Vec3::Z))
}

#[derive(Deserialize)]
struct RawElementRotation {
    #[serde(default = "default_origin")]
    origin: [f32; 3],
    axis: Option<Axis>,
    angle: Option<f32>,
    x: Option<f32>,
    y: Option<f32>,
    z: Option<f32>,
    #[serde(default)]
    rescale: bool,
}

fn default_origin() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

impl TryFrom<RawElementRotation> for ElementRotation {
    type Error = String;

    fn try_from(raw: RawElementRotation) -> Result<Self, Self::Error> {
        let value = match (raw.axis, raw.angle) {
            (Some(axis), Some(angle)) => RotationValue::Single { axis, angle },
            (Some(_), None) => return Err("rotation with 'axis' requires 'angle'".to_string()),
            (None, _) if raw.x.is_some() || raw.y.is_some() || raw.z.is_some() => {
                RotationValue::Euler {
                    x: raw.x.unwrap_or(0.0),
                    y: raw.y.unwrap_or(0.0),
                    z: raw.z.unwrap_or(0.0),
                }
            }
            _ => return Err("rotation requires 'axis' and 'angle' or 'x'/'y'/'z'".to_string()),
        };
        let angles = match value {
            RotationValue::Single { angle, .. } => vec![angle],
            RotationValue::Euler { x, y, z } => vec![x, y, z],
        };
        if angles.iter().any(|a| !a.is_finite()) || raw.origin.iter().any(|c| !c.is_finite()) {
            return Err("rotation values must be finite".to_string());
        }
        Ok(ElementRotation::new(raw.origin, value, raw.rescale))
    }
}
