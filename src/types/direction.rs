//! Direction, axis and quadrant types for face and rotation handling.

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Deserializer, Serialize};

/// The six cardinal directions / face directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Stable index in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the offset for this direction.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    /// Unit normal vector for this direction.
    pub fn normal(&self) -> Vec3 {
        let (x, y, z) = self.offset();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Get the axis this direction is on.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// The direction whose normal is closest to `v`.
    pub fn nearest(v: Vec3) -> Direction {
        let mut best = Direction::North;
        let mut best_dot = f32::MIN;
        for dir in Direction::ALL {
            let dot = v.dot(dir.normal());
            if dot > best_dot {
                best_dot = dot;
                best = dir;
            }
        }
        best
    }

    /// Rotate this direction by an orientation matrix.
    pub fn rotate(self, matrix: &Mat4) -> Direction {
        Direction::nearest(matrix.transform_vector3(self.normal()))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
            Direction::East => write!(f, "east"),
        }
    }
}

/// The three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Get the unit vector for this axis.
    pub fn unit_vector(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Exact rotation by a whole number of counter-clockwise quarter turns.
    ///
    /// Entries are always -1, 0 or 1, so rotated block corners stay exactly
    /// representable.
    pub fn quarter_turns(&self, steps: i32) -> Mat3 {
        let (c, s) = match steps.rem_euclid(4) {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        };
        match self {
            Axis::X => Mat3::from_cols(
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, c, s),
                Vec3::new(0.0, -s, c),
            ),
            Axis::Y => Mat3::from_cols(
                Vec3::new(c, 0.0, -s),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(s, 0.0, c),
            ),
            Axis::Z => Mat3::from_cols(
                Vec3::new(c, s, 0.0),
                Vec3::new(-s, c, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// A rotation restricted to multiples of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Quadrant {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Quadrant {
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Quadrant::R0),
            90 => Some(Quadrant::R90),
            180 => Some(Quadrant::R180),
            270 => Some(Quadrant::R270),
            _ => None,
        }
    }

    /// Number of quarter turns.
    pub fn steps(self) -> i32 {
        self as i32
    }

    pub fn degrees(self) -> i32 {
        self.steps() * 90
    }

    /// Which rectangle corner a face vertex reads once the UVs are rotated.
    pub fn rotate_vertex_index(self, index: usize) -> usize {
        (index + self as usize) % 4
    }
}

impl<'de> Deserialize<'de> for Quadrant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let degrees = i32::deserialize(deserializer)?;
        Quadrant::from_degrees(degrees).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid rotation {}, expected one of 0, 90, 180, 270",
                degrees
            ))
        })
    }
}
