//! Positions, block coordinates and area bounds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Continuous world position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: Vec3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance ignoring the vertical axis.
    pub fn horizontal_distance_to(&self, other: Vec3) -> f64 {
        let (dx, dz) = (self.x - other.x, self.z - other.z);
        (dx * dx + dz * dz).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn floored(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn above(&self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Corner coordinate as a continuous position.
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl From<Vec3> for BlockPos {
    fn from(value: Vec3) -> Self {
        value.floored()
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned inclusive block rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl Bounds {
    /// Smallest bounds containing every point, or `None` for an empty set.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = BlockPos>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
            min_z: first.z,
            max_z: first.z,
        };
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
            bounds.min_z = bounds.min_z.min(p.z);
            bounds.max_z = bounds.max_z.max(p.z);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) as f64 / 2.0 + 0.5,
            self.max_y as f64,
            (self.min_z + self.max_z) as f64 / 2.0 + 0.5,
        )
    }

    /// Half of the horizontal diagonal, used as a scan radius around `center`.
    pub fn radius(&self) -> f64 {
        let dx = (self.max_x - self.min_x + 1) as f64;
        let dz = (self.max_z - self.min_z + 1) as f64;
        (dx * dx + dz * dz).sqrt() / 2.0
    }

    pub fn contains_block(&self, pos: BlockPos) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x)
            && (self.min_y..=self.max_y).contains(&pos.y)
            && (self.min_z..=self.max_z).contains(&pos.z)
    }

    /// Whether a position lies inside the bounds grown by `margin` on every side.
    pub fn contains(&self, pos: Vec3, margin: f64) -> bool {
        pos.x >= self.min_x as f64 - margin
            && pos.x <= (self.max_x + 1) as f64 + margin
            && pos.y >= self.min_y as f64 - margin
            && pos.y <= (self.max_y + 1) as f64 + margin
            && pos.z >= self.min_z as f64 - margin
            && pos.z <= (self.max_z + 1) as f64 + margin
    }
}

/// Blocks to clear for a descending staircase from `from` down to the level of `target`.
///
/// Each step moves one block toward the target horizontally and one block down,
/// clearing the feet and head space. A target directly below steps along +x.
pub fn staircase_steps(from: Vec3, target: BlockPos) -> Vec<BlockPos> {
    let start = from.floored();
    if target.y >= start.y - 1 {
        return Vec::new();
    }

    let (dx, dz) = (target.x as f64 + 0.5 - from.x, target.z as f64 + 0.5 - from.z);
    let (step_x, step_z) = if (dx * dx + dz * dz).sqrt() > 0.5 {
        (sign(dx), sign(dz))
    } else {
        (1, 0)
    };

    let mut steps = Vec::new();
    let (mut x, mut z) = (start.x, start.z);
    let mut y = start.y - 1;
    while y >= target.y {
        x += step_x;
        z += step_z;
        steps.push(BlockPos::new(x, y + 1, z));
        steps.push(BlockPos::new(x, y, z));
        y -= 1;
    }
    steps
}

fn sign(v: f64) -> i32 {
    if v > 0.25 {
        1
    } else if v < -0.25 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staircase_descends_one_level_per_step() {
        let steps = staircase_steps(Vec3::new(0.5, 64.0, 0.5), BlockPos::new(5, 60, 0));
        // feet levels 63, 62, 61, 60 with head space above each
        assert_eq!(steps.len(), 8);
        assert_eq!(steps[0], BlockPos::new(1, 64, 0));
        assert_eq!(steps[1], BlockPos::new(1, 63, 0));
        assert_eq!(steps[7], BlockPos::new(4, 60, 0));
    }

    #[test]
    fn no_staircase_for_shallow_targets() {
        assert!(staircase_steps(Vec3::new(0.5, 64.0, 0.5), BlockPos::new(3, 63, 3)).is_empty());
        assert!(staircase_steps(Vec3::new(0.5, 64.0, 0.5), BlockPos::new(3, 70, 3)).is_empty());
    }

    #[test]
    fn bounds_margin_check() {
        let bounds = Bounds::enclosing([BlockPos::new(0, 63, 0), BlockPos::new(4, 64, 6)]).unwrap();
        assert!(bounds.contains(Vec3::new(2.0, 64.0, 3.0), 0.0));
        assert!(bounds.contains(Vec3::new(7.5, 64.0, 3.0), 3.0));
        assert!(!bounds.contains(Vec3::new(9.0, 64.0, 3.0), 3.0));
        assert!(bounds.contains_block(BlockPos::new(4, 64, 6)));
        assert!(!bounds.contains_block(BlockPos::new(4, 65, 6)));
    }
}
