use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space.
///
/// `min` is component-wise less than or equal to `max`. Every collision check
/// in the game goes through this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from two corners in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self {
            min: *first,
            max: *first,
        };
        for point in rest {
            bounds.min = bounds.min.min(*point);
            bounds.max = bounds.max.max(*point);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Overlap test, inclusive on touching faces.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns true when the XZ footprints overlap, ignoring height.
    pub fn overlaps_xz(&self, other: &Self) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        let delta = Vec3::splat(margin);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Bounds of the eight corners after an affine transform.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let first = matrix.transform_point3(corners[0]);
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for corner in &corners[1..] {
            let point = matrix.transform_point3(*corner);
            bounds.min = bounds.min.min(point);
            bounds.max = bounds.max.max(point);
        }
        bounds
    }

    /// Smallest horizontal translation that moves `self` out of `obstacle`.
    ///
    /// Only X and Z are considered; returns `None` when the boxes do not
    /// overlap.
    pub fn penetration_xz(&self, obstacle: &Self) -> Option<Vec3> {
        if !self.intersects(obstacle) {
            return None;
        }
        let push_pos_x = obstacle.max.x - self.min.x;
        let push_neg_x = self.max.x - obstacle.min.x;
        let push_pos_z = obstacle.max.z - self.min.z;
        let push_neg_z = self.max.z - obstacle.min.z;

        let x = if push_pos_x < push_neg_x {
            push_pos_x
        } else {
            -push_neg_x
        };
        let z = if push_pos_z < push_neg_z {
            push_pos_z
        } else {
            -push_neg_z
        };

        if x.abs() <= z.abs() {
            Some(Vec3::new(x, 0.0, 0.0))
        } else {
            Some(Vec3::new(0.0, 0.0, z))
        }
    }
}
