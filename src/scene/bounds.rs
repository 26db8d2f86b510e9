//! Axis-Aligned Bounding Boxes
//!
//! World-space bounds for renderers and the per-frame scene aggregate.
//! The aggregate is rebuilt from scratch every frame by the extraction walk;
//! an empty scene yields [`Aabb::EMPTY`], which consumers must special-case
//! (the shadow fit applies a fixed minimum footprint).

use glam::{Mat4, Vec3};

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// The empty bounds sentinel.
    ///
    /// Inverted extremes make `union` with any real box return that box
    /// unchanged, so the aggregation loop needs no first-element special case.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Creates bounds from a center point and half extents.
    #[inline]
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates bounds from explicit corners.
    ///
    /// The corners are normalized so `min <= max` holds per component.
    #[inline]
    #[must_use]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// `true` when no point is contained (the [`EMPTY`](Self::EMPTY) state).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Center point. Meaningless for empty bounds.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half extents per axis. Meaningless for empty bounds.
    #[inline]
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `true` when `other` lies entirely inside `self`.
    ///
    /// Every box contains the empty box.
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Axis-aligned bounds of the box after applying `matrix`.
    ///
    /// Folds the eight transformed corners, so rotations produce a
    /// conservative (possibly larger) box. Empty bounds stay empty.
    #[must_use]
    pub fn transformed(&self, matrix: Mat4) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }

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

        let mut out = Self::EMPTY;
        for corner in corners {
            let point = matrix.transform_point3(corner);
            out.min = out.min.min(point);
            out.max = out.max.max(point);
        }
        out
    }

    /// Bounding sphere of the box, as `(center, radius)`.
    ///
    /// Used for frustum culling. Empty bounds yield a zero-radius sphere at
    /// the origin.
    #[inline]
    #[must_use]
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        if self.is_empty() {
            return (Vec3::ZERO, 0.0);
        }
        (self.center(), self.half_extents().length())
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
