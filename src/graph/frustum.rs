//! View Frustum
//!
//! Plane extraction from a view-projection matrix (Gribb-Hartmann) and
//! sphere intersection tests for culling. Extraction is fallible: a
//! degenerate matrix yields `None` and the caller skips the camera for
//! the frame instead of culling against garbage planes.

use glam::{Mat4, Vec3, Vec4};

/// Six view-frustum planes, normals pointing inward.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    /// Extracts planes from a view-projection matrix.
    ///
    /// Uses the Gribb-Hartmann row combinations for a depth range of
    /// [0, 1]. Returns `None` when any plane normal fails to normalize,
    /// which happens for singular or non-finite matrices.
    #[must_use]
    pub fn from_view_proj(m: Mat4) -> Option<Self> {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // Left
            rows[3] - rows[0], // Right
            rows[3] + rows[1], // Bottom
            rows[3] - rows[1], // Top
            rows[2],           // Near (z in [0, 1])
            rows[3] - rows[2], // Far
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            if !length.is_finite() || length <= 1e-8 {
                return None;
            }
            *plane /= length;
        }

        Some(Self { planes })
    }

    /// `true` when a sphere touches or lies inside the frustum.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.truncate().dot(center) + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }
}
