//! Light-Space Ortho Fit
//!
//! Pure math for fitting a directional light's orthographic frustum around
//! the scene bounds, extracted from the shadow pass for reuse and
//! testability.
//!
//! The fit guarantees the frustum covers the scene bounding box with a 20%
//! margin and never degenerates below a 10-unit minimum footprint,
//! independent of scene scale.

use glam::{Mat4, Vec3};

use crate::scene::bounds::Aabb;

/// Minimum half extent of the fitted frustum, in world units.
pub const MIN_FOOTPRINT: f32 = 10.0;

/// Coverage margin applied on top of the scene extent.
pub const FIT_MARGIN: f32 = 1.2;

/// Near plane distance of the light camera.
pub const SHADOW_NEAR: f32 = 0.1;

/// A fitted light-space orthographic frustum.
///
/// All fields are world-space scalars/points so the fit policy can be
/// asserted on directly; [`OrthoFit::matrix`] folds them into the
/// light-space view-projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoFit {
    /// Half extent of the square XY footprint (`[-half_extent, +half_extent]`).
    pub half_extent: f32,
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
    /// Light camera position.
    pub eye: Vec3,
    /// Point the light camera looks at (the scene-bounds center).
    pub target: Vec3,
}

/// Fits an orthographic frustum around `bounds` for a light shining
/// along `light_direction`.
///
/// - `half_extent = max(extent_x, extent_z, 10) * 1.2`
/// - `eye = center - direction * (half_extent + 10)`
/// - depth range `[0.1, 2 * (half_extent + 10)]`
///
/// Empty bounds fit the minimum footprint centered at the origin. A
/// degenerate light direction falls back to straight down.
#[must_use]
pub fn fit_directional(bounds: &Aabb, light_direction: Vec3) -> OrthoFit {
    let safe_dir = if light_direction.length_squared() > 1e-6 {
        light_direction.normalize()
    } else {
        Vec3::NEG_Y
    };

    let (center, extents) = if bounds.is_empty() {
        (Vec3::ZERO, Vec3::ZERO)
    } else {
        (bounds.center(), bounds.half_extents())
    };

    let half_extent = extents.x.max(extents.z).max(MIN_FOOTPRINT) * FIT_MARGIN;
    let offset = half_extent + 10.0;

    OrthoFit {
        half_extent,
        near: SHADOW_NEAR,
        far: 2.0 * offset,
        eye: center - safe_dir * offset,
        target: center,
    }
}

impl OrthoFit {
    /// Builds the light-space view-projection matrix.
    ///
    /// Depth range is [0, 1] (`Mat4::orthographic_rh`). The up vector flips
    /// to +X when the light is near vertical, which covers the default
    /// straight-down light.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        let dir = (self.target - self.eye).normalize();
        let up = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
        let view = Mat4::look_at_rh(self.eye, self.target, up);
        let proj = Mat4::orthographic_rh(
            -self.half_extent,
            self.half_extent,
            -self.half_extent,
            self.half_extent,
            self.near,
            self.far,
        );
        proj * view
    }
}
