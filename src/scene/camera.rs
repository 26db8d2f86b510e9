//! Camera
//!
//! Perspective camera with cached view/projection matrices. The renderer
//! derives its culling frustum from the combined view-projection at frame
//! start; a camera whose matrix is degenerate fails that derivation and is
//! skipped for the frame.

use glam::{Mat4, Vec3};

/// A perspective camera.
///
/// Matrices are cached and recomputed by the setters, so the per-frame
/// render path only reads.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Width / height.
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,

    position: Vec3,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
}

impl Camera {
    /// Creates a perspective camera at the origin looking down `-Z`.
    ///
    /// `fov` is the vertical field of view in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Recomputes the projection matrix from the current parameters.
    ///
    /// glam's `perspective_rh` targets the WGPU/Vulkan depth range `[0, 1]`.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// Positions the camera at `eye` looking at `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.view_matrix = Mat4::look_at_rh(eye, target, up);
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// Updates the aspect ratio (on target resize) and the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Camera world position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// View matrix (world → view).
    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    /// Projection matrix (view → clip).
    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Combined view-projection matrix.
    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}
