//! Directional Light
//!
//! Exactly one directional light is honored per frame: extraction picks the
//! first visible one and folds color and intensity into a single RGB value.
//! A frame with no visible light falls back to
//! [`DirectionalLightState::UNLIT`].

use glam::Vec3;

/// A directional light in the scene.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// World-space direction the light is shining (not necessarily unit
    /// length; the renderer normalizes).
    pub direction: Vec3,
    /// Light color, linear RGB.
    pub color: Vec3,
    /// Intensity multiplier applied to `color`.
    pub intensity: f32,
    /// Invisible lights are ignored by extraction.
    pub visible: bool,
}

impl DirectionalLight {
    /// Creates a visible light with intensity `1.0`.
    #[must_use]
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self {
            direction,
            color,
            intensity: 1.0,
            visible: true,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::NEG_Y, Vec3::ONE)
    }
}

/// The per-frame resolved light: unit direction plus intensity-scaled color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightState {
    /// Unit direction the light travels.
    pub direction: Vec3,
    /// Intensity-scaled linear RGB.
    pub color: Vec3,
    /// `false` when this is the lightless-frame fallback.
    pub visible: bool,
}

impl DirectionalLightState {
    /// Fallback for frames without a visible directional light: pointing
    /// straight down, black.
    pub const UNLIT: Self = Self {
        direction: Vec3::NEG_Y,
        color: Vec3::ZERO,
        visible: false,
    };

    /// Resolves a scene light into frame state.
    ///
    /// Degenerate directions fall back to straight down rather than
    /// producing NaNs downstream.
    #[must_use]
    pub fn from_light(light: &DirectionalLight) -> Self {
        let direction = if light.direction.length_squared() > 1e-6 {
            light.direction.normalize()
        } else {
            Vec3::NEG_Y
        };
        Self {
            direction,
            color: light.color * light.intensity,
            visible: true,
        }
    }
}

impl Default for DirectionalLightState {
    fn default() -> Self {
        Self::UNLIT
    }
}
