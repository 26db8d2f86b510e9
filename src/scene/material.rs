//! Materials
//!
//! Materials are plain parameter blocks; the forward pass owns the shaders
//! and feeds these parameters through per-object uniforms. Capability flags
//! replace name-based shader introspection: a pass asks what a material
//! *can do* instead of matching identifier substrings.

use bitflags::bitflags;
use glam::Vec4;

bitflags! {
    /// Capability set of a material.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialCaps: u32 {
        /// This material is a designated source of per-frame lighting
        /// parameter overrides. The first extracted renderer carrying this
        /// capability feeds [`LightingOverrides`] into parameter resolution.
        const LIGHTING_OVERRIDES = 1 << 0;
        /// Geometry with this material is drawn into the shadow map.
        const CASTS_SHADOWS = 1 << 1;
    }
}

impl Default for MaterialCaps {
    fn default() -> Self {
        Self::CASTS_SHADOWS
    }
}

/// Which sorted queue a material's geometry is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderQueue {
    /// Depth-tested, sorted front-to-back.
    #[default]
    Opaque,
    /// Alpha-blended, sorted back-to-front, no depth writes.
    Transparent,
}

/// Optional per-frame lighting parameter overrides.
///
/// Any field left `None` falls back to the pipeline's
/// [`LightingDefaults`](crate::settings::LightingDefaults). Carried by
/// materials with [`MaterialCaps::LIGHTING_OVERRIDES`]; ignored otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightingOverrides {
    /// Shadow attenuation factor in `[0, 1]`.
    pub shadow_strength: Option<f32>,
    /// Depth bias applied during the shadow comparison.
    pub shadow_bias: Option<f32>,
    /// Shadow target resolution in texels (square).
    pub shadow_map_size: Option<u32>,
    /// Environment lighting scale.
    pub ibl_intensity: Option<f32>,
    /// Specular anisotropy in `[0, 1]`.
    pub anisotropy: Option<f32>,
}

/// A forward-shaded material.
#[derive(Debug, Clone)]
pub struct Material {
    /// Base color, linear RGBA. Alpha feeds blending in the transparent
    /// queue and is ignored in the opaque queue.
    pub base_color: Vec4,
    /// Metalness in `[0, 1]`.
    pub metallic: f32,
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
    /// Draw queue.
    pub queue: RenderQueue,
    /// Capability flags.
    pub caps: MaterialCaps,
    /// Lighting overrides, honored only with
    /// [`MaterialCaps::LIGHTING_OVERRIDES`].
    pub lighting: LightingOverrides,
}

impl Material {
    /// An opaque shadow-casting material with the given base color.
    #[must_use]
    pub fn opaque(base_color: Vec4) -> Self {
        Self {
            base_color,
            ..Self::default()
        }
    }

    /// A transparent material with the given base color.
    ///
    /// Transparent geometry never casts shadows.
    #[must_use]
    pub fn transparent(base_color: Vec4) -> Self {
        Self {
            base_color,
            queue: RenderQueue::Transparent,
            caps: MaterialCaps::empty(),
            ..Self::default()
        }
    }

    /// `true` when this material's geometry belongs in the shadow pass.
    ///
    /// Only opaque casters feed the depth-only pass.
    #[inline]
    #[must_use]
    pub fn casts_shadows(&self) -> bool {
        self.queue == RenderQueue::Opaque && self.caps.contains(MaterialCaps::CASTS_SHADOWS)
    }

    /// Returns the override block when this material is a designated
    /// override source.
    #[inline]
    #[must_use]
    pub fn lighting_overrides(&self) -> Option<&LightingOverrides> {
        self.caps
            .contains(MaterialCaps::LIGHTING_OVERRIDES)
            .then_some(&self.lighting)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 0.5,
            queue: RenderQueue::Opaque,
            caps: MaterialCaps::default(),
            lighting: LightingOverrides::default(),
        }
    }
}
