//! Lighting Parameter Resolution
//!
//! Merges per-material overrides with the pipeline defaults into the fully
//! populated parameter set the shadow and forward passes read. Resolution
//! happens once per frame; the result lives in the frame context, never in
//! process-wide state.

use crate::scene::material::LightingOverrides;
use crate::settings::LightingDefaults;

/// The five lighting parameters, fully resolved.
///
/// Unlike [`LightingOverrides`] every field is populated: any value the
/// override source leaves out comes from [`LightingDefaults`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParameters {
    pub shadow_strength: f32,
    pub shadow_bias: f32,
    pub shadow_map_size: u32,
    pub ibl_intensity: f32,
    pub anisotropy: f32,
}

impl LightingParameters {
    /// Resolves the frame's parameters from an optional override source.
    ///
    /// `overrides` is the lighting block of the frame's override material,
    /// or `None` when no material carries the override capability.
    #[must_use]
    pub fn resolve(overrides: Option<&LightingOverrides>, defaults: &LightingDefaults) -> Self {
        let o = overrides.copied().unwrap_or_default();
        Self {
            shadow_strength: o.shadow_strength.unwrap_or(defaults.shadow_strength),
            shadow_bias: o.shadow_bias.unwrap_or(defaults.shadow_bias),
            shadow_map_size: o.shadow_map_size.unwrap_or(defaults.shadow_map_size),
            ibl_intensity: o.ibl_intensity.unwrap_or(defaults.ibl_intensity),
            anisotropy: o.anisotropy.unwrap_or(defaults.anisotropy),
        }
    }
}
