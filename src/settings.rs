//! Pipeline Settings & Lighting Defaults
//!
//! Configuration consumed once when constructing a [`ForwardPipeline`] or an
//! instancing driver. Runtime scene state (lights, materials, renderers)
//! lives in [`crate::scene`]; everything here is fixed for the lifetime of
//! the pipeline object.
//!
//! [`ForwardPipeline`]: crate::pipeline::ForwardPipeline

use glam::{Vec3, Vec4};

use crate::environment::EnvironmentMap;

// ---------------------------------------------------------------------------
// LightingDefaults
// ---------------------------------------------------------------------------

/// Fallback values for the five per-frame lighting parameters.
///
/// A material carrying [`MaterialCaps::LIGHTING_OVERRIDES`] may override any
/// subset of these per frame; every parameter the override leaves out falls
/// back to the value here, so the resolved parameter set is always fully
/// populated.
///
/// | Field             | Description                               | Default |
/// |-------------------|-------------------------------------------|---------|
/// | `shadow_strength` | Shadow attenuation factor in `[0, 1]`     | `0.9`   |
/// | `shadow_bias`     | Depth bias applied during shadow lookup   | `0.005` |
/// | `shadow_map_size` | Shadow target resolution (square, texels) | `1024`  |
/// | `ibl_intensity`   | Environment lighting scale                | `1.0`   |
/// | `anisotropy`      | Specular anisotropy in `[0, 1]`           | `0.0`   |
///
/// [`MaterialCaps::LIGHTING_OVERRIDES`]: crate::scene::MaterialCaps::LIGHTING_OVERRIDES
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingDefaults {
    /// Shadow attenuation factor in `[0, 1]`.
    pub shadow_strength: f32,
    /// Depth bias applied during the shadow comparison.
    pub shadow_bias: f32,
    /// Shadow target resolution in texels (square).
    pub shadow_map_size: u32,
    /// Environment lighting scale applied to IBL terms.
    pub ibl_intensity: f32,
    /// Specular anisotropy in `[0, 1]`.
    pub anisotropy: f32,
}

impl Default for LightingDefaults {
    fn default() -> Self {
        Self {
            shadow_strength: 0.9,
            shadow_bias: 0.005,
            shadow_map_size: 1024,
            ibl_intensity: 1.0,
            anisotropy: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// StaleShadowPolicy
// ---------------------------------------------------------------------------

/// What to publish on frames where no directional light is visible.
///
/// The shadow target itself is never freed by a lightless frame under either
/// policy; only the published matrix and strength differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleShadowPolicy {
    /// Keep the previous frame's shadow map and light-space matrix published
    /// unchanged. Avoids one-frame shadow pops when a light blinks off.
    #[default]
    Retain,
    /// Publish a disabled shadow (strength forced to zero) while keeping the
    /// last matrix in place.
    Disable,
}

// ---------------------------------------------------------------------------
// PipelineSettings
// ---------------------------------------------------------------------------

/// Global configuration for [`ForwardPipeline`] construction.
///
/// Consumed once by [`ForwardPipeline::new`]; the environment map moves into
/// the pipeline.
///
/// | Field           | Description                            | Default          |
/// |-----------------|----------------------------------------|------------------|
/// | `environment`   | Skybox + IBL cubemap                   | `None`           |
/// | `defaults`      | Lighting parameter fallbacks           | see type         |
/// | `ambient_color` | Constant ambient term (linear RGB)     | `(0.05, …)`      |
/// | `stale_shadows` | Lightless-frame publication policy     | `Retain`         |
/// | `color_format`  | Format of the caller's color target    | `Rgba8UnormSrgb` |
/// | `depth_format`  | Pipeline-owned depth buffer format     | `Depth32Float`   |
/// | `clear_color`   | Frame clear color                      | opaque black     |
///
/// # Example
///
/// ```rust,ignore
/// use umbra::settings::PipelineSettings;
///
/// let settings = PipelineSettings {
///     environment: Some(env),
///     ..Default::default()
/// };
/// let mut pipeline = ForwardPipeline::new(&gpu, settings);
/// ```
///
/// [`ForwardPipeline`]: crate::pipeline::ForwardPipeline
/// [`ForwardPipeline::new`]: crate::pipeline::ForwardPipeline::new
#[derive(Debug)]
pub struct PipelineSettings {
    /// Environment cubemap used for the skybox and as the IBL source.
    ///
    /// `None` skips the skybox draw and shades with the ambient term only.
    pub environment: Option<EnvironmentMap>,

    /// Fallback lighting parameters (see [`LightingDefaults`]).
    pub defaults: LightingDefaults,

    /// Constant ambient light, linear RGB.
    pub ambient_color: Vec3,

    /// Publication policy for frames without a visible directional light.
    pub stale_shadows: StaleShadowPolicy,

    /// Format of the color target handed to `render`.
    pub color_format: wgpu::TextureFormat,

    /// Format of the pipeline-owned depth buffer.
    ///
    /// `Depth32Float` keeps the comparison-sampling path uniform between the
    /// shadow map and the main depth buffer.
    pub depth_format: wgpu::TextureFormat,

    /// Clear color applied before the skybox.
    pub clear_color: wgpu::Color,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            environment: None,
            defaults: LightingDefaults::default(),
            ambient_color: Vec3::splat(0.05),
            stale_shadows: StaleShadowPolicy::default(),
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: wgpu::TextureFormat::Depth32Float,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// InstancerSettings
// ---------------------------------------------------------------------------

/// Configuration for one compute-driven instancing driver.
///
/// | Field         | Description                                  | Default |
/// |---------------|----------------------------------------------|---------|
/// | `count`       | Number of simulated instances                | `128`   |
/// | `seed_radius` | Radius of the initial-position sphere        | `5.0`   |
/// | `seed`        | RNG seed for deterministic initial positions | `7`     |
/// | `base_color`  | Instance base color (linear RGBA)            | white   |
///
/// `count == 0` is legal: the driver allocates nothing, dispatches nothing,
/// and draws nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstancerSettings {
    /// Number of instances driven by the compute kernel.
    pub count: u32,
    /// Initial positions are sampled uniformly inside a sphere of this radius.
    pub seed_radius: f32,
    /// RNG seed for the initial positions.
    pub seed: u64,
    /// Base color of the instanced mesh.
    pub base_color: Vec4,
}

impl Default for InstancerSettings {
    fn default() -> Self {
        Self {
            count: 128,
            seed_radius: 5.0,
            seed: 7,
            base_color: Vec4::ONE,
        }
    }
}
