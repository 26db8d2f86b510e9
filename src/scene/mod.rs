//! Scene data model
//!
//! Pure data types consumed by the render pipeline:
//! - [`Scene`]: default container (slot maps of renderers and lights)
//! - [`Renderer`]: mesh + material + transform + world bounds
//! - [`Camera`]: perspective camera with cached matrices
//! - [`DirectionalLight`]: the one light kind the pipeline shades with
//! - [`Material`] / [`Aabb`] / [`Mesh`]: leaf components

pub mod bounds;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod world;

pub use bounds::Aabb;
pub use camera::Camera;
pub use light::{DirectionalLight, DirectionalLightState};
pub use material::{LightingOverrides, Material, MaterialCaps, RenderQueue};
pub use mesh::{Mesh, Vertex};
pub use world::{Renderer, Scene, SceneView};

use slotmap::new_key_type;

new_key_type! {
    pub struct RendererKey;
    pub struct LightKey;
}
