//! Scene container
//!
//! [`Scene`] is a pure data layer: renderable objects and lights in slot maps,
//! plus the active camera. The render pipeline never touches it directly; it
//! consumes any [`SceneView`], so hosts with their own scene representation
//! can feed the pipeline without converting into this container.

use glam::Mat4;
use slotmap::SlotMap;

use crate::scene::bounds::Aabb;
use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::{LightKey, RendererKey};

/// A renderable object: a mesh instance with a material and a world transform.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Mesh to draw. Cloning shares the underlying GPU buffers.
    pub mesh: Mesh,
    /// Surface appearance and queue assignment.
    pub material: Material,
    /// Object-to-world transform.
    pub transform: Mat4,
    /// World-space bounds used for culling and shadow fitting.
    pub world_bounds: Aabb,
    /// Invisible renderers are skipped by every pass.
    pub visible: bool,
}

impl Renderer {
    /// Creates a visible renderer, deriving world bounds by transforming
    /// `local_bounds` through `transform`.
    #[must_use]
    pub fn new(mesh: Mesh, material: Material, transform: Mat4, local_bounds: Aabb) -> Self {
        let world_bounds = local_bounds.transformed(transform);
        Self {
            mesh,
            material,
            transform,
            world_bounds,
            visible: true,
        }
    }

    /// Updates the transform and recomputes world bounds from `local_bounds`.
    pub fn set_transform(&mut self, transform: Mat4, local_bounds: Aabb) {
        self.transform = transform;
        self.world_bounds = local_bounds.transformed(transform);
    }
}

/// Read access to the renderables and lights the pipeline draws.
///
/// The pipeline walks these iterators exactly once per frame, so implementors
/// do not need to cache or deduplicate anything.
pub trait SceneView {
    /// All renderable objects, visible or not.
    fn renderers(&self) -> impl Iterator<Item = &Renderer>;

    /// All directional lights, enabled or not.
    fn lights(&self) -> impl Iterator<Item = &DirectionalLight>;
}

/// Default scene container backed by slot maps.
pub struct Scene {
    /// Renderable objects.
    pub renderers: SlotMap<RendererKey, Renderer>,
    /// Directional lights. The pipeline uses the first visible one.
    pub lights: SlotMap<LightKey, DirectionalLight>,
    /// Camera the pipeline renders from.
    pub camera: Camera,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderers: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            camera: Camera::default(),
        }
    }

    /// Adds a renderer and returns its key.
    pub fn add_renderer(&mut self, renderer: Renderer) -> RendererKey {
        self.renderers.insert(renderer)
    }

    /// Adds a directional light and returns its key.
    pub fn add_light(&mut self, light: DirectionalLight) -> LightKey {
        self.lights.insert(light)
    }
}

impl SceneView for Scene {
    fn renderers(&self) -> impl Iterator<Item = &Renderer> {
        self.renderers.values()
    }

    fn lights(&self) -> impl Iterator<Item = &DirectionalLight> {
        self.lights.values()
    }
}
