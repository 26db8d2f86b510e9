//! Frame Extraction
//!
//! One walk over the scene per frame produces everything the later passes
//! need: camera-culled draw lists, the shadow caster list, the scene bounds
//! aggregate, the lighting override source, and the directional light state.
//! After extraction the scene borrow is released; no pass rescans the scene.
//!
//! The walk visits each renderer exactly once. Bounds aggregation and
//! override selection run before the frustum test, so casters behind the
//! camera still grow the shadow fit and an off-screen override material
//! still resolves.

use glam::{Mat4, Vec3};

use crate::graph::frustum::Frustum;
use crate::scene::bounds::Aabb;
use crate::scene::light::DirectionalLightState;
use crate::scene::material::{LightingOverrides, Material, RenderQueue};
use crate::scene::mesh::Mesh;
use crate::scene::world::SceneView;

/// Draw sort key: pipeline id in the high bits, depth in the low bits.
///
/// Ascending order walks front-to-back within a pipeline; the transparent
/// queue sorts descending for back-to-front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderKey(u64);

impl RenderKey {
    #[must_use]
    pub fn new(pipeline_id: u16, depth: f32) -> Self {
        let p_bits = u64::from(pipeline_id) << 32;
        // Non-negative f32 bit patterns order like the values themselves.
        let d_bits = if depth.is_sign_negative() {
            0
        } else {
            u64::from(depth.to_bits())
        };
        Self(p_bits | d_bits)
    }
}

/// A draw captured from one renderer.
///
/// Cloning shares the mesh's GPU buffers; the material rides along by value
/// so uniform upload needs no scene lookup.
#[derive(Clone)]
pub struct DrawItem {
    pub mesh: Mesh,
    pub material: Material,
    pub transform: Mat4,
    /// Squared distance from the camera to the bounds center, for sorting.
    pub distance_sq: f32,
}

/// Per-frame snapshot of the scene, detached from the scene borrow.
pub struct ExtractedFrame {
    /// Camera-visible opaque draws.
    pub opaque: Vec<DrawItem>,
    /// Camera-visible transparent draws.
    pub transparent: Vec<DrawItem>,
    /// Opaque shadow casters from the whole scene. Not camera-culled:
    /// off-screen casters still shadow what is on screen.
    pub shadow_casters: Vec<DrawItem>,
    /// Union of world bounds over all active renderers.
    /// [`Aabb::EMPTY`] when the scene has none.
    pub scene_bounds: Aabb,
    /// Lighting overrides of the first capable material in walk order.
    pub overrides: Option<LightingOverrides>,
    /// First visible directional light, or the unlit fallback.
    pub light: DirectionalLightState,
}

impl ExtractedFrame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            opaque: Vec::new(),
            transparent: Vec::new(),
            shadow_casters: Vec::new(),
            scene_bounds: Aabb::EMPTY,
            overrides: None,
            light: DirectionalLightState::UNLIT,
        }
    }

    /// Resets per-frame state while keeping list allocations.
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.shadow_casters.clear();
        self.scene_bounds = Aabb::EMPTY;
        self.overrides = None;
        self.light = DirectionalLightState::UNLIT;
    }

    /// Runs the frame's single scene walk.
    ///
    /// Reuses this instance's memory, so a persistent `ExtractedFrame`
    /// allocates only when a list outgrows its previous capacity.
    pub fn extract_into(
        &mut self,
        scene: &impl SceneView,
        frustum: &Frustum,
        camera_position: Vec3,
    ) {
        self.clear();

        for renderer in scene.renderers() {
            if !renderer.visible {
                continue;
            }

            if self.overrides.is_none() {
                self.overrides = renderer.material.lighting_overrides().copied();
            }

            self.scene_bounds = self.scene_bounds.union(&renderer.world_bounds);

            let (center, radius) = renderer.world_bounds.bounding_sphere();
            let item = DrawItem {
                mesh: renderer.mesh.clone(),
                material: renderer.material.clone(),
                transform: renderer.transform,
                distance_sq: camera_position.distance_squared(center),
            };

            if item.material.casts_shadows() {
                self.shadow_casters.push(item.clone());
            }

            if !frustum.intersects_sphere(center, radius) {
                continue;
            }

            match item.material.queue {
                RenderQueue::Opaque => self.opaque.push(item),
                RenderQueue::Transparent => self.transparent.push(item),
            }
        }

        self.light = scene
            .lights()
            .find(|light| light.visible)
            .map_or(DirectionalLightState::UNLIT, DirectionalLightState::from_light);
    }

    /// Number of camera-visible draws across both queues.
    #[inline]
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}

impl Default for ExtractedFrame {
    fn default() -> Self {
        Self::new()
    }
}
