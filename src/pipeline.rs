//! Forward Pipeline
//!
//! The per-frame entry point. `render` runs the frame in a fixed sequence:
//!
//! 1. Derive the culling frustum from the camera; a degenerate matrix skips
//!    the camera for the frame.
//! 2. Extract the scene into the frame snapshot (one walk: cull, bounds,
//!    override pick, light).
//! 3. Resolve the lighting parameters against the configured defaults.
//! 4. Run every graph node's prepare phase in order, publishing cross-pass
//!    state through the frame-scoped [`FrameState`].
//! 5. Encode every node into one command encoder and submit once.
//!
//! Node order in the graph is the only dependency mechanism: shadow state
//! must be published before the forward pass consumes it, and the forward
//! pass publishes the frame bindings the instancing node draws with.

use crate::errors::Result;
use crate::gpu::GpuContext;
use crate::graph::context::{ExecuteContext, FrameState, PrepareContext, ViewData};
use crate::graph::extracted::ExtractedFrame;
use crate::graph::frustum::Frustum;
use crate::graph::graph::RenderGraph;
use crate::graph::passes::{ForwardPass, InstancingNode, ShadowPass};
use crate::graph::resolve::LightingParameters;
use crate::scene::camera::Camera;
use crate::scene::world::SceneView;
use crate::settings::{InstancerSettings, PipelineSettings};

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthTarget {
    fn new(gpu: &GpuContext, format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Forward Depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
            size,
        }
    }
}

/// The forward renderer: culling, shadow pass, main pass, optional
/// compute-driven instancing.
pub struct ForwardPipeline {
    settings: PipelineSettings,
    graph: RenderGraph,
    extracted: ExtractedFrame,
    state: FrameState,
    depth: Option<DepthTarget>,
}

impl ForwardPipeline {
    #[must_use]
    pub fn new(gpu: &GpuContext, settings: PipelineSettings) -> Self {
        let graph = RenderGraph::new()
            .with_node(Box::new(ShadowPass::new(gpu, settings.stale_shadows)))
            .with_node(Box::new(ForwardPass::new(gpu)));

        Self {
            settings,
            graph,
            extracted: ExtractedFrame::new(),
            state: FrameState::new(),
            depth: None,
        }
    }

    /// Appends a compute-driven instancing node.
    ///
    /// The node draws into the forward target after the main pass, reusing
    /// its frame bindings, so it must come after the forward pass; appending
    /// keeps that ordering.
    pub fn add_instancer(&mut self, gpu: &GpuContext, settings: InstancerSettings) {
        self.graph.add_node(Box::new(InstancingNode::new(gpu, settings)));
    }

    /// Renders one frame into `target`.
    ///
    /// `size` is the target's pixel size; the pipeline keeps a matching
    /// depth buffer and recreates it only when the size changes. `time` is
    /// elapsed seconds, fed to the simulation kernel and the shaders.
    ///
    /// A camera whose view-projection cannot produce a valid frustum skips
    /// the frame with a warning instead of drawing partially.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        scene: &impl SceneView,
        camera: &Camera,
        target: &wgpu::TextureView,
        size: (u32, u32),
        time: f32,
    ) -> Result<()> {
        if size.0 == 0 || size.1 == 0 {
            log::warn!("Skipping render into a zero-sized target");
            return Ok(());
        }

        let view_proj = camera.view_projection_matrix();
        let Some(frustum) = Frustum::from_view_proj(view_proj) else {
            log::warn!("Skipping camera with a degenerate view-projection matrix");
            return Ok(());
        };

        self.extracted
            .extract_into(scene, &frustum, camera.position());
        let lighting =
            LightingParameters::resolve(self.extracted.overrides.as_ref(), &self.settings.defaults);

        if self.depth.as_ref().is_none_or(|depth| depth.size != size) {
            self.depth = Some(DepthTarget::new(gpu, self.settings.depth_format, size));
            log::debug!("Depth target realloc: {}x{}", size.0, size.1);
        }

        self.state.reset();

        let mut prepare = PrepareContext {
            gpu,
            frame: &self.extracted,
            view: ViewData {
                view_proj,
                position: camera.position(),
            },
            lighting,
            ambient: self.settings.ambient_color,
            time,
            target_size: size,
            color_format: self.settings.color_format,
            depth_format: self.settings.depth_format,
            environment: self.settings.environment.as_ref(),
            state: &mut self.state,
        };
        self.graph.prepare(&mut prepare)?;

        let Some(depth) = self.depth.as_ref() else {
            return Ok(());
        };
        let execute = ExecuteContext {
            gpu,
            frame: &self.extracted,
            target,
            depth: &depth.view,
            state: &self.state,
            clear_color: self.settings.clear_color,
        };
        self.graph.execute(&execute);

        Ok(())
    }

    /// Tears down per-node GPU state and the depth buffer.
    ///
    /// Idempotent. Passes that allocate lazily come back on the next
    /// `render`; the instancing driver stays released.
    pub fn release(&mut self) {
        self.graph.release();
        self.depth = None;
        self.state.reset();
    }

    /// The settings this pipeline was built with.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}
