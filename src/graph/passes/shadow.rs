//! Shadow Pass
//!
//! Owns the single shadow depth target and records the depth-only caster
//! pass. The target is reallocated only when the resolved resolution
//! changes; at most one allocation is live at a time.
//!
//! All lifecycle decisions run through [`ShadowState`], a device-free state
//! machine, so realloc sequences and the stale-retention policy are
//! testable on the CPU. On frames without a directional light nothing is
//! rendered and the previously published matrix is retained bit-identical
//! (or disabled, per [`StaleShadowPolicy`]).

use std::borrow::Cow;

use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::gpu::GpuContext;
use crate::graph::context::{ExecuteContext, PrepareContext};
use crate::graph::light_fit::fit_directional;
use crate::graph::node::RenderNode;
use crate::graph::passes::{ObjectSlab, ObjectUniforms};
use crate::scene::bounds::Aabb;
use crate::scene::mesh::Vertex;
use crate::settings::StaleShadowPolicy;

/// `true` when the live target (if any) cannot serve `requested`.
#[inline]
#[must_use]
pub fn needs_realloc(current: Option<u32>, requested: u32) -> bool {
    current != Some(requested)
}

/// Per-frame decision of the shadow lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowPlan {
    /// Allocate (replacing any live target) at this resolution.
    pub allocate: Option<u32>,
    /// Record the caster pass this frame.
    pub render: bool,
}

/// CPU bookkeeping for the shadow target and the published matrix.
///
/// The GPU pass mirrors every decision made here and adds nothing of its
/// own: `advance` is the complete lifecycle policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowState {
    /// Resolution of the live target, `None` before the first allocation.
    pub resolution: Option<u32>,
    /// Last computed light-space matrix. Identity until a light has been
    /// seen; retained unchanged across lightless frames.
    pub matrix: Mat4,
}

impl ShadowState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolution: None,
            matrix: Mat4::IDENTITY,
        }
    }

    /// Advances one frame.
    ///
    /// With a light: reallocates when the resolution changed, refits the
    /// light frustum to `bounds`, renders. Without: keeps everything as-is
    /// and renders nothing.
    pub fn advance(
        &mut self,
        light_direction: Option<Vec3>,
        bounds: &Aabb,
        requested: u32,
    ) -> ShadowPlan {
        let Some(direction) = light_direction else {
            return ShadowPlan {
                allocate: None,
                render: false,
            };
        };

        let allocate = needs_realloc(self.resolution, requested).then_some(requested);
        if allocate.is_some() {
            self.resolution = Some(requested);
        }
        self.matrix = fit_directional(bounds, direction).matrix();

        ShadowPlan {
            allocate,
            render: true,
        }
    }
}

impl Default for ShadowState {
    fn default() -> Self {
        Self::new()
    }
}

struct ShadowTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl ShadowTarget {
    fn new(gpu: &GpuContext, resolution: u32) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// The depth-only shadow caster node.
pub struct ShadowPass {
    state: ShadowState,
    policy: StaleShadowPolicy,
    target: Option<ShadowTarget>,
    pipeline: wgpu::RenderPipeline,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    slab: ObjectSlab,
    staged: Vec<ObjectUniforms>,
    render: bool,
}

impl ShadowPass {
    #[must_use]
    pub fn new(gpu: &GpuContext, policy: StaleShadowPolicy) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/shadow.wgsl"
            ))),
        });

        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Light Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                },
                count: None,
            }],
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Light Uniforms"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Light BindGroup"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let slab = ObjectSlab::new(gpu, "Shadow Objects");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[Some(&light_layout), Some(slab.layout())],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            // Depth-only: no fragment stage, no color targets.
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        Self {
            state: ShadowState::new(),
            policy,
            target: None,
            pipeline,
            light_buffer,
            light_bind_group,
            slab,
            staged: Vec::new(),
            render: false,
        }
    }

    fn effective_strength(&self, light_visible: bool, resolved: f32) -> f32 {
        if self.target.is_none() {
            return 0.0;
        }
        if light_visible {
            return resolved;
        }
        match self.policy {
            StaleShadowPolicy::Retain => resolved,
            StaleShadowPolicy::Disable => 0.0,
        }
    }
}

impl RenderNode for ShadowPass {
    fn name(&self) -> &'static str {
        "Shadow Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        let requested = ctx.lighting.shadow_map_size.max(1);
        let light_visible = ctx.frame.light.visible;
        let light_direction = light_visible.then_some(ctx.frame.light.direction);

        let plan = self
            .state
            .advance(light_direction, &ctx.frame.scene_bounds, requested);

        if let Some(resolution) = plan.allocate {
            log::debug!("Shadow target realloc: {resolution}x{resolution}");
            self.target = Some(ShadowTarget::new(ctx.gpu, resolution));
        }

        self.render = plan.render;
        if plan.render {
            ctx.gpu
                .queue
                .write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&self.state.matrix));

            self.staged.clear();
            self.staged
                .extend(ctx.frame.shadow_casters.iter().map(|item| ObjectUniforms {
                    model: item.transform,
                    base_color: item.material.base_color,
                    params: Vec4::new(item.material.metallic, item.material.roughness, 0.0, 0.0),
                }));
            self.slab.upload(ctx.gpu, &self.staged);
        }

        ctx.state.light_matrix = self.state.matrix;
        ctx.state.shadow_view = self.target.as_ref().map(|target| target.view.clone());
        ctx.state.shadow_strength =
            self.effective_strength(light_visible, ctx.lighting.shadow_strength);

        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        // Lightless frames leave the retained target untouched. A lit frame
        // with zero casters still clears, so removed casters stop shadowing.
        if !self.render {
            return;
        }
        let Some(target) = &self.target else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.light_bind_group, &[]);

        for (index, item) in ctx.frame.shadow_casters.iter().enumerate() {
            pass.set_bind_group(1, self.slab.bind_group(), &[self.slab.offset(index)]);
            pass.set_vertex_buffer(0, item.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(item.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..item.mesh.index_count, 0, 0..1);
        }
    }

    fn release(&mut self) {
        self.target = None;
        self.state = ShadowState::new();
        self.render = false;
    }
}
