//! Forward Pass
//!
//! One render pass over the caller's color target: clear, skybox, opaque
//! queue front-to-back, transparent queue back-to-front. Also builds the
//! frame bind group (camera, light, shadow map, environment) and publishes
//! it for later nodes drawing into the same target.
//!
//! Pipelines are cached per (queue, color format, depth format); the cache
//! hands out sequential ids that feed the draw sort keys.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::environment::EnvironmentMap;
use crate::errors::Result;
use crate::gpu::GpuContext;
use crate::graph::context::{ExecuteContext, PrepareContext, PreparedFrameBindings};
use crate::graph::extracted::{DrawItem, RenderKey};
use crate::graph::node::RenderNode;
use crate::graph::passes::{ObjectSlab, ObjectUniforms};
use crate::scene::material::RenderQueue;
use crate::scene::mesh::Vertex;

/// Per-frame uniforms shared by every draw in the forward target.
///
/// Scalar fields pair with `Vec3`s to fill 16-byte slots; the WGSL mirror
/// must match field-for-field.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniforms {
    view_projection: Mat4,
    view_projection_inverse: Mat4,
    light_matrix: Mat4,
    camera_position: Vec3,
    time: f32,
    light_direction: Vec3,
    shadow_strength: f32,
    light_color: Vec3,
    shadow_bias: f32,
    ambient: Vec3,
    ibl_intensity: f32,
    anisotropy: f32,
    _padding: [f32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ForwardPipelineKey {
    queue: RenderQueue,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
}

/// A sorted, slab-indexed draw ready for recording.
struct DrawCommand {
    item: DrawItem,
    key: RenderKey,
    slab_index: usize,
}

/// The main compositor node.
pub struct ForwardPass {
    shader: wgpu::ShaderModule,
    skybox_shader: wgpu::ShaderModule,
    frame_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    shadow_sampler: wgpu::Sampler,
    env_sampler: wgpu::Sampler,
    /// Black 1x1 cube bound as the IBL source when no environment is set.
    placeholder_env: EnvironmentMap,
    /// 1x1 depth texture bound until the shadow pass allocates a target.
    placeholder_shadow: wgpu::TextureView,
    pipelines: FxHashMap<ForwardPipelineKey, (wgpu::RenderPipeline, u16)>,
    next_pipeline_id: u16,
    skybox_pipeline: Option<wgpu::RenderPipeline>,
    current_opaque: Option<wgpu::RenderPipeline>,
    current_transparent: Option<wgpu::RenderPipeline>,
    slab: ObjectSlab,
    staged: Vec<ObjectUniforms>,
    opaque_commands: Vec<DrawCommand>,
    transparent_commands: Vec<DrawCommand>,
    draw_skybox: bool,
}

impl ForwardPass {
    #[must_use]
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/forward.wgsl"
            ))),
        });
        let skybox_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/skybox.wgsl"
            ))),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FrameUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let placeholder_env = EnvironmentMap::solid_color(gpu, [0, 0, 0, 255]);

        let placeholder_shadow = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Shadow Placeholder"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Depth32Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());

        let slab = ObjectSlab::new(gpu, "Forward Objects");

        Self {
            shader,
            skybox_shader,
            frame_layout,
            frame_buffer,
            shadow_sampler,
            env_sampler,
            placeholder_env,
            placeholder_shadow,
            pipelines: FxHashMap::default(),
            next_pipeline_id: 0,
            skybox_pipeline: None,
            current_opaque: None,
            current_transparent: None,
            slab,
            staged: Vec::new(),
            opaque_commands: Vec::new(),
            transparent_commands: Vec::new(),
            draw_skybox: false,
        }
    }

    fn pipeline_for(
        &mut self,
        gpu: &GpuContext,
        queue: RenderQueue,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, u16) {
        let key = ForwardPipelineKey {
            queue,
            color_format,
            depth_format,
        };
        if let Some((pipeline, id)) = self.pipelines.get(&key) {
            return (pipeline.clone(), *id);
        }

        let transparent = queue == RenderQueue::Transparent;

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Forward Pipeline Layout"),
                bind_group_layouts: &[Some(&self.frame_layout), Some(self.slab.layout())],
                immediate_size: 0,
            });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("Forward Pipeline ({queue:?})")),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::LAYOUT],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(if transparent {
                            wgpu::BlendState::ALPHA_BLENDING
                        } else {
                            wgpu::BlendState::REPLACE
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: if transparent {
                        None
                    } else {
                        Some(wgpu::Face::Back)
                    },
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    // Transparent surfaces test but never write depth.
                    depth_write_enabled: Some(!transparent),
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

        log::debug!("Forward pipeline compiled: {queue:?} / {color_format:?}");

        let id = self.next_pipeline_id;
        self.next_pipeline_id += 1;
        self.pipelines.insert(key, (pipeline.clone(), id));
        (pipeline, id)
    }

    fn skybox_pipeline_for(
        &mut self,
        gpu: &GpuContext,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        if let Some(pipeline) = &self.skybox_pipeline {
            return pipeline.clone();
        }

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Skybox Pipeline Layout"),
                bind_group_layouts: &[Some(&self.frame_layout)],
                immediate_size: 0,
            });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Skybox Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.skybox_shader,
                    entry_point: Some("vs_main"),
                    // Fullscreen triangle, no vertex buffers.
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.skybox_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    // The skybox sits on the far plane (z = 1) and never
                    // writes depth; LessEqual lets it pass against the clear.
                    depth_write_enabled: Some(false),
                    depth_compare: Some(wgpu::CompareFunction::LessEqual),
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

        log::debug!("Skybox pipeline compiled: {color_format:?}");

        self.skybox_pipeline = Some(pipeline.clone());
        pipeline
    }
}

impl RenderNode for ForwardPass {
    fn name(&self) -> &'static str {
        "Forward Pass"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        let uniforms = FrameUniforms {
            view_projection: ctx.view.view_proj,
            view_projection_inverse: ctx.view.view_proj.inverse(),
            light_matrix: ctx.state.light_matrix,
            camera_position: ctx.view.position,
            time: ctx.time,
            light_direction: ctx.frame.light.direction,
            shadow_strength: ctx.state.shadow_strength,
            light_color: ctx.frame.light.color,
            shadow_bias: ctx.lighting.shadow_bias,
            ambient: ctx.ambient,
            ibl_intensity: ctx.lighting.ibl_intensity,
            anisotropy: ctx.lighting.anisotropy,
            _padding: [0.0; 3],
        };
        ctx.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));

        let shadow_view = ctx
            .state
            .shadow_view
            .clone()
            .unwrap_or_else(|| self.placeholder_shadow.clone());
        let env_view = ctx
            .environment
            .map_or(&self.placeholder_env.view, |env| &env.view);
        self.draw_skybox = ctx.environment.is_some();

        let bind_group = ctx.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BindGroup"),
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.shadow_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(env_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.env_sampler),
                },
            ],
        });
        ctx.state.frame_bindings = Some(PreparedFrameBindings {
            layout: self.frame_layout.clone(),
            bind_group,
        });

        let (opaque_pipeline, opaque_id) = self.pipeline_for(
            ctx.gpu,
            RenderQueue::Opaque,
            ctx.color_format,
            ctx.depth_format,
        );
        let (transparent_pipeline, transparent_id) = self.pipeline_for(
            ctx.gpu,
            RenderQueue::Transparent,
            ctx.color_format,
            ctx.depth_format,
        );
        self.current_opaque = Some(opaque_pipeline);
        self.current_transparent = Some(transparent_pipeline);
        if self.draw_skybox {
            self.skybox_pipeline_for(ctx.gpu, ctx.color_format, ctx.depth_format);
        }

        self.opaque_commands.clear();
        for item in &ctx.frame.opaque {
            self.opaque_commands.push(DrawCommand {
                key: RenderKey::new(opaque_id, item.distance_sq),
                item: item.clone(),
                slab_index: 0,
            });
        }
        self.opaque_commands
            .sort_unstable_by(|a, b| a.key.cmp(&b.key));

        self.transparent_commands.clear();
        for item in &ctx.frame.transparent {
            self.transparent_commands.push(DrawCommand {
                key: RenderKey::new(transparent_id, item.distance_sq),
                item: item.clone(),
                slab_index: 0,
            });
        }
        self.transparent_commands
            .sort_unstable_by(|a, b| b.key.cmp(&a.key));

        self.staged.clear();
        for command in self
            .opaque_commands
            .iter_mut()
            .chain(self.transparent_commands.iter_mut())
        {
            command.slab_index = self.staged.len();
            self.staged.push(ObjectUniforms {
                model: command.item.transform,
                base_color: command.item.material.base_color,
                params: Vec4::new(
                    command.item.material.metallic,
                    command.item.material.roughness,
                    0.0,
                    0.0,
                ),
            });
        }
        self.slab.upload(ctx.gpu, &self.staged);

        Ok(())
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(bindings) = &ctx.state.frame_bindings else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth,
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

        pass.set_bind_group(0, &bindings.bind_group, &[]);

        if self.draw_skybox {
            if let Some(skybox) = &self.skybox_pipeline {
                pass.set_pipeline(skybox);
                pass.draw(0..3, 0..1);
            }
        }

        if let Some(pipeline) = &self.current_opaque {
            if !self.opaque_commands.is_empty() {
                pass.set_pipeline(pipeline);
                for command in &self.opaque_commands {
                    pass.set_bind_group(
                        1,
                        self.slab.bind_group(),
                        &[self.slab.offset(command.slab_index)],
                    );
                    pass.set_vertex_buffer(0, command.item.mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(
                        command.item.mesh.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..command.item.mesh.index_count, 0, 0..1);
                }
            }
        }

        if let Some(pipeline) = &self.current_transparent {
            if !self.transparent_commands.is_empty() {
                pass.set_pipeline(pipeline);
                for command in &self.transparent_commands {
                    pass.set_bind_group(
                        1,
                        self.slab.bind_group(),
                        &[self.slab.offset(command.slab_index)],
                    );
                    pass.set_vertex_buffer(0, command.item.mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(
                        command.item.mesh.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..command.item.mesh.index_count, 0, 0..1);
                }
            }
        }
    }

    fn release(&mut self) {
        self.pipelines.clear();
        self.next_pipeline_id = 0;
        self.skybox_pipeline = None;
        self.current_opaque = None;
        self.current_transparent = None;
        self.opaque_commands.clear();
        self.transparent_commands.clear();
        self.draw_skybox = false;
    }
}
