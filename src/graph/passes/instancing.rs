//! Compute-Driven Instancing
//!
//! A self-contained driver node: a compute kernel advances a buffer of
//! instance positions every frame, the frame synchronously reads the buffer
//! back, rebuilds translation-only transforms on the host, and records one
//! instanced draw of a cube into the forward target.
//!
//! The driver is a three-state machine: Uninitialized until the first
//! prepare, Running while it owns GPU buffers, Released after teardown.
//! Release is idempotent and a released driver never dispatches or draws.
//!
//! The readback blocks the frame until the GPU has produced results; there
//! is no double-buffering, each frame pays the full round-trip serially.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use wgpu::util::DeviceExt;

use crate::errors::{Result, UmbraError};
use crate::gpu::GpuContext;
use crate::graph::context::{ExecuteContext, PrepareContext};
use crate::graph::node::RenderNode;
use crate::graph::passes::{ObjectSlab, ObjectUniforms};
use crate::scene::material::Material;
use crate::scene::mesh::{Mesh, Vertex};
use crate::settings::InstancerSettings;

/// Workgroup width shared by the dispatch computation and the kernel.
///
/// The kernel declares its group size through [`kernel_source`], so the two
/// sides cannot drift apart; a mismatch here would silently desync positions.
pub const SIM_WORKGROUP_SIZE: u32 = 64;

/// Bytes per simulated position: three tightly packed `f32`s.
pub const POSITION_STRIDE: u64 = 12;

const WORKGROUP_SIZE_TOKEN: &str = "{{WORKGROUP_SIZE}}";
const KERNEL_TEMPLATE: &str = include_str!("../../shaders/instance_motion.wgsl");

// ─── Pure Helpers ────────────────────────────────────────────────────────────

/// Number of workgroups covering `count` instances.
#[inline]
#[must_use]
pub fn dispatch_group_count(count: u32) -> u32 {
    count.div_ceil(SIM_WORKGROUP_SIZE)
}

/// Expands the kernel template, substituting the shared workgroup width.
///
/// Fails when the template lost its substitution placeholder; compiling the
/// raw template would declare a group size unrelated to the dispatch math.
pub fn kernel_source() -> Result<String> {
    if !KERNEL_TEMPLATE.contains(WORKGROUP_SIZE_TOKEN) {
        return Err(UmbraError::KernelSourceInvalid(format!(
            "instance_motion.wgsl is missing the {WORKGROUP_SIZE_TOKEN} placeholder"
        )));
    }
    Ok(KERNEL_TEMPLATE.replace(WORKGROUP_SIZE_TOKEN, &SIM_WORKGROUP_SIZE.to_string()))
}

/// Samples `count` points uniformly inside a sphere of the given radius.
///
/// Deterministic for a given seed. A non-positive radius collapses every
/// point onto the origin.
#[must_use]
pub fn seed_positions(count: u32, radius: f32, seed: u64) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(count as usize);
    if radius <= 0.0 {
        positions.resize(count as usize, Vec3::ZERO);
        return positions;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    while positions.len() < count as usize {
        let candidate = Vec3::new(
            rng.random_range(-radius..radius),
            rng.random_range(-radius..radius),
            rng.random_range(-radius..radius),
        );
        // Rejection sampling keeps the distribution uniform in the sphere.
        if candidate.length_squared() <= radius * radius {
            positions.push(candidate);
        }
    }
    positions
}

/// Flattens positions into the tightly packed 12-byte-stride buffer layout.
#[must_use]
pub fn pack_positions(positions: &[Vec3]) -> Vec<f32> {
    let mut packed = Vec::with_capacity(positions.len() * 3);
    for position in positions {
        packed.extend_from_slice(&[position.x, position.y, position.z]);
    }
    packed
}

/// Rebuilds translation-only transforms from a packed position readback.
///
/// Element `i` of the readback drives instance `i`; order is preserved.
pub fn rebuild_matrices(packed: &[f32], out: &mut Vec<Mat4>) {
    out.clear();
    out.extend(
        packed
            .chunks_exact(3)
            .map(|p| Mat4::from_translation(Vec3::new(p[0], p[1], p[2]))),
    );
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Kernel parameters, mirrored by `SimParams` in the WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SimUniforms {
    time: f32,
    count: u32,
    _padding: [u32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Uninitialized,
    Running,
    Released,
}

/// GPU resources owned while the driver is running with a non-zero count.
struct SimResources {
    positions: wgpu::Buffer,
    staging: wgpu::Buffer,
    sim_uniforms: wgpu::Buffer,
    sim_bind_group: wgpu::BindGroup,
    compute_pipeline: wgpu::ComputePipeline,
    instances: wgpu::Buffer,
    mesh: Mesh,
}

/// Instance matrix as four `vec4` vertex attributes after position/normal.
const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Mat4>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ],
};

/// Graph node driving the simulated instances.
pub struct InstancingNode {
    settings: InstancerSettings,
    state: DriverState,
    shader: wgpu::ShaderModule,
    resources: Option<SimResources>,
    render_pipeline: Option<wgpu::RenderPipeline>,
    slab: ObjectSlab,
    readback: Vec<f32>,
    matrices: Vec<Mat4>,
}

impl InstancingNode {
    #[must_use]
    pub fn new(gpu: &GpuContext, settings: InstancerSettings) -> Self {
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Instanced Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "../../shaders/instanced.wgsl"
                ))),
            });

        // The instanced mesh shades with one fixed parameter block; stage it
        // once, the slab contents never change.
        let material = Material {
            base_color: settings.base_color,
            ..Material::default()
        };
        let mut slab = ObjectSlab::new(gpu, "Instancer Objects");
        slab.upload(
            gpu,
            &[ObjectUniforms {
                model: Mat4::IDENTITY,
                base_color: material.base_color,
                params: Vec4::new(material.metallic, material.roughness, 0.0, 0.0),
            }],
        );

        Self {
            settings,
            state: DriverState::Uninitialized,
            shader,
            resources: None,
            render_pipeline: None,
            slab,
            readback: Vec::new(),
            matrices: Vec::new(),
        }
    }

    /// Uninitialized → Running: seed positions, create the GPU buffers and
    /// the compute pipeline. A zero count creates nothing.
    fn start(&mut self, gpu: &GpuContext) -> Result<()> {
        self.state = DriverState::Running;

        let count = self.settings.count;
        if count == 0 {
            log::warn!("Instancing driver: count is 0, nothing will be simulated or drawn");
            return Ok(());
        }

        let device = &gpu.device;

        let source = kernel_source()?;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Instance Motion Kernel"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
        });

        let seeds = seed_positions(count, self.settings.seed_radius, self.settings.seed);
        let packed = pack_positions(&seeds);
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Positions"),
            contents: bytemuck::cast_slice(&packed),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        });

        let byte_len = u64::from(count) * POSITION_STRIDE;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Readback"),
            size: byte_len,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sim_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim Uniforms"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sim_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sim Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SimUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let sim_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sim BindGroup"),
            layout: &sim_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: positions.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sim_uniforms.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sim Pipeline Layout"),
            bind_group_layouts: &[Some(&sim_layout)],
            immediate_size: 0,
        });
        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Instance Motion Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Matrices"),
            size: u64::from(count) * std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mesh = Mesh::cube(gpu);

        self.resources = Some(SimResources {
            positions,
            staging,
            sim_uniforms,
            sim_bind_group,
            compute_pipeline,
            instances,
            mesh,
        });

        log::info!(
            "Instancing driver started: {count} instances in a radius-{} sphere",
            self.settings.seed_radius
        );
        Ok(())
    }

    /// The instanced pipeline reuses the frame bind group published by the
    /// forward pass, so it is created lazily once that layout exists.
    fn ensure_render_pipeline(&mut self, ctx: &PrepareContext) {
        if self.render_pipeline.is_some() {
            return;
        }
        let Some(bindings) = &ctx.state.frame_bindings else {
            return;
        };

        let pipeline_layout =
            ctx.gpu
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Instanced Pipeline Layout"),
                    bind_group_layouts: &[Some(&bindings.layout), Some(self.slab.layout())],
                    immediate_size: 0,
                });

        let pipeline = ctx
            .gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Instanced Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::LAYOUT, INSTANCE_LAYOUT],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: ctx.depth_format,
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

        log::debug!("Instanced pipeline compiled: {:?}", ctx.color_format);
        self.render_pipeline = Some(pipeline);
    }

    /// One simulation step: dispatch, copy out, synchronous readback,
    /// transform rebuild, instance buffer upload.
    fn step(&mut self, ctx: &PrepareContext) -> Result<()> {
        let Some(resources) = &self.resources else {
            return Ok(());
        };

        let count = self.settings.count;
        let byte_len = u64::from(count) * POSITION_STRIDE;

        let uniforms = SimUniforms {
            time: ctx.time,
            count,
            _padding: [0; 2],
        };
        ctx.gpu
            .queue
            .write_buffer(&resources.sim_uniforms, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = ctx
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Instance Sim Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Instance Motion Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&resources.compute_pipeline);
            pass.set_bind_group(0, &resources.sim_bind_group, &[]);
            pass.dispatch_workgroups(dispatch_group_count(count), 1, 1);
        }
        encoder.copy_buffer_to_buffer(&resources.positions, 0, &resources.staging, 0, byte_len);
        ctx.gpu.queue.submit(std::iter::once(encoder.finish()));

        // Synchronous readback: block until the copy has landed.
        let slice = resources.staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = ctx.gpu.device.poll(wgpu::PollType::wait_indefinitely());
        receiver
            .recv()
            .map_err(|_| UmbraError::ReadbackFailed("map callback never ran".into()))?
            .map_err(|e| UmbraError::ReadbackFailed(e.to_string()))?;

        let actual = {
            let data = slice.get_mapped_range();
            self.readback.clear();
            if data.len() as u64 == byte_len {
                self.readback.extend_from_slice(bytemuck::cast_slice(&data[..]));
            }
            data.len() as u64
        };
        resources.staging.unmap();
        if actual != byte_len {
            return Err(UmbraError::BufferSizeMismatch {
                expected: byte_len,
                actual,
            });
        }

        rebuild_matrices(&self.readback, &mut self.matrices);
        ctx.gpu.queue.write_buffer(
            &resources.instances,
            0,
            bytemuck::cast_slice(&self.matrices),
        );

        Ok(())
    }
}

impl RenderNode for InstancingNode {
    fn name(&self) -> &'static str {
        "Instancing Driver"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        match self.state {
            DriverState::Released => return Ok(()),
            DriverState::Uninitialized => self.start(ctx.gpu)?,
            DriverState::Running => {}
        }
        if self.resources.is_none() {
            return Ok(());
        }
        self.ensure_render_pipeline(ctx);
        self.step(ctx)
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if self.state != DriverState::Running {
            return;
        }
        let Some(resources) = &self.resources else {
            return;
        };
        let Some(pipeline) = &self.render_pipeline else {
            return;
        };
        let Some(bindings) = &ctx.state.frame_bindings else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Instanced Draw Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.target,
                depth_slice: None,
                resolve_target: None,
                // Composites over the forward output.
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bindings.bind_group, &[]);
        pass.set_bind_group(1, self.slab.bind_group(), &[self.slab.offset(0)]);
        pass.set_vertex_buffer(0, resources.mesh.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, resources.instances.slice(..));
        pass.set_index_buffer(resources.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..resources.mesh.index_count, 0, 0..self.settings.count);
    }

    fn release(&mut self) {
        if self.resources.take().is_some() {
            log::debug!("Instancing driver: GPU buffers released");
        }
        self.render_pipeline = None;
        self.state = DriverState::Released;
    }
}
