//! Render Passes
//!
//! The graph's node implementations plus the per-object uniform plumbing
//! they share:
//!
//! - [`ShadowPass`]: shadow target lifecycle + depth-only caster pass
//! - [`ForwardPass`]: clear, skybox, opaque and transparent queues
//! - [`InstancingNode`]: compute-driven instance simulation + instanced draw

pub mod forward;
pub mod instancing;
pub mod shadow;

pub use forward::ForwardPass;
pub use instancing::InstancingNode;
pub use shadow::ShadowPass;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::gpu::GpuContext;

/// Per-draw uniforms, bound with a dynamic offset.
///
/// One layout serves both the shadow and forward pipelines; the shadow
/// vertex stage only reads `model`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    /// Object-to-world matrix.
    pub model: Mat4,
    /// Material base color (linear RGBA).
    pub base_color: Vec4,
    /// x = metallic, y = roughness, z and w unused.
    pub params: Vec4,
}

/// A growable dynamic-offset uniform buffer of [`ObjectUniforms`].
///
/// Each pass owns one and restages it every frame; the bind group is
/// rebuilt only when the buffer grows.
pub(crate) struct ObjectSlab {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u32,
    stride: u32,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    staging: Vec<u8>,
}

impl ObjectSlab {
    const INITIAL_CAPACITY: u32 = 64;

    pub fn new(gpu: &GpuContext, label: &'static str) -> Self {
        let min_alignment = gpu.device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(std::mem::size_of::<ObjectUniforms>() as u32, min_alignment);

        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ObjectUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let buffer = Self::create_buffer(gpu, label, stride, Self::INITIAL_CAPACITY);
        let bind_group = Self::create_bind_group(gpu, label, &layout, &buffer);

        Self {
            label,
            buffer,
            capacity: Self::INITIAL_CAPACITY,
            stride,
            layout,
            bind_group,
            staging: Vec::new(),
        }
    }

    fn create_buffer(
        gpu: &GpuContext,
        label: &str,
        stride: u32,
        capacity: u32,
    ) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        gpu: &GpuContext,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        })
    }

    /// Stages and uploads the frame's object uniforms, growing the buffer
    /// (doubling) when `items` outgrows the current capacity.
    pub fn upload(&mut self, gpu: &GpuContext, items: &[ObjectUniforms]) {
        if items.is_empty() {
            return;
        }

        let required = items.len() as u32;
        if required > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < required {
                capacity = capacity.saturating_mul(2);
            }
            log::debug!("{}: growing to {capacity} objects", self.label);
            self.buffer = Self::create_buffer(gpu, self.label, self.stride, capacity);
            self.bind_group = Self::create_bind_group(gpu, self.label, &self.layout, &self.buffer);
            self.capacity = capacity;
        }

        self.staging.clear();
        self.staging.resize(self.stride as usize * items.len(), 0);
        for (index, item) in items.iter().enumerate() {
            let offset = index * self.stride as usize;
            let bytes = bytemuck::bytes_of(item);
            self.staging[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        gpu.queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    /// Dynamic offset of the `index`-th staged object.
    #[inline]
    pub fn offset(&self, index: usize) -> u32 {
        index as u32 * self.stride
    }

    #[inline]
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    ((value + alignment - 1) / alignment) * alignment
}
