//! GPU Meshes
//!
//! A [`Mesh`] owns its vertex and index buffers. wgpu resources are
//! internally reference-counted, so cloning a mesh into per-frame draw lists
//! is a handle copy, not a data copy.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::gpu::GpuContext;

/// Interleaved vertex: position + normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal, unit length.
    pub normal: [f32; 3],
}

impl Vertex {
    /// Vertex buffer layout matching the forward and shadow shaders.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

/// An indexed triangle mesh resident on the GPU.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Interleaved vertex buffer ([`Vertex`] layout).
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` index buffer.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl Mesh {
    /// Uploads vertex and index data into GPU buffers.
    #[must_use]
    pub fn new(gpu: &GpuContext, label: &str, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// A unit cube centered at the origin with per-face normals.
    #[must_use]
    pub fn cube(gpu: &GpuContext) -> Self {
        let (vertices, indices) = cube_geometry(0.5);
        Self::new(gpu, "Cube", &vertices, &indices)
    }
}

/// Generates cube geometry with the given half extent.
///
/// 24 vertices (4 per face) so each face carries a flat normal.
#[must_use]
pub fn cube_geometry(half: f32) -> (Vec<Vertex>, Vec<u32>) {
    // (normal, tangent u, tangent v) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in &FACES {
        let n = glam::Vec3::from_array(*normal);
        let u = glam::Vec3::from_array(*u);
        let v = glam::Vec3::from_array(*v);
        let base = vertices.len() as u32;

        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (n + u * su + v * sv) * half;
            vertices.push(Vertex {
                position: position.to_array(),
                normal: n.to_array(),
            });
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}
