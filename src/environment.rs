//! Environment Cubemap
//!
//! The one configuration resource the pipeline accepts: a cubemap that both
//! the skybox background and the image-based lighting term sample. The crate
//! does no file I/O; hosts hand in raw RGBA face data.

use crate::errors::{Result, UmbraError};
use crate::gpu::GpuContext;

/// Face order for [`EnvironmentMap::from_rgba8`]: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_COUNT: usize = 6;

/// A GPU cubemap with a cube view for sampling.
#[derive(Debug)]
pub struct EnvironmentMap {
    pub texture: wgpu::Texture,
    /// Cube-dimension view over all six faces.
    pub view: wgpu::TextureView,
    /// Edge length of one face in texels.
    pub size: u32,
}

impl EnvironmentMap {
    /// Uploads six RGBA8 faces of `size * size` texels each.
    ///
    /// Face data is tightly packed, 4 bytes per texel, in the +X, -X, +Y,
    /// -Y, +Z, -Z order. A face with the wrong byte length is rejected.
    pub fn from_rgba8(
        gpu: &GpuContext,
        size: u32,
        faces: &[&[u8]; FACE_COUNT],
    ) -> Result<Self> {
        if size == 0 {
            return Err(UmbraError::CubeMapError(
                "cubemap face size must be non-zero".to_string(),
            ));
        }
        let expected = size as usize * size as usize * 4;
        for (index, face) in faces.iter().enumerate() {
            if face.len() != expected {
                return Err(UmbraError::CubeMapError(format!(
                    "face {index}: expected {expected} bytes, got {}",
                    face.len()
                )));
            }
        }

        let map = Self::upload(gpu, size, faces);
        log::info!("Environment cubemap uploaded ({size}x{size} per face)");
        Ok(map)
    }

    /// A 1x1 cubemap filled with one color.
    ///
    /// The forward pass binds a black one as the IBL source when no
    /// environment is configured, which reduces the IBL term to zero.
    #[must_use]
    pub fn solid_color(gpu: &GpuContext, rgba: [u8; 4]) -> Self {
        let face: &[u8] = &rgba;
        Self::upload(gpu, 1, &[face; FACE_COUNT])
    }

    fn upload(gpu: &GpuContext, size: u32, faces: &[&[u8]; FACE_COUNT]) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Cubemap"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: FACE_COUNT as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (index, face) in faces.iter().enumerate() {
            gpu.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: index as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size * 4),
                    rows_per_image: Some(size),
                },
                wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Environment Cube View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        Self {
            texture,
            view,
            size,
        }
    }
}
