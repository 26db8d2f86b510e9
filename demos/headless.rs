//! Headless smoke demo: renders a small lit scene with shadows, an
//! environment skybox, and a compute-driven instancer into an offscreen
//! texture for a handful of frames.
//!
//! Run with `RUST_LOG=umbra=debug` to watch pipeline and shadow-target
//! lifecycle decisions.

use glam::{Mat4, Vec3, Vec4};

use umbra::{
    Aabb, Camera, DirectionalLight, EnvironmentMap, ForwardPipeline, GpuContext,
    InstancerSettings, Material, Mesh, PipelineSettings, Renderer, Scene,
};

const SIZE: (u32, u32) = (1280, 720);
const FRAMES: u32 = 8;

fn main() -> umbra::Result<()> {
    env_logger::init();

    let gpu = GpuContext::new_blocking()?;

    // 1. Pipeline with a plain tinted-sky environment.
    let environment = EnvironmentMap::solid_color(&gpu, [96, 128, 168, 255]);
    let mut pipeline = ForwardPipeline::new(
        &gpu,
        PipelineSettings {
            environment: Some(environment),
            ..PipelineSettings::default()
        },
    );
    pipeline.add_instancer(&gpu, InstancerSettings::default());

    // 2. A ground slab and a floating box, one directional light.
    let mut scene = Scene::new();
    scene.add_light(DirectionalLight::new(
        Vec3::new(-0.4, -1.0, -0.2),
        Vec3::ONE,
    ));

    let unit_bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
    scene.add_renderer(Renderer::new(
        Mesh::cube(&gpu),
        Material::opaque(Vec4::new(0.35, 0.35, 0.38, 1.0)),
        Mat4::from_scale_rotation_translation(
            Vec3::new(20.0, 0.2, 20.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, -2.0, 0.0),
        ),
        unit_bounds,
    ));
    scene.add_renderer(Renderer::new(
        Mesh::cube(&gpu),
        Material::opaque(Vec4::new(0.8, 0.25, 0.2, 1.0)),
        Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)),
        unit_bounds,
    ));
    scene.add_renderer(Renderer::new(
        Mesh::cube(&gpu),
        Material::transparent(Vec4::new(0.2, 0.5, 0.9, 0.4)),
        Mat4::from_translation(Vec3::new(1.5, 0.5, 1.0)),
        unit_bounds,
    ));

    // 3. Camera looking down at the scene center.
    let mut camera = Camera::new_perspective(60.0, SIZE.0 as f32 / SIZE.1 as f32, 0.1, 100.0);
    camera.look_at(Vec3::new(6.0, 5.0, 8.0), Vec3::ZERO, Vec3::Y);

    // 4. Offscreen color target; a windowed host would use the swapchain view.
    let target = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Demo Target"),
        size: wgpu::Extent3d {
            width: SIZE.0,
            height: SIZE.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    for frame in 0..FRAMES {
        let time = frame as f32 / 60.0;
        pipeline.render(&gpu, &scene, &camera, &view, SIZE, time)?;
    }
    log::info!("rendered {FRAMES} frames at {}x{}", SIZE.0, SIZE.1);

    pipeline.release();
    Ok(())
}
