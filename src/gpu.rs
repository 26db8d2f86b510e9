//! GPU Context
//!
//! [`GpuContext`] holds the device and queue every subsystem renders
//! through. It is headless: the crate draws into caller-provided texture
//! views, so no surface or window handle is required here.

use crate::errors::{Result, UmbraError};

/// Core GPU handles shared by the whole pipeline.
pub struct GpuContext {
    /// Device for resource creation.
    pub device: wgpu::Device,
    /// Queue for command submission.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquires an adapter and device.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| UmbraError::AdapterRequestFailed(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self { device, queue })
    }

    /// Blocking variant of [`GpuContext::new`] for hosts without an
    /// async runtime.
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }
}
