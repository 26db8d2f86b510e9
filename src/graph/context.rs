//! Render Graph Context System
//!
//! Two phase-separated contexts flow through the graph:
//!
//! - [`PrepareContext`]: mutable context for the **prepare** phase. Passes
//!   allocate GPU resources, compile pipelines, upload uniforms, and publish
//!   cross-pass state into the [`FrameState`] here.
//! - [`ExecuteContext`]: read-only context for the **execute** phase. Passes
//!   record GPU commands against state prepared earlier.
//!
//! [`FrameState`] is the frame-scoped replacement for shader-global
//! publication: everything a later pass reads from an earlier one lives in
//! this struct and is reset at the top of every frame. Node order in the
//! graph is the dependency edge; a pass that reads a field not yet published
//! sees the documented reset value, never a stale one from a previous frame.

use glam::{Mat4, Vec3};

use crate::environment::EnvironmentMap;
use crate::gpu::GpuContext;
use crate::graph::extracted::ExtractedFrame;
use crate::graph::resolve::LightingParameters;

// ─── Frame State ─────────────────────────────────────────────────────────────

/// Frame bind group published by the forward pass.
///
/// Later nodes that draw into the forward target (the instanced draw) reuse
/// this group and layout instead of rebuilding the frame bindings.
pub struct PreparedFrameBindings {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

/// Cross-pass state for the current frame.
///
/// Written during prepare, read during prepare of later nodes and during
/// execute. Reset every frame before the first node runs.
pub struct FrameState {
    /// Light-space view-projection for the shadow lookup.
    /// Identity until the shadow pass publishes.
    pub light_matrix: Mat4,
    /// Shadow map view to sample. `None` until the shadow pass has ever
    /// allocated a target; consumers bind a placeholder then.
    pub shadow_view: Option<wgpu::TextureView>,
    /// Effective shadow strength for this frame. Zero disables the lookup
    /// (no light and the stale-shadow policy is `Disable`).
    pub shadow_strength: f32,
    /// Published by the forward pass after it builds the frame bind group.
    pub frame_bindings: Option<PreparedFrameBindings>,
}

impl FrameState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            light_matrix: Mat4::IDENTITY,
            shadow_view: None,
            shadow_strength: 0.0,
            frame_bindings: None,
        }
    }

    /// Resets to the start-of-frame state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new()
    }
}

// ─── View Data ───────────────────────────────────────────────────────────────

/// Camera-derived values for the frame, extracted before the graph runs.
#[derive(Debug, Clone, Copy)]
pub struct ViewData {
    /// View-projection matrix ([0, 1] depth range).
    pub view_proj: Mat4,
    /// Camera position in world space.
    pub position: Vec3,
}

// ─── Prepare Context ─────────────────────────────────────────────────────────

/// Mutable context for the **prepare** phase.
///
/// Carries the frame's resolved inputs by reference plus exclusive access to
/// the [`FrameState`] publication target. The extraction and parameter
/// resolution already happened; passes only consume here.
pub struct PrepareContext<'a> {
    /// Device and queue.
    pub gpu: &'a GpuContext,
    /// This frame's scene snapshot (draw lists, bounds, light).
    pub frame: &'a ExtractedFrame,
    /// Camera-derived values.
    pub view: ViewData,
    /// Fully resolved lighting parameters.
    pub lighting: LightingParameters,
    /// Ambient color published with the lighting parameters.
    pub ambient: Vec3,
    /// Elapsed time in seconds, for the simulation uniform.
    pub time: f32,
    /// Size of the color target in pixels.
    pub target_size: (u32, u32),
    /// Format of the caller's color target.
    pub color_format: wgpu::TextureFormat,
    /// Format of the pipeline's depth buffer.
    pub depth_format: wgpu::TextureFormat,
    /// Environment cubemap, when the pipeline was configured with one.
    pub environment: Option<&'a EnvironmentMap>,
    /// Cross-pass publication target.
    pub state: &'a mut FrameState,
}

// ─── Execute Context ─────────────────────────────────────────────────────────

/// Read-only context for the **execute** phase.
pub struct ExecuteContext<'a> {
    /// Device and queue.
    pub gpu: &'a GpuContext,
    /// This frame's scene snapshot. Passes iterate the same lists they
    /// staged uniforms for during prepare, in the same order.
    pub frame: &'a ExtractedFrame,
    /// Caller-provided color target for the frame.
    pub target: &'a wgpu::TextureView,
    /// Pipeline-owned depth buffer matching the target size.
    pub depth: &'a wgpu::TextureView,
    /// Cross-pass state published during prepare.
    pub state: &'a FrameState,
    /// Clear color for the forward pass.
    pub clear_color: wgpu::Color,
}
