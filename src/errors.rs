//! Error Types
//!
//! This module defines the error type used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`UmbraError`] covers the failure modes of GPU
//! acquisition and the compute round-trip. Missing *scene inputs* are not
//! errors: an absent override material, an empty scene, or a frame without a
//! directional light all degrade to documented defaults instead.
//!
//! All public APIs that can fail return [`Result<T>`], an alias for
//! `std::result::Result<T, UmbraError>`.

use thiserror::Error;

/// The main error type for the Umbra renderer.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // GPU Acquisition Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Compute Round-Trip Errors
    // ========================================================================
    /// Mapping a staging buffer for readback failed.
    #[error("Buffer readback failed: {0}")]
    ReadbackFailed(String),

    /// A readback returned a different byte count than the driver expected.
    ///
    /// This indicates a stride or element-count disagreement between the
    /// dispatch side and the kernel side and is not recoverable.
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// The byte count the driver allocated.
        expected: u64,
        /// The byte count the mapped range actually held.
        actual: u64,
    },

    /// The motion kernel source failed validation before compilation.
    ///
    /// The kernel declares its workgroup size through a placeholder that is
    /// substituted with the dispatch-side constant; a template without the
    /// placeholder would compile against a silently mismatched group size.
    #[error("Compute kernel source invalid: {0}")]
    KernelSourceInvalid(String),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Environment cubemap face data did not match the declared dimensions.
    #[error("Cube map error: {0}")]
    CubeMapError(String),
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
