//! # GPU Error Types
//!
//! Every variant is fatal: the frame driver reports it and stops.

use sparkfield_core::SparkError;
use thiserror::Error;

/// Errors raised while creating or driving GPU resources.
#[derive(Error, Debug)]
pub enum GpuError {
    /// No adapter can present to the surface.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// The adapter refused to create a device.
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The window surface could not be created.
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable texture format.
    #[error("surface has no supported texture format")]
    NoSurfaceFormat,

    /// The field exceeds a device limit.
    #[error("device limit exceeded: {limit} is {actual}, maximum {max}")]
    LimitExceeded {
        /// Name of the wgpu limit.
        limit: &'static str,
        /// Value the field needs.
        actual: u64,
        /// Value the device allows.
        max: u64,
    },

    /// A buffer, shader or pipeline failed validation at creation.
    #[error("failed to create {what}: {message}")]
    ResourceCreation {
        /// Which group of resources was being created.
        what: &'static str,
        /// wgpu's description of the failure.
        message: String,
    },

    /// Device memory ran out while creating resources.
    #[error("out of GPU memory while creating {what}")]
    OutOfMemory {
        /// Which group of resources was being created.
        what: &'static str,
    },

    /// Acquiring the next surface texture failed.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A configuration or protocol error from the core.
    #[error(transparent)]
    Core(#[from] SparkError),
}

/// Result type for GPU operations.
pub type GpuResult<T> = Result<T, GpuError>;
