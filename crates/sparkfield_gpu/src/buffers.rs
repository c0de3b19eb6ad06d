//! GPU copies of the particle arrays.
//!
//! Uploaded once at initialization. After that only the compute kernel
//! writes positions; velocities and colors are never written again.

use sparkfield_core::store::{VEC2_STRIDE, VEC4_STRIDE};
use sparkfield_core::{BufferRole, ParticleStore, SparkError};
use wgpu::util::DeviceExt;

use crate::error::GpuResult;

/// Vertex attribute location of the position.
pub const POSITION_LOCATION: u32 = 0;
/// Vertex attribute location of the color.
pub const COLOR_LOCATION: u32 = 1;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: POSITION_LOCATION,
    format: wgpu::VertexFormat::Float32x2,
}];

const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: COLOR_LOCATION,
    format: wgpu::VertexFormat::Float32x4,
}];

/// Vertex buffer layouts of the point draw, in slot order: positions, colors.
pub const VERTEX_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 2] = [
    wgpu::VertexBufferLayout {
        array_stride: VEC2_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    },
    wgpu::VertexBufferLayout {
        array_stride: VEC4_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &COLOR_ATTRIBUTES,
    },
];

/// wgpu usage flags for a buffer role.
///
/// Positions can also be copied out, so the live field can be read back.
#[must_use]
pub fn buffer_usages(role: BufferRole) -> wgpu::BufferUsages {
    let usage = role.usage();
    let mut flags = match role {
        BufferRole::Position => wgpu::BufferUsages::COPY_SRC,
        BufferRole::Velocity | BufferRole::Color => wgpu::BufferUsages::empty(),
    };
    if usage.storage {
        flags |= wgpu::BufferUsages::STORAGE;
    }
    if usage.vertex {
        flags |= wgpu::BufferUsages::VERTEX;
    }
    flags
}

/// The three particle buffers, index-aligned.
#[derive(Debug)]
pub struct GpuParticleBuffers {
    positions: wgpu::Buffer,
    velocities: wgpu::Buffer,
    colors: wgpu::Buffer,
    count: u32,
}

impl GpuParticleBuffers {
    /// Creates and fills the buffers from a generated store.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the store holds more than `u32::MAX` particles.
    pub fn upload(device: &wgpu::Device, store: &ParticleStore) -> GpuResult<Self> {
        let count = u32::try_from(store.len()).map_err(|_| {
            SparkError::InvalidConfig(format!("{} particles exceed u32 indexing", store.len()))
        })?;

        let create = |role: BufferRole| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(role.label()),
                contents: store.bytes(role),
                usage: buffer_usages(role),
            })
        };

        Ok(Self {
            positions: create(BufferRole::Position),
            velocities: create(BufferRole::Velocity),
            colors: create(BufferRole::Color),
            count,
        })
    }

    /// Buffer for the given role.
    #[must_use]
    pub const fn buffer(&self, role: BufferRole) -> &wgpu::Buffer {
        match role {
            BufferRole::Position => &self.positions,
            BufferRole::Velocity => &self.velocities,
            BufferRole::Color => &self.colors,
        }
    }

    /// Number of particles in each buffer.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}
