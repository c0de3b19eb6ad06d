//! # Particle Renderer
//!
//! The two entry points the frame driver uses:
//!
//! ```text
//! initialize(device, config, format)   once
//!     validate → check limits → generate store → upload → build pipelines
//!
//! record_frame(encoder, target)        every frame
//!     barrier A → dispatch → barrier B → draw
//! ```
//!
//! Nothing here submits or presents. Submission and frame pacing belong to
//! the frame driver.

use sparkfield_core::{
    record_frame, BarrierCoordinator, FieldConfig, FramePlan, ParticleStore, ProtocolStats,
};

use crate::buffers::GpuParticleBuffers;
use crate::compute::ComputeStage;
use crate::context::WgpuCommandContext;
use crate::error::{GpuError, GpuResult};
use crate::graphics::GraphicsStage;

/// Compute + graphics stages over one shared position buffer.
#[derive(Debug)]
pub struct ParticleRenderer {
    buffers: GpuParticleBuffers,
    compute: ComputeStage,
    graphics: GraphicsStage,
    coordinator: BarrierCoordinator,
    plan: FramePlan,
}

impl ParticleRenderer {
    /// Generates the field and builds every GPU object it needs.
    ///
    /// # Errors
    ///
    /// Configuration errors (including an indivisible particle count),
    /// device limits the field exceeds, and any validation or out-of-memory
    /// failure while creating buffers or pipelines.
    pub fn initialize(
        device: &wgpu::Device,
        config: &FieldConfig,
        format: wgpu::TextureFormat,
    ) -> GpuResult<Self> {
        let plan = FramePlan::for_config(config)?;
        check_limits(&device.limits(), config)?;
        let store = ParticleStore::from_config(config)?;

        let buffers = create_scoped(device, "particle buffers", || {
            GpuParticleBuffers::upload(device, &store)
        })?;
        let (compute, graphics) = create_scoped(device, "particle pipelines", || {
            Ok((
                ComputeStage::new(device, &buffers, config.workgroup_size),
                GraphicsStage::new(device, format),
            ))
        })?;

        tracing::info!(
            "Particle field ready: {} particles, {} workgroups of {}, target {:?}",
            buffers.count(),
            plan.dispatch.workgroups,
            compute.workgroup_size(),
            graphics.format()
        );

        Ok(Self {
            buffers,
            compute,
            graphics,
            coordinator: BarrierCoordinator::new(),
            plan,
        })
    }

    /// Records one frame into `encoder`, drawing onto `target`.
    ///
    /// Returns the index of the recorded frame.
    ///
    /// # Errors
    ///
    /// A barrier-protocol violation. Not expected in normal operation; the
    /// driver treats it as fatal.
    pub fn record_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) -> GpuResult<u64> {
        let mut ctx = WgpuCommandContext::new(
            encoder,
            target,
            &self.compute,
            &self.graphics,
            &self.buffers,
        );
        Ok(record_frame(&mut self.coordinator, &mut ctx, &self.plan)?)
    }

    /// Number of particles simulated and drawn.
    #[must_use]
    pub const fn particle_count(&self) -> u32 {
        self.buffers.count()
    }

    /// Per-frame commands.
    #[must_use]
    pub const fn plan(&self) -> &FramePlan {
        &self.plan
    }

    /// Barrier protocol counters.
    #[must_use]
    pub const fn stats(&self) -> ProtocolStats {
        self.coordinator.stats()
    }
}

/// Rejects fields the device cannot dispatch or bind.
///
/// # Errors
///
/// `LimitExceeded` naming the first limit that does not fit.
pub fn check_limits(limits: &wgpu::Limits, config: &FieldConfig) -> GpuResult<()> {
    let position_bytes =
        u64::from(config.particle_count) * sparkfield_core::store::VEC2_STRIDE;
    let color_bytes = u64::from(config.particle_count) * sparkfield_core::store::VEC4_STRIDE;

    let checks = [
        (
            "max_compute_workgroup_size_x",
            u64::from(config.workgroup_size),
            u64::from(limits.max_compute_workgroup_size_x),
        ),
        (
            "max_compute_invocations_per_workgroup",
            u64::from(config.workgroup_size),
            u64::from(limits.max_compute_invocations_per_workgroup),
        ),
        (
            "max_compute_workgroups_per_dimension",
            u64::from(config.workgroup_count()),
            u64::from(limits.max_compute_workgroups_per_dimension),
        ),
        (
            "max_storage_buffer_binding_size",
            position_bytes,
            u64::from(limits.max_storage_buffer_binding_size),
        ),
        ("max_buffer_size", color_bytes, limits.max_buffer_size),
    ];

    for (limit, actual, max) in checks {
        if actual > max {
            tracing::error!("Field exceeds device limit {}: {} > {}", limit, actual, max);
            return Err(GpuError::LimitExceeded { limit, actual, max });
        }
    }
    Ok(())
}

/// Runs `create` inside validation and out-of-memory error scopes.
fn create_scoped<T>(
    device: &wgpu::Device,
    what: &'static str,
    create: impl FnOnce() -> GpuResult<T>,
) -> GpuResult<T> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let created = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    if out_of_memory.is_some() {
        tracing::error!("Out of GPU memory creating {}", what);
        return Err(GpuError::OutOfMemory { what });
    }
    if let Some(err) = validation {
        tracing::error!("Validation failed creating {}: {}", what, err);
        return Err(GpuError::ResourceCreation {
            what,
            message: err.to_string(),
        });
    }
    created
}
