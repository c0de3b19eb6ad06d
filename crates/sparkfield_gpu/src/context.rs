//! wgpu-backed [`CommandContext`].
//!
//! wgpu tracks buffer hazards itself and places the real pipeline barrier
//! at pass boundaries. Each stage records into its own pass, so a declared
//! barrier always lands on such a boundary. The declaration is kept as a
//! debug marker for capture tools.

use sparkfield_core::{Barrier, CommandContext, DispatchCommand, DrawCommand};

use crate::buffers::GpuParticleBuffers;
use crate::compute::ComputeStage;
use crate::graphics::GraphicsStage;

/// One frame's recording target on a live command encoder.
pub struct WgpuCommandContext<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    target: &'a wgpu::TextureView,
    compute: &'a ComputeStage,
    graphics: &'a GraphicsStage,
    buffers: &'a GpuParticleBuffers,
}

impl<'a> WgpuCommandContext<'a> {
    /// Wraps an open encoder and the frame's color target.
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        target: &'a wgpu::TextureView,
        compute: &'a ComputeStage,
        graphics: &'a GraphicsStage,
        buffers: &'a GpuParticleBuffers,
    ) -> Self {
        Self {
            encoder,
            target,
            compute,
            graphics,
            buffers,
        }
    }
}

impl CommandContext for WgpuCommandContext<'_> {
    fn pipeline_barrier(&mut self, barrier: &Barrier) {
        tracing::trace!(
            "{}: {:?} -> {:?}, {:?} -> {:?}",
            barrier.label(),
            barrier.src_stage,
            barrier.dst_stage,
            barrier.src_access,
            barrier.dst_access
        );
        self.encoder.insert_debug_marker(barrier.label());
    }

    fn dispatch(&mut self, command: DispatchCommand) {
        self.compute.record(self.encoder, command.workgroups);
    }

    fn draw(&mut self, command: DrawCommand) {
        self.graphics
            .record(self.encoder, self.target, self.buffers, command.vertex_count);
    }
}
