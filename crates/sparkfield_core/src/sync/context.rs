//! The command-recording seam.
//!
//! The frame driver owns command buffers, pipelines and presentation. The
//! core only needs three things from it, and asks for them through
//! [`CommandContext`].

/// One compute dispatch over the whole field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchCommand {
    /// Workgroups along x. `particle_count / workgroup_size`.
    pub workgroups: u32,
}

/// One non-indexed point draw over the whole field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    /// Vertices (= particles) to draw, starting at index 0.
    pub vertex_count: u32,
}

/// An open command-recording context supplied by the frame driver.
///
/// Implementations record, they never wait: nothing here may block on GPU
/// completion.
pub trait CommandContext {
    /// Declares a pipeline barrier at the current recording position.
    fn pipeline_barrier(&mut self, barrier: &super::Barrier);

    /// Binds the compute pipeline and records the dispatch.
    fn dispatch(&mut self, command: DispatchCommand);

    /// Binds the graphics pipeline and records the draw.
    fn draw(&mut self, command: DrawCommand);
}

impl<C: CommandContext + ?Sized> CommandContext for &mut C {
    fn pipeline_barrier(&mut self, barrier: &super::Barrier) {
        (**self).pipeline_barrier(barrier);
    }

    fn dispatch(&mut self, command: DispatchCommand) {
        (**self).dispatch(command);
    }

    fn draw(&mut self, command: DrawCommand) {
        (**self).draw(command);
    }
}
