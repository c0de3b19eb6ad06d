//! A [`CommandContext`] that records instead of submitting.
//!
//! Lets harnesses check the exact command order produced for a frame
//! without a GPU.

use crate::error::{SparkError, SparkResult};

use super::{
    Barrier, BarrierKind, CommandContext, DispatchCommand, DrawCommand, FrameEvent, FrameState,
};

/// One recorded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedOp {
    /// A declared barrier.
    Barrier(Barrier),
    /// A compute dispatch.
    Dispatch(DispatchCommand),
    /// A point draw.
    Draw(DrawCommand),
}

impl RecordedOp {
    /// Frame event this op corresponds to.
    #[must_use]
    pub const fn event(&self) -> FrameEvent {
        match self {
            Self::Barrier(barrier) => match barrier.kind {
                BarrierKind::PreCompute => FrameEvent::IssuePreCompute,
                BarrierKind::PostCompute => FrameEvent::IssuePostCompute,
            },
            Self::Dispatch(_) => FrameEvent::Dispatch,
            Self::Draw(_) => FrameEvent::Draw,
        }
    }
}

/// In-memory command log.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    ops: Vec<RecordedOp>,
}

impl RecordingContext {
    /// Empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Everything recorded so far, in order.
    #[must_use]
    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    /// Drains the log.
    pub fn take(&mut self) -> Vec<RecordedOp> {
        std::mem::take(&mut self.ops)
    }
}

impl CommandContext for RecordingContext {
    fn pipeline_barrier(&mut self, barrier: &Barrier) {
        self.ops.push(RecordedOp::Barrier(*barrier));
    }

    fn dispatch(&mut self, command: DispatchCommand) {
        self.ops.push(RecordedOp::Dispatch(command));
    }

    fn draw(&mut self, command: DrawCommand) {
        self.ops.push(RecordedOp::Draw(command));
    }
}

/// Replays a command log through the frame state machine.
///
/// Returns the number of complete frames. Barrier tokens must match the
/// canonical `PRE_COMPUTE`/`POST_COMPUTE` masks, not just their kind. A log
/// that stops mid-frame is an error.
///
/// # Errors
///
/// `IllegalTransition` at the first out-of-order op, or at the end of a
/// truncated frame.
pub fn verify_frame_sequence(ops: &[RecordedOp]) -> SparkResult<u64> {
    let mut state = FrameState::Idle;
    let mut frames = 0_u64;

    for op in ops {
        let event = op.event();
        let canonical = match op {
            RecordedOp::Barrier(barrier) => match barrier.kind {
                BarrierKind::PreCompute => *barrier == Barrier::PRE_COMPUTE,
                BarrierKind::PostCompute => *barrier == Barrier::POST_COMPUTE,
            },
            _ => true,
        };
        let next = state.next(event).filter(|_| canonical);
        state = next.ok_or(SparkError::IllegalTransition {
            state,
            event,
            frame: frames,
        })?;

        if state == FrameState::GraphicsDrawn {
            state = FrameState::Idle;
            frames += 1;
        }
    }

    if state == FrameState::Idle {
        Ok(frames)
    } else {
        Err(SparkError::IllegalTransition {
            state,
            event: FrameEvent::Finish,
            frame: frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{AccessMask, StageMask};

    fn frame() -> [RecordedOp; 4] {
        [
            RecordedOp::Barrier(Barrier::PRE_COMPUTE),
            RecordedOp::Dispatch(DispatchCommand { workgroups: 1 }),
            RecordedOp::Barrier(Barrier::POST_COMPUTE),
            RecordedOp::Draw(DrawCommand { vertex_count: 256 }),
        ]
    }

    #[test]
    fn test_verify_counts_frames() {
        let ops: Vec<_> = frame().into_iter().chain(frame()).collect();
        assert_eq!(verify_frame_sequence(&ops).unwrap(), 2);
        assert_eq!(verify_frame_sequence(&[]).unwrap(), 0);
    }

    #[test]
    fn test_verify_rejects_swapped_barriers() {
        let mut ops = frame();
        ops.swap(0, 2);
        assert!(verify_frame_sequence(&ops).is_err());
    }

    #[test]
    fn test_verify_rejects_truncated_frame() {
        let ops = &frame()[..3];
        assert!(matches!(
            verify_frame_sequence(ops),
            Err(SparkError::IllegalTransition {
                state: FrameState::BarrierBIssued,
                event: FrameEvent::Finish,
                ..
            })
        ));
    }

    #[test]
    fn test_verify_rejects_weakened_barrier() {
        let mut ops = frame();
        ops[2] = RecordedOp::Barrier(Barrier {
            src_access: AccessMask::NONE,
            dst_access: AccessMask::NONE,
            ..Barrier::POST_COMPUTE
        });
        assert!(verify_frame_sequence(&ops).is_err());

        let mut ops = frame();
        ops[0] = RecordedOp::Barrier(Barrier {
            src_stage: StageMask::COMPUTE_SHADER,
            ..Barrier::PRE_COMPUTE
        });
        assert!(verify_frame_sequence(&ops).is_err());
    }

    #[test]
    fn test_take_drains() {
        let mut ctx = RecordingContext::new();
        ctx.draw(DrawCommand { vertex_count: 1 });
        assert_eq!(ctx.take().len(), 1);
        assert!(ctx.ops().is_empty());
    }
}
