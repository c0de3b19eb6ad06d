//! # Barrier Coordinator
//!
//! The per-frame protocol between the compute kernel and the point draw,
//! both of which touch the single shared position buffer.
//!
//! ```text
//!        issue_pre_compute         record_dispatch
//!  IDLE ──────────────────▶ A_ISSUED ──────────────▶ DISPATCHED
//!   ▲                                                    │
//!   │ finish_frame                                       │ issue_post_compute
//!   │                  record_draw                       ▼
//!  DRAWN ◀───────────────────────────────────────── B_ISSUED
//! ```
//!
//! Alongside the state, the coordinator tracks which stage currently owns
//! the position buffer. Barrier A hands it to compute, barrier B hands it
//! back to graphics. A dispatch without compute ownership, or a draw without
//! graphics ownership, is a data race and is rejected before the command
//! reaches the context.
//!
//! Every violation is an error in every build, never a silent reorder.

use crate::error::{SparkError, SparkResult};

use super::{Barrier, CommandContext, DispatchCommand, DrawCommand};

/// Where the current frame is in the fixed recording order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameState {
    /// Between frames.
    #[default]
    Idle,
    /// Barrier A recorded.
    BarrierAIssued,
    /// Compute dispatch recorded.
    ComputeDispatched,
    /// Barrier B recorded.
    BarrierBIssued,
    /// Point draw recorded.
    GraphicsDrawn,
}

/// A recording step that advances the frame state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameEvent {
    /// Declare barrier A.
    IssuePreCompute,
    /// Record the compute dispatch.
    Dispatch,
    /// Declare barrier B.
    IssuePostCompute,
    /// Record the point draw.
    Draw,
    /// Close the frame.
    Finish,
}

impl FrameState {
    /// The state `event` leads to, or `None` if it is illegal here.
    #[must_use]
    pub const fn next(self, event: FrameEvent) -> Option<Self> {
        match (self, event) {
            (Self::Idle, FrameEvent::IssuePreCompute) => Some(Self::BarrierAIssued),
            (Self::BarrierAIssued, FrameEvent::Dispatch) => Some(Self::ComputeDispatched),
            (Self::ComputeDispatched, FrameEvent::IssuePostCompute) => Some(Self::BarrierBIssued),
            (Self::BarrierBIssued, FrameEvent::Draw) => Some(Self::GraphicsDrawn),
            (Self::GraphicsDrawn, FrameEvent::Finish) => Some(Self::Idle),
            _ => None,
        }
    }
}

/// The stage allowed to touch the shared position buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionOwner {
    /// Vertex fetch of the point draw. Owner after upload.
    #[default]
    Graphics,
    /// The update kernel.
    Compute,
}

/// Counters kept by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    /// Frames closed with `finish_frame`.
    pub frames_completed: u64,
    /// Barriers declared (two per completed frame).
    pub barriers_issued: u64,
    /// Rejected transitions and ownership violations.
    pub violations: u64,
}

/// Enforces the two-barrier protocol, one frame at a time.
#[derive(Debug, Clone, Default)]
pub struct BarrierCoordinator {
    state: FrameState,
    owner: PositionOwner,
    frame: u64,
    stats: ProtocolStats,
}

impl BarrierCoordinator {
    /// Creates a coordinator between frames, with graphics owning positions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FrameState::Idle,
            owner: PositionOwner::Graphics,
            frame: 0,
            stats: ProtocolStats {
                frames_completed: 0,
                barriers_issued: 0,
                violations: 0,
            },
        }
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Current owner of the position buffer.
    #[must_use]
    pub const fn owner(&self) -> PositionOwner {
        self.owner
    }

    /// Index of the frame being (or next to be) recorded.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Protocol counters.
    #[must_use]
    pub const fn stats(&self) -> ProtocolStats {
        self.stats
    }

    /// Declares barrier A and hands the position buffer to compute.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless the coordinator is idle.
    pub fn issue_pre_compute<C: CommandContext>(&mut self, ctx: &mut C) -> SparkResult<()> {
        let next = self.check(FrameEvent::IssuePreCompute)?;
        ctx.pipeline_barrier(&Barrier::PRE_COMPUTE);
        self.stats.barriers_issued += 1;
        self.owner = PositionOwner::Compute;
        self.enter(next);
        Ok(())
    }

    /// Records the compute dispatch.
    ///
    /// # Errors
    ///
    /// `OwnershipViolation` if graphics still owns the positions,
    /// `IllegalTransition` if barrier A was not the previous step.
    pub fn record_dispatch<C: CommandContext>(
        &mut self,
        ctx: &mut C,
        command: DispatchCommand,
    ) -> SparkResult<()> {
        self.require_owner(PositionOwner::Compute)?;
        let next = self.check(FrameEvent::Dispatch)?;
        ctx.dispatch(command);
        self.enter(next);
        Ok(())
    }

    /// Declares barrier B and hands the position buffer back to graphics.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless the dispatch was the previous step.
    pub fn issue_post_compute<C: CommandContext>(&mut self, ctx: &mut C) -> SparkResult<()> {
        let next = self.check(FrameEvent::IssuePostCompute)?;
        ctx.pipeline_barrier(&Barrier::POST_COMPUTE);
        self.stats.barriers_issued += 1;
        self.owner = PositionOwner::Graphics;
        self.enter(next);
        Ok(())
    }

    /// Records the point draw.
    ///
    /// # Errors
    ///
    /// `OwnershipViolation` if compute still owns the positions,
    /// `IllegalTransition` if barrier B was not the previous step.
    pub fn record_draw<C: CommandContext>(
        &mut self,
        ctx: &mut C,
        command: DrawCommand,
    ) -> SparkResult<()> {
        self.require_owner(PositionOwner::Graphics)?;
        let next = self.check(FrameEvent::Draw)?;
        ctx.draw(command);
        self.enter(next);
        Ok(())
    }

    /// Closes the frame and returns the index of the frame just completed.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless the draw was the previous step.
    pub fn finish_frame(&mut self) -> SparkResult<u64> {
        let next = self.check(FrameEvent::Finish)?;
        self.enter(next);
        let completed = self.frame;
        self.frame += 1;
        self.stats.frames_completed += 1;
        Ok(completed)
    }

    fn check(&mut self, event: FrameEvent) -> SparkResult<FrameState> {
        match self.state.next(event) {
            Some(next) => Ok(next),
            None => {
                self.stats.violations += 1;
                tracing::error!(
                    "Barrier protocol violation: {:?} in state {:?} (frame {})",
                    event,
                    self.state,
                    self.frame
                );
                Err(SparkError::IllegalTransition {
                    state: self.state,
                    event,
                    frame: self.frame,
                })
            }
        }
    }

    fn require_owner(&mut self, requester: PositionOwner) -> SparkResult<()> {
        if self.owner == requester {
            return Ok(());
        }
        self.stats.violations += 1;
        tracing::error!(
            "Position buffer owned by {:?}, {:?} access rejected (frame {})",
            self.owner,
            requester,
            self.frame
        );
        Err(SparkError::OwnershipViolation {
            owner: self.owner,
            requester,
        })
    }

    fn enter(&mut self, next: FrameState) {
        tracing::debug!("frame {}: {:?} -> {:?}", self.frame, self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{RecordedOp, RecordingContext};

    const DISPATCH: DispatchCommand = DispatchCommand { workgroups: 4 };
    const DRAW: DrawCommand = DrawCommand { vertex_count: 1024 };

    fn run_frame(coordinator: &mut BarrierCoordinator, ctx: &mut RecordingContext) {
        coordinator.issue_pre_compute(ctx).unwrap();
        coordinator.record_dispatch(ctx, DISPATCH).unwrap();
        coordinator.issue_post_compute(ctx).unwrap();
        coordinator.record_draw(ctx, DRAW).unwrap();
        coordinator.finish_frame().unwrap();
    }

    #[test]
    fn test_transition_table() {
        use FrameEvent::*;
        use FrameState::*;
        let legal = [
            (Idle, IssuePreCompute, BarrierAIssued),
            (BarrierAIssued, Dispatch, ComputeDispatched),
            (ComputeDispatched, IssuePostCompute, BarrierBIssued),
            (BarrierBIssued, Draw, GraphicsDrawn),
            (GraphicsDrawn, Finish, Idle),
        ];
        let states = [Idle, BarrierAIssued, ComputeDispatched, BarrierBIssued, GraphicsDrawn];
        let events = [IssuePreCompute, Dispatch, IssuePostCompute, Draw, Finish];
        for state in states {
            for event in events {
                let expected = legal
                    .iter()
                    .find(|(s, e, _)| *s == state && *e == event)
                    .map(|(_, _, n)| *n);
                assert_eq!(state.next(event), expected, "{state:?} + {event:?}");
            }
        }
    }

    #[test]
    fn test_full_frame_moves_ownership() {
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        assert_eq!(coordinator.owner(), PositionOwner::Graphics);

        coordinator.issue_pre_compute(&mut ctx).unwrap();
        assert_eq!(coordinator.owner(), PositionOwner::Compute);
        coordinator.record_dispatch(&mut ctx, DISPATCH).unwrap();
        coordinator.issue_post_compute(&mut ctx).unwrap();
        assert_eq!(coordinator.owner(), PositionOwner::Graphics);
        coordinator.record_draw(&mut ctx, DRAW).unwrap();
        assert_eq!(coordinator.finish_frame().unwrap(), 0);

        assert_eq!(coordinator.state(), FrameState::Idle);
        assert_eq!(coordinator.frame(), 1);
        assert_eq!(
            ctx.ops(),
            &[
                RecordedOp::Barrier(Barrier::PRE_COMPUTE),
                RecordedOp::Dispatch(DISPATCH),
                RecordedOp::Barrier(Barrier::POST_COMPUTE),
                RecordedOp::Draw(DRAW),
            ]
        );
    }

    #[test]
    fn test_dispatch_without_barrier_a_is_ownership_violation() {
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        let err = coordinator.record_dispatch(&mut ctx, DISPATCH).unwrap_err();
        assert!(matches!(
            err,
            SparkError::OwnershipViolation {
                owner: PositionOwner::Graphics,
                requester: PositionOwner::Compute,
            }
        ));
        assert!(ctx.ops().is_empty());
        assert_eq!(coordinator.stats().violations, 1);
    }

    #[test]
    fn test_draw_without_barrier_b_is_rejected() {
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        coordinator.issue_pre_compute(&mut ctx).unwrap();
        coordinator.record_dispatch(&mut ctx, DISPATCH).unwrap();

        let err = coordinator.record_draw(&mut ctx, DRAW).unwrap_err();
        assert!(matches!(err, SparkError::OwnershipViolation { .. }));
        // Nothing reached the context, state unchanged.
        assert_eq!(ctx.ops().len(), 2);
        assert_eq!(coordinator.state(), FrameState::ComputeDispatched);
    }

    #[test]
    fn test_draw_at_frame_start_is_illegal_transition() {
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        let err = coordinator.record_draw(&mut ctx, DRAW).unwrap_err();
        assert!(matches!(
            err,
            SparkError::IllegalTransition {
                state: FrameState::Idle,
                event: FrameEvent::Draw,
                frame: 0,
            }
        ));
    }

    #[test]
    fn test_double_barrier_and_early_finish_rejected() {
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        coordinator.issue_pre_compute(&mut ctx).unwrap();
        assert!(coordinator.issue_pre_compute(&mut ctx).is_err());
        assert!(coordinator.issue_post_compute(&mut ctx).is_err());
        assert!(coordinator.finish_frame().is_err());
        assert_eq!(ctx.ops().len(), 1);
        assert_eq!(coordinator.stats().violations, 3);
    }

    #[test]
    fn test_stats_over_many_frames() {
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        for _ in 0..10 {
            run_frame(&mut coordinator, &mut ctx);
        }
        let stats = coordinator.stats();
        assert_eq!(stats.frames_completed, 10);
        assert_eq!(stats.barriers_issued, 20);
        assert_eq!(stats.violations, 0);
        assert_eq!(ctx.ops().len(), 40);
    }
}
