//! # Compute/Graphics Synchronization
//!
//! The position buffer is written by the compute kernel and read by vertex
//! fetch in the same frame. Two barriers per frame order those accesses:
//!
//! - **A** (`PRE_COMPUTE`): previous vertex reads finish before compute
//!   writes. Execution dependency only.
//! - **B** (`POST_COMPUTE`): compute writes are finished and visible before
//!   vertex reads.
//!
//! [`BarrierCoordinator`] enforces the order. [`CommandContext`] is the seam
//! through which it reaches whatever records the commands.

mod barrier;
mod context;
mod coordinator;
mod recording;

pub use barrier::{AccessMask, Barrier, BarrierKind, StageMask};
pub use context::{CommandContext, DispatchCommand, DrawCommand};
pub use coordinator::{BarrierCoordinator, FrameEvent, FrameState, PositionOwner, ProtocolStats};
pub use recording::{verify_frame_sequence, RecordedOp, RecordingContext};
