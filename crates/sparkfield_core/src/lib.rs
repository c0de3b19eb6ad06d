//! # SPARKFIELD Core
//!
//! GPU-free half of a compute-driven particle field:
//! - Seeded generation of the particle arrays (positions, velocities, colors)
//! - CPU reference of the per-step update rule
//! - The two-barrier frame protocol between the update kernel and the draw
//!
//! ## Architecture Rules
//!
//! 1. **Deterministic** - Same seed and count produce the same field, bit for bit
//! 2. **No GPU types** - The renderer talks to the protocol through [`CommandContext`]
//! 3. **Illegal order is an error** - Never reordered, never ignored
//!
//! ## Example
//!
//! ```rust,ignore
//! use sparkfield_core::{record_frame, BarrierCoordinator, FieldConfig, FramePlan};
//!
//! let plan = FramePlan::for_config(&FieldConfig::default())?;
//! let mut coordinator = BarrierCoordinator::new();
//! record_frame(&mut coordinator, &mut ctx, &plan)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod frame;
pub mod simulation;
pub mod store;
pub mod sync;

pub use config::{FieldConfig, WindowConfig, BOUND, MAX_WORKGROUP_SIZE};
pub use error::{SparkError, SparkResult};
pub use frame::{record_frame, FramePlan};
pub use simulation::{simulate_step, step_particle};
pub use store::{BufferRole, BufferUsage, ParticleStore, SpawnParams};
pub use sync::{
    verify_frame_sequence, AccessMask, Barrier, BarrierCoordinator, BarrierKind, CommandContext,
    DispatchCommand, DrawCommand, FrameEvent, FrameState, PositionOwner, ProtocolStats,
    RecordedOp, RecordingContext, StageMask,
};
