//! # Core Error Types
//!
//! All errors that can occur before any GPU object exists: configuration,
//! particle generation preconditions, and frame protocol violations.

use std::path::PathBuf;

use thiserror::Error;

use crate::sync::{FrameEvent, FrameState, PositionOwner};

/// Errors that can occur in the particle core.
#[derive(Error, Debug)]
pub enum SparkError {
    /// A configuration value is out of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The particle count does not split into whole workgroups.
    ///
    /// Dispatching `count / workgroup_size` groups would silently skip the
    /// remainder, so this is rejected at initialization.
    #[error("particle count {count} is not divisible by workgroup size {workgroup_size}")]
    IndivisibleParticleCount {
        /// Requested particle count.
        count: u32,
        /// Invocations per workgroup.
        workgroup_size: u32,
    },

    /// Host memory for the particle arrays could not be reserved.
    #[error("cannot allocate {count} particles: {source}")]
    ParticleAllocation {
        /// Requested particle count.
        count: u32,
        /// Allocator failure.
        #[source]
        source: std::collections::TryReserveError,
    },

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `FieldConfig`.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A recording call arrived out of the fixed per-frame order.
    #[error("illegal frame transition: {event:?} while in {state:?} (frame {frame})")]
    IllegalTransition {
        /// State the coordinator was in.
        state: FrameState,
        /// Event that was rejected.
        event: FrameEvent,
        /// Frame index the violation happened in.
        frame: u64,
    },

    /// A stage touched the shared position buffer without owning it.
    #[error("position buffer owned by {owner:?}, but {requester:?} tried to access it")]
    OwnershipViolation {
        /// Current owner stage.
        owner: PositionOwner,
        /// Stage that attempted access.
        requester: PositionOwner,
    },
}

/// Result type for core operations.
pub type SparkResult<T> = Result<T, SparkError>;
