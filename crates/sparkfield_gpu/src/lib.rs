//! # SPARKFIELD GPU
//!
//! wgpu side of the particle field:
//! - Compute stage updating the shared position buffer in place
//! - Graphics stage drawing the same buffer as additive points
//! - A [`sparkfield_core::CommandContext`] that records both into one encoder
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ONE FRAME                            │
//! ├──────────────────────────────────────────────────────────┤
//! │  barrier A → Compute Pass (cs_main, N / WG groups)       │
//! │                   │ writes positions                     │
//! │  barrier B → Render Pass (PointList, N vertices)         │
//! │                   │ reads positions + colors             │
//! │              Frame driver submits and presents           │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod blend;
pub mod buffers;
pub mod compute;
pub mod context;
pub mod error;
pub mod graphics;
pub mod renderer;
pub mod shaders;

pub use blend::{BlendFactor, BlendOp, BlendStateConfig};
pub use buffers::{buffer_usages, GpuParticleBuffers, VERTEX_LAYOUTS};
pub use compute::ComputeStage;
pub use context::WgpuCommandContext;
pub use error::{GpuError, GpuResult};
pub use graphics::{GraphicsStage, CLEAR_COLOR};
pub use renderer::{check_limits, ParticleRenderer};
pub use shaders::ParticleShaders;
