//! # Particle Store
//!
//! Owns the CPU seed data for the three particle buffers and describes how
//! each buffer is used on the GPU.
//!
//! ## Layout
//!
//! ```text
//!  index:      0        1        2      ...   N-1
//!  position: [x, y]   [x, y]   [x, y]        [x, y]     8 bytes each
//!  velocity: [x, y]   [x, y]   [x, y]        [x, y]     8 bytes each
//!  color:    [r,g,b,a][r,g,b,a][r,g,b,a]     [r,g,b,a] 16 bytes each
//! ```
//!
//! Arrays are tightly packed and indexed identically: particle `i` is slot
//! `i` in every buffer.
//!
//! ## Distributions
//!
//! One `ChaCha8Rng` seeded with `seed` is consumed in particle order, six
//! draws per particle:
//!
//! 1. `x` uniform in `[-spawn_extent, spawn_extent]`
//! 2. `y` uniform in `[-spawn_extent, spawn_extent]`
//! 3. speed uniform in `[speed_min, speed_max]`
//! 4. direction uniform in `[0, 2π)`
//! 5. hue uniform in `[0, 2π)`
//! 6. chroma uniform in `[0, chroma_max]`
//!
//! Velocity is `speed * (cos, sin)(direction)`. Color is `particle_color`
//! with the fixed luma and alpha.

mod color;

pub use color::{particle_color, yiq_to_rgb, YIQ_TO_RGB};

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::FieldConfig;
use crate::error::{SparkError, SparkResult};

/// Bytes per position or velocity element.
pub const VEC2_STRIDE: u64 = std::mem::size_of::<[f32; 2]>() as u64;
/// Bytes per color element.
pub const VEC4_STRIDE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

/// How a particle buffer may be bound on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage {
    /// Bound as a storage buffer by the compute stage.
    pub storage: bool,
    /// Bound as a vertex buffer by the graphics stage.
    pub vertex: bool,
}

/// The three buffers a particle field is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Shared position buffer: compute writes, graphics reads.
    Position,
    /// Per-particle velocity, read by compute.
    Velocity,
    /// Per-particle RGBA, read by graphics.
    Color,
}

impl BufferRole {
    /// All roles in binding order.
    pub const ALL: [Self; 3] = [Self::Position, Self::Velocity, Self::Color];

    /// Usage flags for this buffer.
    ///
    /// Position and velocity are dual-purpose; color is vertex-only.
    #[must_use]
    pub const fn usage(self) -> BufferUsage {
        match self {
            Self::Position | Self::Velocity => BufferUsage {
                storage: true,
                vertex: true,
            },
            Self::Color => BufferUsage {
                storage: false,
                vertex: true,
            },
        }
    }

    /// Element stride in bytes.
    #[must_use]
    pub const fn stride(self) -> u64 {
        match self {
            Self::Position | Self::Velocity => VEC2_STRIDE,
            Self::Color => VEC4_STRIDE,
        }
    }

    /// Debug label for GPU objects.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Position => "Particle Positions",
            Self::Velocity => "Particle Velocities",
            Self::Color => "Particle Colors",
        }
    }
}

/// Shape of the initial distributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    /// Half-width of the centered spawn square.
    pub spawn_extent: f32,
    /// Velocity magnitude lower bound.
    pub speed_min: f32,
    /// Velocity magnitude upper bound.
    pub speed_max: f32,
    /// Fixed luma.
    pub luma: f32,
    /// Chroma upper bound.
    pub chroma_max: f32,
    /// Fixed alpha.
    pub alpha: f32,
}

impl SpawnParams {
    /// Checks that every sampled range is finite and non-inverted.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first range that cannot be sampled.
    pub fn validate(&self) -> SparkResult<()> {
        if !(self.spawn_extent.is_finite() && self.spawn_extent >= 0.0) {
            return Err(SparkError::InvalidConfig(format!(
                "spawn_extent must be a finite non-negative number, got {}",
                self.spawn_extent
            )));
        }
        let band_ok = self.speed_min >= 0.0 && self.speed_min <= self.speed_max;
        if !(band_ok && self.speed_max.is_finite()) {
            return Err(SparkError::InvalidConfig(format!(
                "speed band must satisfy 0 <= speed_min <= speed_max, got {}..{}",
                self.speed_min, self.speed_max
            )));
        }
        if !(self.chroma_max.is_finite() && self.chroma_max >= 0.0) {
            return Err(SparkError::InvalidConfig(format!(
                "chroma_max must be a finite non-negative number, got {}",
                self.chroma_max
            )));
        }
        Ok(())
    }

    /// Extracts the spawn shape from a field config.
    #[must_use]
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            spawn_extent: config.spawn_extent,
            speed_min: config.speed_min,
            speed_max: config.speed_max,
            luma: config.luma,
            chroma_max: config.chroma_max,
            alpha: config.alpha,
        }
    }
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

/// CPU-side particle state, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleStore {
    positions: Vec<[f32; 2]>,
    velocities: Vec<[f32; 2]>,
    colors: Vec<[f32; 4]>,
    seed: u64,
}

impl ParticleStore {
    /// Generates `count` particles from `seed`.
    ///
    /// Calling this twice with the same arguments yields bit-identical arrays.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a range in `params` cannot be sampled, and
    /// `ParticleAllocation` if the host cannot hold the three arrays.
    pub fn initialize(count: u32, seed: u64, params: &SpawnParams) -> SparkResult<Self> {
        params.validate()?;
        let len = count as usize;
        let mut positions = Vec::new();
        let mut velocities = Vec::new();
        let mut colors = Vec::new();
        let reserve = |result: Result<(), std::collections::TryReserveError>| {
            result.map_err(|source| SparkError::ParticleAllocation { count, source })
        };
        reserve(positions.try_reserve_exact(len))?;
        reserve(velocities.try_reserve_exact(len))?;
        reserve(colors.try_reserve_exact(len))?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let extent = params.spawn_extent;
        for _ in 0..len {
            let x = rng.gen_range(-extent..=extent);
            let y = rng.gen_range(-extent..=extent);
            positions.push([x, y]);

            let speed = rng.gen_range(params.speed_min..=params.speed_max);
            let direction = rng.gen_range(0.0..TAU);
            let (sin, cos) = direction.sin_cos();
            velocities.push([speed * cos, speed * sin]);

            let hue = rng.gen_range(0.0..TAU);
            let chroma = rng.gen_range(0.0..=params.chroma_max);
            colors.push(particle_color(params.luma, hue, chroma, params.alpha));
        }

        tracing::debug!("Generated {} particles from seed {:#x}", count, seed);
        Ok(Self {
            positions,
            velocities,
            colors,
            seed,
        })
    }

    /// Wraps arrays produced elsewhere, such as a replayed capture.
    ///
    /// The resulting store reports seed 0.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the arrays are not index-aligned.
    pub fn from_arrays(
        positions: Vec<[f32; 2]>,
        velocities: Vec<[f32; 2]>,
        colors: Vec<[f32; 4]>,
    ) -> SparkResult<Self> {
        if positions.len() != velocities.len() || positions.len() != colors.len() {
            return Err(SparkError::InvalidConfig(format!(
                "particle arrays differ in length: {} positions, {} velocities, {} colors",
                positions.len(),
                velocities.len(),
                colors.len()
            )));
        }
        Ok(Self {
            positions,
            velocities,
            colors,
            seed: 0,
        })
    }

    /// Validates `config` and generates the field it describes.
    ///
    /// # Errors
    ///
    /// Any validation error from [`FieldConfig::validate`], or
    /// `ParticleAllocation`.
    pub fn from_config(config: &FieldConfig) -> SparkResult<Self> {
        config.validate()?;
        Self::initialize(
            config.particle_count,
            config.seed,
            &SpawnParams::from_config(config),
        )
    }

    /// Number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True for an empty field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Seed the field was generated from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Initial positions.
    #[must_use]
    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    /// Velocities (immutable after creation).
    #[must_use]
    pub fn velocities(&self) -> &[[f32; 2]] {
        &self.velocities
    }

    /// Colors (immutable after creation).
    #[must_use]
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    /// Raw bytes of the buffer with the given role, for GPU upload.
    #[must_use]
    pub fn bytes(&self, role: BufferRole) -> &[u8] {
        match role {
            BufferRole::Position => bytemuck::cast_slice(&self.positions),
            BufferRole::Velocity => bytemuck::cast_slice(&self.velocities),
            BufferRole::Color => bytemuck::cast_slice(&self.colors),
        }
    }
}
