//! # Field Configuration
//!
//! All tunables live in an external TOML file, loaded once at startup:
//!
//! ```toml
//! particle_count = 65536
//! seed = 24301
//! workgroup_size = 256
//!
//! [window]
//! width = 1280
//! height = 720
//! ```
//!
//! Every field is optional; missing fields fall back to `Default`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SparkError, SparkResult};

/// Largest workgroup the compute kernel may be compiled with.
///
/// Matches the default `max_compute_invocations_per_workgroup` limit.
pub const MAX_WORKGROUP_SIZE: u32 = 256;

/// Largest number of workgroups in one dispatch dimension.
pub const MAX_WORKGROUPS_PER_DIMENSION: u32 = 65_535;

/// Positions beyond this magnitude (either axis) trigger recentering.
pub const BOUND: f32 = 0.95;

/// Window settings used by the frame driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in physical pixels.
    pub width: u32,
    /// Initial inner height in physical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
    /// Present with vertical sync.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: String::from("SPARKFIELD"),
            vsync: true,
        }
    }
}

/// Configuration of the particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles `N`. Must be a multiple of `workgroup_size`.
    pub particle_count: u32,
    /// Seed for the initial particle state.
    pub seed: u64,
    /// Invocations per compute workgroup.
    pub workgroup_size: u32,
    /// Half-width of the centered spawn square (normalized device coords).
    pub spawn_extent: f32,
    /// Lower bound of the velocity magnitude band (units per step).
    pub speed_min: f32,
    /// Upper bound of the velocity magnitude band (units per step).
    pub speed_max: f32,
    /// Fixed luma used for every particle color.
    pub luma: f32,
    /// Upper bound of the chroma (saturation) draw.
    pub chroma_max: f32,
    /// Fixed alpha for every particle color.
    pub alpha: f32,
    /// Frame driver window.
    pub window: WindowConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 65_536,
            seed: 0x5EED,
            workgroup_size: 256,
            spawn_extent: 0.5,
            speed_min: 0.001,
            speed_max: 0.003,
            luma: 0.5,
            chroma_max: 0.5,
            alpha: 0.35,
            window: WindowConfig::default(),
        }
    }
}

impl FieldConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML, or any validation error.
    pub fn from_toml_str(text: &str) -> SparkResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigIo` if the file cannot be read, otherwise the same
    /// errors as [`FieldConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> SparkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SparkError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            "Loaded field config from {} ({} particles)",
            path.display(),
            config.particle_count
        );
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns validated defaults.
    ///
    /// # Errors
    ///
    /// Same as [`FieldConfig::load`] when the file exists.
    pub fn load_or_default(path: impl AsRef<Path>) -> SparkResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Number of workgroups one compute dispatch covers.
    ///
    /// Only meaningful for a validated config.
    #[must_use]
    pub const fn workgroup_count(&self) -> u32 {
        self.particle_count / self.workgroup_size
    }

    /// Checks every range and the divisibility precondition.
    ///
    /// # Errors
    ///
    /// `IndivisibleParticleCount` when `particle_count % workgroup_size != 0`,
    /// `InvalidConfig` for everything else.
    pub fn validate(&self) -> SparkResult<()> {
        if self.particle_count == 0 {
            return Err(SparkError::InvalidConfig(
                "particle_count must be greater than zero".into(),
            ));
        }
        if self.workgroup_size == 0 || self.workgroup_size > MAX_WORKGROUP_SIZE {
            return Err(SparkError::InvalidConfig(format!(
                "workgroup_size must be in 1..={MAX_WORKGROUP_SIZE}, got {}",
                self.workgroup_size
            )));
        }
        if self.particle_count % self.workgroup_size != 0 {
            return Err(SparkError::IndivisibleParticleCount {
                count: self.particle_count,
                workgroup_size: self.workgroup_size,
            });
        }
        if self.workgroup_count() > MAX_WORKGROUPS_PER_DIMENSION {
            return Err(SparkError::InvalidConfig(format!(
                "{} workgroups exceed the per-dispatch limit of {MAX_WORKGROUPS_PER_DIMENSION}",
                self.workgroup_count()
            )));
        }
        if !(self.spawn_extent > 0.0 && self.spawn_extent <= BOUND) {
            return Err(SparkError::InvalidConfig(format!(
                "spawn_extent must be in (0, {BOUND}], got {}",
                self.spawn_extent
            )));
        }
        if !(self.speed_min > 0.0 && self.speed_min <= self.speed_max) {
            return Err(SparkError::InvalidConfig(format!(
                "speed band must satisfy 0 < speed_min <= speed_max, got {}..{}",
                self.speed_min, self.speed_max
            )));
        }
        if !(0.0..=1.0).contains(&self.luma) {
            return Err(SparkError::InvalidConfig(format!(
                "luma must be in [0, 1], got {}",
                self.luma
            )));
        }
        if !(self.chroma_max >= 0.0 && self.chroma_max.is_finite()) {
            return Err(SparkError::InvalidConfig(format!(
                "chroma_max must be a non-negative number, got {}",
                self.chroma_max
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SparkError::InvalidConfig(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(SparkError::InvalidConfig(
                "window dimensions must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
