//! Configuration of the `stride` driver.
//!
//! ```toml
//! robotMass = 45.0
//! autoStartTime = 0.5
//!
//! [centroidal]
//! horizonDuration = 2.0
//! horizonDt = 0.02
//!
//! [walk]
//! stepCount = 6
//! stepLength = 0.2
//! ```

use serde::{Deserialize, Serialize};
use stride_core::config::CentroidalConfig;
use stride_core::error::ConfigError;

const fn default_robot_mass() -> f64 {
    45.0
}
const fn default_control_dt() -> f64 {
    0.005
}

/// Top-level driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Total robot mass in kilograms.
    #[serde(default = "default_robot_mass")]
    pub robot_mass: f64,

    /// Controller period in seconds.
    #[serde(default = "default_control_dt")]
    pub control_dt: f64,

    /// Start balancing automatically once the clock passes this time.
    /// Without it the manager is reset on the first tick.
    #[serde(default)]
    pub auto_start_time: Option<f64>,

    #[serde(default)]
    pub centroidal: CentroidalConfig,

    #[serde(default)]
    pub walk: WalkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            robot_mass: default_robot_mass(),
            control_dt: default_control_dt(),
            auto_start_time: None,
            centroidal: CentroidalConfig::default(),
            walk: WalkConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.robot_mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.robot_mass));
        }
        if !(self.control_dt > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "controlDt".into(),
                message: format!("{} (must be > 0)", self.control_dt),
            });
        }
        if let Some(t) = self.auto_start_time {
            if !t.is_finite() || t < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "autoStartTime".into(),
                    message: format!("{t} (must be finite and >= 0)"),
                });
            }
        }
        self.centroidal.validate()?;
        self.walk.validate()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

const fn default_step_count() -> u32 {
    4
}
const fn default_step_length() -> f64 {
    0.15
}
const fn default_step_width() -> f64 {
    0.2
}
const fn default_step_duration() -> f64 {
    0.8
}
const fn default_transfer_duration() -> f64 {
    0.2
}
const fn default_settle_duration() -> f64 {
    1.0
}

/// Straight walk used to build the ZMP reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkConfig {
    /// Number of footsteps.
    #[serde(default = "default_step_count")]
    pub step_count: u32,
    /// Forward advance per footstep (m).
    #[serde(default = "default_step_length")]
    pub step_length: f64,
    /// Lateral distance between the feet (m).
    #[serde(default = "default_step_width")]
    pub step_width: f64,
    /// Time from one footstep to the next (s).
    #[serde(default = "default_step_duration")]
    pub step_duration: f64,
    /// Time the ZMP takes to move between feet (s).
    #[serde(default = "default_transfer_duration")]
    pub transfer_duration: f64,
    /// Standing time before the first and after the last footstep (s).
    #[serde(default = "default_settle_duration")]
    pub settle_duration: f64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            step_count: default_step_count(),
            step_length: default_step_length(),
            step_width: default_step_width(),
            step_duration: default_step_duration(),
            transfer_duration: default_transfer_duration(),
            settle_duration: default_settle_duration(),
        }
    }
}

impl WalkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.transfer_duration > 0.0 && self.transfer_duration < self.step_duration) {
            return Err(ConfigError::InvalidValue {
                field: "walk.transferDuration".into(),
                message: format!(
                    "{} (must be > 0 and < stepDuration {})",
                    self.transfer_duration, self.step_duration
                ),
            });
        }
        if !(self.settle_duration >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "walk.settleDuration".into(),
                message: format!("{} (must be >= 0)", self.settle_duration),
            });
        }
        if !self.step_length.is_finite() || !self.step_width.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "walk".into(),
                message: "step length and width must be finite".into(),
            });
        }
        Ok(())
    }
}
