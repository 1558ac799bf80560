use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_name() -> String {
    "CentroidalManager".into()
}
const fn default_horizon_duration() -> f64 {
    2.0
}
const fn default_horizon_dt() -> f64 {
    0.02
}
const fn default_ddp_max_iter() -> u32 {
    3
}
const fn default_ref_com_z() -> f64 {
    0.825
}

/// Tolerance absorbing floating-point error in `duration / dt` before
/// truncating to a step count (e.g. `1.0 / 0.02`).
const STEP_COUNT_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// CentroidalConfig
// ---------------------------------------------------------------------------

/// Configuration of the centroidal manager and its ZMP planner.
///
/// Keys use the camelCase names of the controller configuration files:
///
/// ```toml
/// name = "CentroidalManager"
/// horizonDuration = 2.0
/// horizonDt = 0.02
/// ddpMaxIter = 3
/// refComZ = 0.825
///
/// [weights]
/// runningZmp = 10.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentroidalConfig {
    /// Prefix for monitoring entries.
    #[serde(default = "default_name")]
    pub name: String,

    /// Prediction horizon span in seconds.
    #[serde(default = "default_horizon_duration")]
    pub horizon_duration: f64,

    /// Horizon discretization step in seconds.
    #[serde(default = "default_horizon_dt")]
    pub horizon_dt: f64,

    /// Iteration cap of the DDP solver per tick.
    #[serde(default = "default_ddp_max_iter")]
    pub ddp_max_iter: u32,

    /// Target CoM height in meters.
    #[serde(default = "default_ref_com_z")]
    pub ref_com_z: f64,

    /// Cost weights of the ZMP planner.
    #[serde(default)]
    pub weights: DdpWeights,
}

impl Default for CentroidalConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            horizon_duration: default_horizon_duration(),
            horizon_dt: default_horizon_dt(),
            ddp_max_iter: default_ddp_max_iter(),
            ref_com_z: default_ref_com_z(),
            weights: DdpWeights::default(),
        }
    }
}

impl CentroidalConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.horizon_dt > 0.0) {
            return Err(ConfigError::InvalidHorizonDt(self.horizon_dt));
        }
        if !(self.horizon_duration > 0.0) {
            return Err(ConfigError::InvalidHorizonDuration(self.horizon_duration));
        }
        if self.horizon_steps() == 0 {
            return Err(ConfigError::EmptyHorizon {
                duration: self.horizon_duration,
                dt: self.horizon_dt,
            });
        }
        if self.ddp_max_iter == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ddpMaxIter".into(),
                message: "must be >= 1".into(),
            });
        }
        if !(self.ref_com_z > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "refComZ".into(),
                message: format!("{} (must be > 0)", self.ref_com_z),
            });
        }
        self.weights.validate()
    }

    /// Number of prediction steps, `horizon_duration / horizon_dt` truncated.
    ///
    /// Returns 0 for non-positive or non-finite inputs; [`validate`](Self::validate)
    /// rejects those.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn horizon_steps(&self) -> usize {
        let ratio = self.horizon_duration / self.horizon_dt;
        if ratio.is_finite() && ratio > 0.0 {
            (ratio + STEP_COUNT_EPS).floor() as usize
        } else {
            0
        }
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// DdpWeights
// ---------------------------------------------------------------------------

const fn default_running_zmp() -> f64 {
    1e1
}
const fn default_running_force_z() -> f64 {
    1e-4
}
const fn default_running_com_z() -> f64 {
    1e2
}
const fn default_running_vel_z() -> f64 {
    1e0
}
const fn default_terminal_com_z() -> f64 {
    1e2
}
const fn default_terminal_vel() -> f64 {
    1e0
}

/// Quadratic cost weights of the ZMP planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdpWeights {
    /// Horizontal ZMP tracking error.
    #[serde(default = "default_running_zmp")]
    pub running_zmp: f64,
    /// Deviation of the vertical force from `m g`.
    #[serde(default = "default_running_force_z")]
    pub running_force_z: f64,
    /// CoM height tracking error.
    #[serde(default = "default_running_com_z")]
    pub running_com_z: f64,
    /// Vertical CoM velocity.
    #[serde(default = "default_running_vel_z")]
    pub running_vel_z: f64,
    /// CoM height error at the end of the horizon.
    #[serde(default = "default_terminal_com_z")]
    pub terminal_com_z: f64,
    /// CoM velocity (all axes) at the end of the horizon.
    #[serde(default = "default_terminal_vel")]
    pub terminal_vel: f64,
}

impl Default for DdpWeights {
    fn default() -> Self {
        Self {
            running_zmp: default_running_zmp(),
            running_force_z: default_running_force_z(),
            running_com_z: default_running_com_z(),
            running_vel_z: default_running_vel_z(),
            terminal_com_z: default_terminal_com_z(),
            terminal_vel: default_terminal_vel(),
        }
    }
}

impl DdpWeights {
    /// All weights must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("weights.runningZmp", self.running_zmp),
            ("weights.runningForceZ", self.running_force_z),
            ("weights.runningComZ", self.running_com_z),
            ("weights.runningVelZ", self.running_vel_z),
            ("weights.terminalComZ", self.terminal_com_z),
            ("weights.terminalVel", self.terminal_vel),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("{value} (must be finite and >= 0)"),
                });
            }
        }
        Ok(())
    }
}
