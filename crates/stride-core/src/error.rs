use thiserror::Error;

/// Top-level error type for the stride crates.
#[derive(Debug, Error)]
pub enum StrideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),
}

/// Evaluation of a function outside its domain.
///
/// Copy + no allocation for cheap propagation out of the control tick.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("Argument is out of function range: it should be {lower} <= {t} <= {upper}")]
    OutOfRange { t: f64, lower: f64, upper: f64 },

    #[error("No segment registered to evaluate t = {t}")]
    NoSegment { t: f64 },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid horizon_dt: {0} (must be > 0)")]
    InvalidHorizonDt(f64),

    #[error("Invalid horizon_duration: {0} (must be > 0)")]
    InvalidHorizonDuration(f64),

    #[error("Horizon of {duration}s with dt {dt}s yields no steps")]
    EmptyHorizon { duration: f64, dt: f64 },

    #[error("Invalid robot mass: {0} (must be > 0)")]
    InvalidMass(f64),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Control-loop sequencing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("Centroidal manager is not active; call reset() first")]
    NotActive,

    #[error("Warm start has {got} inputs, horizon expects {expected}")]
    WarmStartMismatch { expected: usize, got: usize },
}
