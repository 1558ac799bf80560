// stride-core: Errors, configuration and constants for the stride balance controller.

pub mod config;
pub mod constants;
pub mod error;

pub mod prelude {
    pub use crate::config::{CentroidalConfig, DdpWeights};
    pub use crate::constants::GRAVITY;
    pub use crate::error::{ConfigError, ControlError, DomainError, StrideError};
}
