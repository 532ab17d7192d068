// achd-core: errors, configuration and axis conventions shared by the achd crates.

pub mod axis;
pub mod config;
pub mod error;

pub use axis::{CartesianAxis, Vector6Array};
pub use config::{ArmConfig, ControlConfig, ControllerConfig, LoggingConfig};
pub use error::{
    AchdError, ChainError, ConfigError, ConstraintError, IntegrationError, KinematicsError,
    SolverError, StateError,
};
