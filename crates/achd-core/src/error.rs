use thiserror::Error;

/// Top-level error type for the achd crates.
#[derive(Debug, Error)]
pub enum AchdError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),
}

impl AchdError {
    /// Whether this is a numerical failure (as opposed to a contract
    /// violation or a configuration problem). Callers typically answer a
    /// numerical failure with a hold or zero-torque command.
    pub const fn is_numerical(&self) -> bool {
        matches!(self, Self::Solver(e) if e.is_numerical())
    }
}

/// Configuration errors. Detected at startup, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid control dt: {0} (must be finite and > 0)")]
    InvalidControlDt(f64),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Kinematic chain construction and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Chain build failed: link '{0}' not in robot description")]
    MissingLink(String),

    #[error("Chain build failed: no joint path from '{base}' to '{tool}'")]
    NoPath { base: String, tool: String },

    #[error("Chain build failed: chain from '{base}' to '{tool}' has no segments")]
    Empty { base: String, tool: String },

    #[error("Chain build failed: joint '{joint}' has unsupported type {kind}")]
    UnsupportedJoint { joint: String, kind: String },

    #[error("Chain build failed: joint '{0}' has a zero-length axis")]
    DegenerateAxis(String),

    #[error("Link not found in chain: {0}")]
    LinkNotFound(String),
}

impl ChainError {
    /// Whether this error was raised while building a chain (as opposed to a
    /// lookup on an already built chain).
    pub const fn is_build_error(&self) -> bool {
        !matches!(self, Self::LinkNotFound(_))
    }
}

/// Robot state allocation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Invalid dimension for {what}: expected {expected}, got {got}")]
    InvalidDimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Segment index {index} out of range for {count} segments")]
    SegmentIndexOutOfRange { index: usize, count: usize },
}

/// Forward kinematics errors.
///
/// Copy + static messages for cheap propagation in the control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KinematicsError {
    #[error("Segment index {index} out of range for {count} segments")]
    SegmentIndexOutOfRange { index: usize, count: usize },

    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Constraint formulation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Constraint size mismatch: {columns} columns, {targets} targets")]
    SizeMismatch { columns: usize, targets: usize },

    #[error("Too many constraints: {0} (at most 6)")]
    TooManyConstraints(usize),

    #[error("Constraint column {column} must be a unit vector in exactly one of the linear or angular sub-spaces")]
    InvalidConstraintColumn { column: usize },

    #[error("Constraint target {index} is not finite")]
    NonFiniteTarget { index: usize },
}

/// Hybrid dynamics solver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("Solver dimension mismatch for {what}: expected {expected}, got {got}")]
    Dimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Solver diverged: {0}")]
    Divergence(&'static str),
}

impl SolverError {
    /// `true` for [`SolverError::Divergence`], `false` for contract violations.
    pub const fn is_numerical(&self) -> bool {
        matches!(self, Self::Divergence(_))
    }
}

/// State integration errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntegrationError {
    #[error("Invalid timestep: {0} (must be finite and > 0)")]
    InvalidTimestep(f64),

    #[error("Acceleration dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
