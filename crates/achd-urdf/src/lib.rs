//! URDF parsing and robot model representation for the achd controller core.
//!
//! Provides an in-memory kinematic tree (links with inertial data, joints
//! with origins and axes) that the chain builder in `achd-dynamics` walks to
//! extract a base-to-tool serial chain.

pub mod error;
pub mod parser;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::UrdfError;
pub use parser::{parse_file, parse_string};
pub use types::{Inertial, JointData, JointType, LinkData, Origin, RobotModel};
