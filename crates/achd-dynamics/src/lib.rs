//! Constraint-based hybrid dynamics control core.
//!
//! Once per control cycle a manipulator controller observes its Cartesian
//! state through forward kinematics, formulates tool-frame constraints,
//! solves the constrained dynamics and integrates the result:
//!
//! ```text
//! Chain + RobotState ──► kinematics ──► constraints ──► solver ──► integrator ──┐
//!        ▲                                                                      │
//!        └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`ControlCycle`] runs this pipeline for one robot; the individual stages
//! are usable on their own.

pub mod chain;
pub mod constraints;
pub mod cycle;
pub mod integrator;
pub mod kinematics;
pub mod solver;
pub mod spatial;
pub mod state;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use chain::{Chain, Joint, JointKind, Segment};
pub use constraints::{build_axis_constraints, build_constraints, ConstraintSet, MAX_CONSTRAINTS};
pub use cycle::{ControlCycle, SetupError};
pub use integrator::integrate;
pub use kinematics::{
    compute_frame, compute_pose, compute_twist, compute_twist_of_link, gravity_compensation,
    update_segment_states, Pose, SegmentSelector,
};
pub use solver::{HybridDynamicsSolver, SolverOutput};
pub use spatial::RigidBodyInertia;
pub use state::RobotState;
