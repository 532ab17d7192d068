//! Row types written by the CSV sinks.

use serde::{Deserialize, Serialize};

use achd_core::{CartesianAxis, Vector6Array};
use achd_dynamics::{ConstraintSet, RobotState, SolverOutput};

use crate::error::RecordError;

/// Header of every control log.
pub const CONTROL_HEADER: &str = "Reference Value,Measured Value,Control Signal";

// ---------------------------------------------------------------------------
// ControlSample
// ---------------------------------------------------------------------------

/// One evaluation of a control law on a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlSample {
    pub reference: f64,
    pub measured: f64,
    /// Output of the control law, typically a constraint target.
    pub control: f64,
}

impl ControlSample {
    pub const fn new(reference: f64, measured: f64, control: f64) -> Self {
        Self {
            reference,
            measured,
            control,
        }
    }

    /// Values in [`CONTROL_HEADER`] column order.
    pub const fn fields(&self) -> [f64; 3] {
        [self.reference, self.measured, self.control]
    }
}

// ---------------------------------------------------------------------------
// ManipulatorFrame
// ---------------------------------------------------------------------------

/// Snapshot of one arm after a control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulatorFrame {
    /// Tool pose: position + roll/pitch/yaw.
    pub tool_pose: Vector6Array,
    pub tool_twist: Vector6Array,
    /// Wrench measured at the tool, tool frame.
    pub tool_wrench_measured: Vector6Array,
    /// Constraint targets, zero-padded to six.
    pub beta: Vector6Array,
    /// Commanded joint torques: feed-forward plus constraint torque.
    pub joint_torques: Vec<f64>,
    /// Constraint wrench on the tool, tool frame.
    pub tool_wrench_command: Vector6Array,
}

impl ManipulatorFrame {
    /// Collect a frame from the state, constraints and solver output of a
    /// completed cycle.
    ///
    /// # Errors
    ///
    /// [`RecordError::JointCount`] if `ff_tau` does not have one entry per
    /// joint of `output`.
    pub fn capture(
        state: &RobotState,
        constraints: &ConstraintSet,
        output: &SolverOutput,
        ff_tau: &[f64],
        tool_wrench_measured: Vector6Array,
    ) -> Result<Self, RecordError> {
        let nj = output.constraint_tau().len();
        if ff_tau.len() != nj {
            return Err(RecordError::JointCount {
                expected: nj,
                got: ff_tau.len(),
            });
        }
        let joint_torques = ff_tau
            .iter()
            .zip(output.constraint_tau())
            .map(|(ff, c)| ff + c)
            .collect();
        Ok(Self {
            tool_pose: *state.tool_pose(),
            tool_twist: *state.tool_twist(),
            tool_wrench_measured,
            beta: constraints.padded_beta(),
            joint_torques,
            tool_wrench_command: *output.constraint_wrench(),
        })
    }

    /// Values in [`manipulator_header`] column order.
    pub fn fields(&self) -> impl Iterator<Item = f64> + '_ {
        self.tool_pose
            .iter()
            .chain(&self.tool_twist)
            .chain(&self.tool_wrench_measured)
            .chain(&self.beta)
            .chain(&self.joint_torques)
            .chain(&self.tool_wrench_command)
            .copied()
    }
}

/// Manipulator log header for an arm with `nj` joints.
pub fn manipulator_header(nj: usize) -> String {
    let mut columns: Vec<String> = Vec::with_capacity(30 + nj);
    for prefix in ["ee_s", "ee_twist", "ee_f_e", "ee_beta"] {
        columns.extend(
            CartesianAxis::ALL
                .iter()
                .map(|axis| format!("{prefix}_{}", axis.label())),
        );
    }
    columns.extend((1..=nj).map(|j| format!("tau_c_{j}")));
    columns.extend(
        CartesianAxis::ALL
            .iter()
            .map(|axis| format!("ee_f_c_{}", axis.label())),
    );
    columns.join(",")
}
