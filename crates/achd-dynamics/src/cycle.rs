//! The per-cycle observe → solve → integrate pipeline for one robot.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, trace, warn};

use achd_core::{
    AchdError, ChainError, ConfigError, ControllerConfig, KinematicsError, StateError,
    Vector6Array,
};
use achd_urdf::UrdfError;

use crate::chain::Chain;
use crate::constraints::ConstraintSet;
use crate::integrator::integrate;
use crate::kinematics::{gravity_compensation, update_segment_states};
use crate::solver::{HybridDynamicsSolver, SolverOutput};
use crate::state::RobotState;

/// Startup failures of [`ControlCycle`] construction.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Urdf(#[from] UrdfError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

/// One robot's control core: chain, state, solver and output buffers.
///
/// The chain is shared read-only; everything else is owned by the control
/// thread driving this cycle.
#[derive(Debug)]
pub struct ControlCycle {
    chain: Arc<Chain>,
    state: RobotState,
    solver: HybridDynamicsSolver,
    output: SolverOutput,
    dt: f64,
    cycles: u64,
}

impl ControlCycle {
    /// Assemble a cycle around an existing chain and state.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidControlDt`] for a non-positive `dt`,
    /// [`StateError::InvalidDimension`] if `state` was sized for another
    /// chain.
    pub fn new(
        chain: Arc<Chain>,
        mut state: RobotState,
        root_acceleration: Vector6Array,
        dt: f64,
    ) -> Result<Self, SetupError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidControlDt(dt).into());
        }
        for (what, expected, got) in [
            ("state joints", chain.joint_count(), state.nj()),
            ("state segments", chain.segment_count(), state.ns()),
        ] {
            if expected != got {
                return Err(StateError::InvalidDimension {
                    what,
                    expected,
                    got,
                }
                .into());
            }
        }
        update_segment_states(&chain, &mut state)?;
        let solver = HybridDynamicsSolver::new(&chain, root_acceleration);
        let output = SolverOutput::for_chain(&chain);
        Ok(Self {
            chain,
            state,
            solver,
            output,
            dt,
            cycles: 0,
        })
    }

    /// Load the robot description and build a cycle from configuration.
    pub fn from_config(config: &ControllerConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let model = achd_urdf::parse_file(&config.arm.urdf_path)?;
        let chain = Chain::build(&model, &config.arm.base_link, &config.arm.tool_link)?;
        let state = RobotState::new(
            chain.joint_count(),
            chain.segment_count(),
            config.arm.initial_q(),
        )?;
        info!(
            arm = %config.arm.name,
            hz = config.control.control_hz(),
            "control cycle configured"
        );
        Self::new(
            Arc::new(chain),
            state,
            config.control.root_acceleration(),
            config.control.dt,
        )
    }

    pub fn chain(&self) -> &Arc<Chain> {
        &self.chain
    }

    pub const fn state(&self) -> &RobotState {
        &self.state
    }

    /// Mutable state, for injecting measured joint positions and velocities
    /// before [`observe`](Self::observe).
    pub fn state_mut(&mut self) -> &mut RobotState {
        &mut self.state
    }

    /// Results of the last successful [`step`](Self::step).
    pub const fn output(&self) -> &SolverOutput {
        &self.output
    }

    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of completed steps.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Forward kinematics feedback: refresh segment poses and twists from
    /// the joint arrays.
    pub fn observe(&mut self) -> Result<(), AchdError> {
        update_segment_states(&self.chain, &mut self.state)?;
        Ok(())
    }

    /// Root acceleration expressed in the tool frame at the current joint
    /// positions, for gravity-compensated constraint targets.
    pub fn gravity_compensation(&self) -> Result<Vector6Array, AchdError> {
        Ok(gravity_compensation(
            &self.chain,
            self.state.q(),
            &self.solver.root_acceleration(),
        )?)
    }

    /// Solve, integrate and observe once.
    ///
    /// On a solver failure the joint arrays are left untouched so the caller
    /// can hold position or command zero torque.
    pub fn step(
        &mut self,
        constraints: &ConstraintSet,
        ff_tau: &[f64],
        f_ext: &[Vector6Array],
    ) -> Result<&SolverOutput, AchdError> {
        let solved = self.solver.solve(
            &self.chain,
            constraints,
            self.state.q(),
            self.state.qd(),
            ff_tau,
            f_ext,
            &mut self.output,
        );
        if let Err(err) = solved {
            if err.is_numerical() {
                warn!(cycle = self.cycles, error = %err, "hybrid dynamics solve diverged");
            }
            return Err(err.into());
        }

        for (i, acc) in self.output.segment_accelerations().iter().enumerate() {
            self.state.set_segment_acceleration(i, *acc)?;
        }
        integrate(&mut self.state, self.output.predicted_acc(), self.dt)?;
        self.observe()?;
        self.cycles += 1;
        trace!(cycle = self.cycles, nc = constraints.count(), "control cycle step");
        Ok(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::build_axis_constraints;
    use achd_core::{ArmConfig, CartesianAxis, ControlConfig, LoggingConfig};
    use achd_test_utils::urdf::{write_fixture, PENDULUM_WITH_TOOL};
    use achd_urdf::parse_string;
    use approx::assert_relative_eq;

    fn pendulum_cycle(dt: f64) -> ControlCycle {
        let model = parse_string(PENDULUM_WITH_TOOL).unwrap();
        let chain = Arc::new(Chain::build(&model, "base", "tool").unwrap());
        let state = RobotState::new(1, 2, None).unwrap();
        ControlCycle::new(chain, state, [0.0, 9.81, 0.0, 0.0, 0.0, 0.0], dt).unwrap()
    }

    #[test]
    fn construction_observes_initial_pose() {
        let cycle = pendulum_cycle(0.001);
        assert_relative_eq!(cycle.state().tool_pose()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cycle.state().tool_pose()[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn invalid_dt_is_rejected() {
        let model = parse_string(PENDULUM_WITH_TOOL).unwrap();
        let chain = Arc::new(Chain::build(&model, "base", "tool").unwrap());
        let state = RobotState::new(1, 2, None).unwrap();
        let err = ControlCycle::new(chain, state, [0.0; 6], 0.0).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Config(ConfigError::InvalidControlDt(_))
        ));
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let model = parse_string(PENDULUM_WITH_TOOL).unwrap();
        let chain = Arc::new(Chain::build(&model, "base", "tool").unwrap());
        let state = RobotState::new(1, 1, None).unwrap();
        assert!(matches!(
            ControlCycle::new(chain, state, [0.0; 6], 0.001),
            Err(SetupError::State(StateError::InvalidDimension { .. }))
        ));
    }

    #[test]
    fn step_integrates_constrained_acceleration() {
        let mut cycle = pendulum_cycle(0.01);
        let constraints = build_axis_constraints(&[CartesianAxis::AngularZ], &[2.0], None).unwrap();
        let f_ext = [[0.0; 6]; 2];
        cycle.step(&constraints, &[0.0], &f_ext).unwrap();

        assert_relative_eq!(cycle.state().qdd()[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(cycle.state().qd()[0], 0.02, epsilon = 1e-9);
        assert_relative_eq!(cycle.state().q()[0], 0.0002, epsilon = 1e-9);
        assert_relative_eq!(cycle.state().tool_twist()[5], 0.02, epsilon = 1e-9);
        assert_relative_eq!(cycle.state().tool_acceleration()[5], 2.0, epsilon = 1e-9);
        assert_eq!(cycle.cycles(), 1);
    }

    #[test]
    fn failed_solve_leaves_joints_untouched() {
        let mut cycle = pendulum_cycle(0.01);
        cycle.state_mut().qd_mut()[0] = 0.5;
        let before = cycle.state().clone();
        let err = cycle
            .step(&ConstraintSet::empty(), &[0.0, 1.0], &[[0.0; 6]; 2])
            .unwrap_err();
        assert!(matches!(err, AchdError::Solver(_)));
        assert_eq!(cycle.state().q(), before.q());
        assert_eq!(cycle.state().qd(), before.qd());
        assert_eq!(cycle.cycles(), 0);
    }

    #[test]
    fn gravity_compensation_uses_current_configuration() {
        let cycle = pendulum_cycle(0.001);
        let g = cycle.gravity_compensation().unwrap();
        assert_relative_eq!(g[1], 9.81, epsilon = 1e-12);
    }

    #[test]
    fn from_config_loads_urdf() {
        let path = write_fixture("cycle_from_config", PENDULUM_WITH_TOOL).unwrap();
        let config = ControllerConfig {
            control: ControlConfig {
                dt: 0.002,
                gravity: [0.0, -9.81, 0.0],
            },
            arm: ArmConfig {
                name: "pendulum".into(),
                urdf_path: path,
                base_link: "base".into(),
                tool_link: "tool".into(),
                initial_joint_positions: vec![0.25],
            },
            logging: LoggingConfig::default(),
        };
        let cycle = ControlCycle::from_config(&config).unwrap();
        assert_eq!(cycle.state().q(), &[0.25]);
        assert_relative_eq!(cycle.dt(), 0.002);
        assert_eq!(cycle.chain().joint_count(), 1);
    }

    #[test]
    fn from_config_reports_missing_links() {
        let path = write_fixture("cycle_missing_link", PENDULUM_WITH_TOOL).unwrap();
        let config = ControllerConfig {
            control: ControlConfig::default(),
            arm: ArmConfig {
                name: "pendulum".into(),
                urdf_path: path,
                base_link: "base".into(),
                tool_link: "gripper".into(),
                initial_joint_positions: Vec::new(),
            },
            logging: LoggingConfig::default(),
        };
        assert!(matches!(
            ControlCycle::from_config(&config),
            Err(SetupError::Chain(ChainError::MissingLink(_)))
        ));
    }
}
