//! Constrained hybrid dynamics on a serial chain.
//!
//! Given joint positions and velocities, feed-forward joint torques,
//! per-segment external wrenches and a [`ConstraintSet`] on the tool frame,
//! [`HybridDynamicsSolver::solve`] computes joint accelerations that satisfy
//! `alphaᵀ · a_tool = beta` together with the joint torques the constraint
//! forces induce.
//!
//! The algorithm is the articulated-body recursion extended with one unit
//! response per constraint:
//!
//! 1. Outward: transforms, velocities, velocity-product accelerations and
//!    bias forces (external wrenches subtracted).
//! 2. Inward: articulated inertias and bias forces, feed-forward torque
//!    folded in at each joint.
//! 3. Outward: unconstrained accelerations, starting from the root
//!    acceleration (gravity).
//! 4. For every constraint column, an inward/outward sweep of the unit tool
//!    wrench gives its effect on the joint and tool accelerations.
//! 5. The `nc x nc` constraint-space system is solved for the constraint
//!    magnitudes, which are mapped back to joint torques.
//!
//! All working storage is sized in [`HybridDynamicsSolver::new`]; a solve
//! performs no heap allocation.

use nalgebra::{Matrix6, Vector6};
use tracing::trace;

use achd_core::{SolverError, Vector6Array};

use crate::chain::Chain;
use crate::constraints::{ConstraintSet, MAX_CONSTRAINTS};
use crate::spatial::{force_cross, motion_cross, motion_transform};

/// Articulated inertia along a joint axis below which the joint is treated
/// as having no inertia to accelerate.
const MIN_JOINT_INERTIA: f64 = 1e-12;

/// Relative singular value cutoff for the constraint-space solve.
const CONSTRAINT_RCOND: f64 = 1e-12;

// ---------------------------------------------------------------------------
// SolverOutput
// ---------------------------------------------------------------------------

/// Result arrays of one solve, owned by the caller and reused every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    predicted_acc: Vec<f64>,
    constraint_tau: Vec<f64>,
    segment_accelerations: Vec<Vector6Array>,
    constraint_magnitudes: Vector6Array,
    constraint_wrench: Vector6Array,
}

impl SolverOutput {
    /// Zeroed output for a chain with `nj` joints and `ns` segments.
    pub fn new(nj: usize, ns: usize) -> Self {
        Self {
            predicted_acc: vec![0.0; nj],
            constraint_tau: vec![0.0; nj],
            segment_accelerations: vec![[0.0; 6]; ns],
            constraint_magnitudes: [0.0; 6],
            constraint_wrench: [0.0; 6],
        }
    }

    pub fn for_chain(chain: &Chain) -> Self {
        Self::new(chain.joint_count(), chain.segment_count())
    }

    /// Joint accelerations satisfying the dynamics and the constraints.
    pub fn predicted_acc(&self) -> &[f64] {
        &self.predicted_acc
    }

    /// Joint torques produced by the constraint forces alone.
    pub fn constraint_tau(&self) -> &[f64] {
        &self.constraint_tau
    }

    /// Spatial acceleration of every segment in its own frame, gravity
    /// included as root acceleration.
    pub fn segment_accelerations(&self) -> &[Vector6Array] {
        &self.segment_accelerations
    }

    /// Magnitude of each constraint force, padded to six entries.
    pub const fn constraint_magnitudes(&self) -> &Vector6Array {
        &self.constraint_magnitudes
    }

    /// Total constraint wrench on the tool, tool frame.
    pub const fn constraint_wrench(&self) -> &Vector6Array {
        &self.constraint_wrench
    }
}

// ---------------------------------------------------------------------------
// HybridDynamicsSolver
// ---------------------------------------------------------------------------

/// Per-segment terms of the recursion.
#[derive(Debug, Clone)]
struct SegmentTerms {
    joint: Option<usize>,
    /// Parent-to-segment motion transform.
    x: Matrix6<f64>,
    /// Motion subspace.
    s: Vector6<f64>,
    /// Velocity-product acceleration.
    c: Vector6<f64>,
    /// Articulated inertia, before projection across the joint.
    ia: Matrix6<f64>,
    /// Articulated bias force.
    p: Vector6<f64>,
    /// `ia * s`
    big_u: Vector6<f64>,
    /// `sᵀ * ia * s`
    d: f64,
}

impl SegmentTerms {
    fn zero() -> Self {
        Self {
            joint: None,
            x: Matrix6::identity(),
            s: Vector6::zeros(),
            c: Vector6::zeros(),
            ia: Matrix6::zeros(),
            p: Vector6::zeros(),
            big_u: Vector6::zeros(),
            d: 0.0,
        }
    }
}

/// Preallocated hybrid dynamics solver for one chain.
#[derive(Debug, Clone)]
pub struct HybridDynamicsSolver {
    nj: usize,
    root_acceleration: Vector6<f64>,
    terms: Vec<SegmentTerms>,
    /// Joint force terms of the free solve, per segment.
    u_free: Vec<f64>,
    /// Joint force terms of the current unit response, per segment.
    u_unit: Vec<f64>,
    /// Inward force accumulator for unit responses and torque mapping.
    forces: Vec<Vector6<f64>>,
    /// Segment accelerations scratch.
    accelerations: Vec<Vector6<f64>>,
    qdd_free: Vec<f64>,
    /// Joint acceleration response per constraint, `nj` entries each.
    qdd_unit: Vec<f64>,
    tool_acc_unit: [Vector6<f64>; MAX_CONSTRAINTS],
}

impl HybridDynamicsSolver {
    /// Size a solver for `chain`.
    ///
    /// `root_acceleration` is the fictitious base acceleration modelling
    /// gravity, `-g` (see [`ControlConfig::root_acceleration`](achd_core::ControlConfig::root_acceleration)).
    pub fn new(chain: &Chain, root_acceleration: Vector6Array) -> Self {
        let nj = chain.joint_count();
        let ns = chain.segment_count();
        Self {
            nj,
            root_acceleration: Vector6::from(root_acceleration),
            terms: vec![SegmentTerms::zero(); ns],
            u_free: vec![0.0; ns],
            u_unit: vec![0.0; ns],
            forces: vec![Vector6::zeros(); ns],
            accelerations: vec![Vector6::zeros(); ns],
            qdd_free: vec![0.0; nj],
            qdd_unit: vec![0.0; nj * MAX_CONSTRAINTS],
            tool_acc_unit: [Vector6::zeros(); MAX_CONSTRAINTS],
        }
    }

    pub fn root_acceleration(&self) -> Vector6Array {
        self.root_acceleration.into()
    }

    pub fn set_root_acceleration(&mut self, root_acceleration: Vector6Array) {
        self.root_acceleration = Vector6::from(root_acceleration);
    }

    /// Solve the constrained dynamics for one cycle, writing into `out`.
    ///
    /// `f_ext[i]` is the wrench the environment applies to segment `i`,
    /// expressed in that segment's frame about its origin.
    ///
    /// # Errors
    ///
    /// [`SolverError::Dimension`] if any array does not match the chain, and
    /// [`SolverError::Divergence`] if a moving joint has no inertia, the
    /// constraint system cannot be solved, or a result is not finite. `out`
    /// holds partial results after an error and must not be used.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &mut self,
        chain: &Chain,
        constraints: &ConstraintSet,
        q: &[f64],
        qd: &[f64],
        ff_tau: &[f64],
        f_ext: &[Vector6Array],
        out: &mut SolverOutput,
    ) -> Result<(), SolverError> {
        let nj = self.nj;
        let ns = self.terms.len();
        check("chain joints", nj, chain.joint_count())?;
        check("chain segments", ns, chain.segment_count())?;
        check("joint positions", nj, q.len())?;
        check("joint velocities", nj, qd.len())?;
        check("feed-forward torque", nj, ff_tau.len())?;
        check("external wrenches", ns, f_ext.len())?;
        check("predicted acceleration", nj, out.predicted_acc.len())?;
        check("constraint torque", nj, out.constraint_tau.len())?;
        check("segment accelerations", ns, out.segment_accelerations.len())?;

        self.sweep_velocities(chain, q, qd, f_ext);
        self.sweep_articulated(ff_tau)?;
        outward(
            &self.terms,
            &self.root_acceleration,
            true,
            &self.u_free,
            &mut self.accelerations,
            &mut self.qdd_free,
        );
        let tip = ns - 1;
        let tool_acc_free = self.accelerations[tip];

        let nc = constraints.count();
        for k in 0..nc {
            let column = constraints.alpha().column(k).into_owned();
            self.sweep_unit_response(&column, k);
        }

        // Constraint-space system, padded to 6x6 with identity.
        let alpha = constraints.alpha();
        let mut lambda = Matrix6::<f64>::identity();
        let mut rhs = Vector6::<f64>::zeros();
        for i in 0..nc {
            let column = alpha.column(i);
            for k in 0..nc {
                lambda[(i, k)] = column.dot(&self.tool_acc_unit[k]);
            }
            rhs[i] = constraints.beta()[i] - column.dot(&tool_acc_free);
        }
        let nu = solve_constraint_system(lambda, &rhs)?;

        let mut wrench = Vector6::<f64>::zeros();
        for k in 0..nc {
            wrench += alpha.column(k) * nu[k];
        }

        out.predicted_acc.copy_from_slice(&self.qdd_free);
        for k in 0..nc {
            let response = &self.qdd_unit[k * nj..(k + 1) * nj];
            for (acc, delta) in out.predicted_acc.iter_mut().zip(response) {
                *acc += nu[k] * delta;
            }
        }

        // Constraint torque: Jᵀ F with F applied at the tool.
        let mut force = wrench;
        for (i, t) in self.terms.iter().enumerate().rev() {
            if let Some(j) = t.joint {
                out.constraint_tau[j] = t.s.dot(&force);
            }
            if i > 0 {
                force = t.x.transpose() * force;
            }
        }

        // Segment accelerations from the final joint accelerations.
        let mut parent = self.root_acceleration;
        for (t, acc) in self.terms.iter().zip(out.segment_accelerations.iter_mut()) {
            let mut a = t.x * parent + t.c;
            if let Some(j) = t.joint {
                a += t.s * out.predicted_acc[j];
            }
            *acc = a.into();
            parent = a;
        }
        out.constraint_magnitudes = nu.into();
        out.constraint_wrench = wrench.into();

        if !out.predicted_acc.iter().all(|v| v.is_finite()) {
            return Err(SolverError::Divergence("non-finite joint acceleration"));
        }
        if !out.constraint_tau.iter().all(|v| v.is_finite()) {
            return Err(SolverError::Divergence("non-finite constraint torque"));
        }
        trace!(nc, "hybrid dynamics solved");
        Ok(())
    }

    /// Pass 1: kinematics, velocity-product terms and bias forces.
    fn sweep_velocities(&mut self, chain: &Chain, q: &[f64], qd: &[f64], f_ext: &[Vector6Array]) {
        let mut v_parent = Vector6::zeros();
        for (i, (segment, t)) in chain.segments().iter().zip(&mut self.terms).enumerate() {
            t.joint = chain.joint_index_of(i);
            t.x = motion_transform(&segment.pose(chain.segment_q(i, q)));
            t.s = segment.joint().motion_subspace();
            let v_joint = t.s * t.joint.map_or(0.0, |j| qd[j]);
            let v = t.x * v_parent + v_joint;
            t.c = motion_cross(&v) * v_joint;
            let inertia = segment.spatial_inertia();
            t.ia = *inertia;
            t.p = force_cross(&v) * (inertia * v) - Vector6::from(f_ext[i]);
            v_parent = v;
        }
    }

    /// Pass 2: articulated inertias and bias forces, tip to root.
    fn sweep_articulated(&mut self, ff_tau: &[f64]) -> Result<(), SolverError> {
        for i in (0..self.terms.len()).rev() {
            let t = &mut self.terms[i];
            let (ia, pa) = if let Some(j) = t.joint {
                t.big_u = t.ia * t.s;
                t.d = t.s.dot(&t.big_u);
                if t.d.is_nan() || t.d <= MIN_JOINT_INERTIA {
                    return Err(SolverError::Divergence(
                        "moving joint without articulated inertia",
                    ));
                }
                let u = ff_tau[j] - t.s.dot(&t.p);
                self.u_free[i] = u;
                let ia = t.ia - t.big_u * t.big_u.transpose() / t.d;
                let pa = t.p + ia * t.c + t.big_u * (u / t.d);
                (ia, pa)
            } else {
                (t.ia, t.p + t.ia * t.c)
            };
            if i > 0 {
                let xt = t.x.transpose();
                let (ia_parent, p_parent) = (xt * ia * t.x, xt * pa);
                let parent = &mut self.terms[i - 1];
                parent.ia += ia_parent;
                parent.p += p_parent;
            }
        }
        Ok(())
    }

    /// Pass 4: joint and tool acceleration caused by a unit wrench `column`
    /// on the tool, stored as response `k`.
    fn sweep_unit_response(&mut self, column: &Vector6<f64>, k: usize) {
        let tip = self.terms.len() - 1;
        self.forces.fill(Vector6::zeros());
        self.forces[tip] = -column;
        for i in (0..self.terms.len()).rev() {
            let t = &self.terms[i];
            let p = self.forces[i];
            let pa = if t.joint.is_some() {
                let u = -t.s.dot(&p);
                self.u_unit[i] = u;
                p + t.big_u * (u / t.d)
            } else {
                p
            };
            if i > 0 {
                self.forces[i - 1] += t.x.transpose() * pa;
            }
        }
        let nj = self.nj;
        outward(
            &self.terms,
            &Vector6::zeros(),
            false,
            &self.u_unit,
            &mut self.accelerations,
            &mut self.qdd_unit[k * nj..(k + 1) * nj],
        );
        self.tool_acc_unit[k] = self.accelerations[tip];
    }
}

/// Outward acceleration sweep. `joint_force[i]` is the projected joint force
/// of segment `i`; velocity-product terms are included when `with_bias`.
fn outward(
    terms: &[SegmentTerms],
    root: &Vector6<f64>,
    with_bias: bool,
    joint_force: &[f64],
    accelerations: &mut [Vector6<f64>],
    qdd: &mut [f64],
) {
    let mut parent = *root;
    for (i, t) in terms.iter().enumerate() {
        let mut a = t.x * parent;
        if with_bias {
            a += t.c;
        }
        if let Some(j) = t.joint {
            qdd[j] = (joint_force[i] - t.big_u.dot(&a)) / t.d;
            a += t.s * qdd[j];
        }
        accelerations[i] = a;
        parent = a;
    }
}

/// Least-squares solve of the padded constraint-space system. Directions the
/// chain cannot accelerate get zero magnitude.
fn solve_constraint_system(
    lambda: Matrix6<f64>,
    rhs: &Vector6<f64>,
) -> Result<Vector6<f64>, SolverError> {
    if !lambda.iter().chain(rhs.iter()).all(|v| v.is_finite()) {
        return Err(SolverError::Divergence("non-finite constraint system"));
    }
    let svd = lambda.svd(true, true);
    let eps = CONSTRAINT_RCOND * svd.singular_values.max().max(1.0);
    svd.solve(rhs, eps)
        .map_err(|_| SolverError::Divergence("constraint system solve failed"))
}

fn check(what: &'static str, expected: usize, got: usize) -> Result<(), SolverError> {
    if expected == got {
        Ok(())
    } else {
        Err(SolverError::Dimension {
            what,
            expected,
            got,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Joint, Segment};
    use crate::constraints::{build_axis_constraints, build_constraints};
    use crate::spatial::RigidBodyInertia;
    use achd_core::CartesianAxis;
    use achd_test_utils::urdf::{PENDULUM, TWO_LINK_PLANAR};
    use achd_urdf::parse_string;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Matrix2, Vector2, Vector3};

    const NO_GRAVITY: Vector6Array = [0.0; 6];
    /// Gravity along -y, the pendulum swings in the xy plane.
    const GRAVITY_Y: Vector6Array = [0.0, 9.81, 0.0, 0.0, 0.0, 0.0];

    fn chain(xml: &str, tool: &str) -> Chain {
        Chain::build(&parse_string(xml).unwrap(), "base", tool).unwrap()
    }

    struct Fixture {
        chain: Chain,
        solver: HybridDynamicsSolver,
        out: SolverOutput,
        f_ext: Vec<Vector6Array>,
    }

    impl Fixture {
        fn new(chain: Chain, root: Vector6Array) -> Self {
            let solver = HybridDynamicsSolver::new(&chain, root);
            let out = SolverOutput::for_chain(&chain);
            let f_ext = vec![[0.0; 6]; chain.segment_count()];
            Self {
                chain,
                solver,
                out,
                f_ext,
            }
        }

        fn solve(
            &mut self,
            constraints: &ConstraintSet,
            q: &[f64],
            qd: &[f64],
            ff: &[f64],
        ) -> Result<(), SolverError> {
            self.solver.solve(
                &self.chain,
                constraints,
                q,
                qd,
                ff,
                &self.f_ext,
                &mut self.out,
            )
        }
    }

    #[test]
    fn feed_forward_of_wrong_length_is_a_dimension_error() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        let err = fx
            .solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[0.0, 0.0])
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::Dimension {
                what: "feed-forward torque",
                expected: 1,
                got: 2
            }
        );
        assert!(!err.is_numerical());
    }

    #[test]
    fn external_wrench_count_must_match_segments() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        fx.f_ext.push([0.0; 6]);
        assert!(matches!(
            fx.solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[0.0]),
            Err(SolverError::Dimension { what: "external wrenches", .. })
        ));
    }

    #[test]
    fn gravity_torque_holds_pendulum() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        // m g l = 2 * 9.81 * 0.5
        fx.solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[9.81]).unwrap();
        assert_relative_eq!(fx.out.predicted_acc()[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(fx.out.constraint_tau()[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn unsupported_pendulum_falls() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        fx.solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[0.0]).unwrap();
        // -m g l / (m l²)
        assert_relative_eq!(fx.out.predicted_acc()[0], -19.62, epsilon = 1e-9);
    }

    #[test]
    fn external_wrench_can_carry_the_load() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        fx.f_ext[0] = [0.0, 19.62, 0.0, 0.0, 0.0, 9.81];
        fx.solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[0.0]).unwrap();
        assert_relative_eq!(fx.out.predicted_acc()[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn angular_constraint_dominates_feed_forward() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        let constraints = build_axis_constraints(&[CartesianAxis::AngularZ], &[2.0], None).unwrap();
        for ff in [-5.0, 0.0, 9.81, 40.0] {
            fx.solve(&constraints, &[0.3], &[0.1], &[ff]).unwrap();
            assert_relative_eq!(fx.out.predicted_acc()[0], 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn spinning_pendulum_has_no_joint_acceleration() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), NO_GRAVITY);
        fx.solve(&ConstraintSet::empty(), &[0.0], &[3.0], &[0.0]).unwrap();
        // A single revolute joint has no velocity coupling about its axis.
        assert_relative_eq!(fx.out.predicted_acc()[0], 0.0, epsilon = 1e-9);
        for value in fx.out.segment_accelerations()[0] {
            assert_relative_eq!(value, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn prismatic_joint_obeys_newton() {
        let joint = Joint::prismatic("slide", Vector3::x()).unwrap();
        let segment = Segment::new(
            "carriage",
            joint,
            Isometry3::identity(),
            RigidBodyInertia::point_mass(3.0, Vector3::new(0.0, 0.2, 0.0)),
        );
        let chain = Chain::from_segments(vec![segment]).unwrap();
        let mut fx = Fixture::new(chain, NO_GRAVITY);
        fx.solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[6.0]).unwrap();
        assert_relative_eq!(fx.out.predicted_acc()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn massless_moving_segment_diverges() {
        let joint = Joint::revolute("spin", Vector3::z()).unwrap();
        let segment = Segment::new("ghost", joint, Isometry3::identity(), RigidBodyInertia::zero());
        let chain = Chain::from_segments(vec![segment]).unwrap();
        let mut fx = Fixture::new(chain, GRAVITY_Y);
        let err = fx
            .solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[1.0])
            .unwrap_err();
        assert!(matches!(err, SolverError::Divergence(_)));
        assert!(err.is_numerical());
    }

    #[test]
    fn non_finite_input_diverges() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        let err = fx
            .solve(&ConstraintSet::empty(), &[0.0], &[f64::NAN], &[0.0])
            .unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn two_link_matches_closed_form_mass_matrix() {
        let mut fx = Fixture::new(chain(TWO_LINK_PLANAR, "tool"), NO_GRAVITY);
        let q2 = 0.5_f64;
        let tau = [1.0, 0.5];
        fx.solve(&ConstraintSet::empty(), &[0.2, q2], &[0.0, 0.0], &tau).unwrap();

        let m = Matrix2::new(3.0 + 2.0 * q2.cos(), 1.0 + q2.cos(), 1.0 + q2.cos(), 1.0);
        let expected = m.try_inverse().unwrap() * Vector2::new(tau[0], tau[1]);
        assert_relative_eq!(fx.out.predicted_acc()[0], expected[0], epsilon = 1e-9);
        assert_relative_eq!(fx.out.predicted_acc()[1], expected[1], epsilon = 1e-9);
    }

    #[test]
    fn tool_constraints_are_satisfied() {
        let mut fx = Fixture::new(chain(TWO_LINK_PLANAR, "tool"), GRAVITY_Y);
        let constraints = build_axis_constraints(
            &[CartesianAxis::LinearX, CartesianAxis::LinearY],
            &[0.7, -1.2],
            None,
        )
        .unwrap();
        fx.solve(&constraints, &[0.4, 1.1], &[0.3, -0.6], &[0.5, 0.2])
            .unwrap();

        let tool = fx.out.segment_accelerations()[fx.chain.tip_index()];
        assert_relative_eq!(tool[0], 0.7, epsilon = 1e-9);
        assert_relative_eq!(tool[1], -1.2, epsilon = 1e-9);
    }

    #[test]
    fn constraint_torque_reproduces_constrained_motion() {
        let mut fx = Fixture::new(chain(TWO_LINK_PLANAR, "tool"), GRAVITY_Y);
        let constraints = build_constraints(
            &[CartesianAxis::LinearY.unit_column(), CartesianAxis::AngularZ.unit_column()],
            &[0.25, -0.5],
            None,
        )
        .unwrap();
        let (q, qd, ff) = ([0.9, -0.4], [0.2, 0.1], [1.0, -0.3]);
        fx.solve(&constraints, &q, &qd, &ff).unwrap();
        let constrained = fx.out.predicted_acc().to_vec();
        let tau: Vec<f64> = ff
            .iter()
            .zip(fx.out.constraint_tau())
            .map(|(f, c)| f + c)
            .collect();

        fx.solve(&ConstraintSet::empty(), &q, &qd, &tau).unwrap();
        assert_relative_eq!(fx.out.predicted_acc()[0], constrained[0], epsilon = 1e-9);
        assert_relative_eq!(fx.out.predicted_acc()[1], constrained[1], epsilon = 1e-9);
    }

    #[test]
    fn unreachable_direction_gets_no_force() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        fx.solve(&ConstraintSet::empty(), &[0.0], &[0.0], &[1.0]).unwrap();
        let free = fx.out.predicted_acc()[0];

        // The planar pendulum cannot accelerate its origin along z.
        let constraints = build_axis_constraints(&[CartesianAxis::LinearZ], &[3.0], None).unwrap();
        fx.solve(&constraints, &[0.0], &[0.0], &[1.0]).unwrap();
        assert_relative_eq!(fx.out.predicted_acc()[0], free, epsilon = 1e-9);
        assert_relative_eq!(fx.out.constraint_magnitudes()[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn constraint_wrench_is_alpha_times_magnitudes() {
        let mut fx = Fixture::new(chain(PENDULUM, "pendulum"), GRAVITY_Y);
        let constraints = build_axis_constraints(&[CartesianAxis::AngularZ], &[2.0], None).unwrap();
        fx.solve(&constraints, &[0.0], &[0.0], &[9.81]).unwrap();
        // I = m l² = 0.5, so the constraint supplies 0.5 * 2 N·m.
        assert_relative_eq!(fx.out.constraint_magnitudes()[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(fx.out.constraint_wrench()[5], 1.0, epsilon = 1e-9);
        assert_relative_eq!(fx.out.constraint_tau()[0], 1.0, epsilon = 1e-9);
    }
}
