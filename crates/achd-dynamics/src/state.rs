//! Per-robot joint-space and segment-space state.
//!
//! All arrays are allocated once in [`RobotState::new`] and never resized.
//! Joint arrays are written by the integrator, segment arrays by forward
//! kinematics and the solver; everything else only reads.

use achd_core::{StateError, Vector6Array};

/// Joint and segment arrays of one robot.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    q: Vec<f64>,
    qd: Vec<f64>,
    qdd: Vec<f64>,
    /// Segment poses: position + roll/pitch/yaw.
    s: Vec<Vector6Array>,
    /// Segment twists.
    sd: Vec<Vector6Array>,
    /// Segment spatial accelerations.
    sdd: Vec<Vector6Array>,
}

impl RobotState {
    /// Allocate a zeroed state for `nj` joints and `ns` segments.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidDimension`] if either count is zero or
    /// `initial_q` is not `nj` long.
    pub fn new(nj: usize, ns: usize, initial_q: Option<&[f64]>) -> Result<Self, StateError> {
        if nj == 0 {
            return Err(StateError::InvalidDimension {
                what: "joint count",
                expected: 1,
                got: 0,
            });
        }
        if ns == 0 {
            return Err(StateError::InvalidDimension {
                what: "segment count",
                expected: 1,
                got: 0,
            });
        }
        let q = match initial_q {
            Some(init) if init.len() != nj => {
                return Err(StateError::InvalidDimension {
                    what: "initial joint positions",
                    expected: nj,
                    got: init.len(),
                });
            }
            Some(init) => init.to_vec(),
            None => vec![0.0; nj],
        };
        Ok(Self {
            q,
            qd: vec![0.0; nj],
            qdd: vec![0.0; nj],
            s: vec![[0.0; 6]; ns],
            sd: vec![[0.0; 6]; ns],
            sdd: vec![[0.0; 6]; ns],
        })
    }

    /// Number of joints.
    pub fn nj(&self) -> usize {
        self.q.len()
    }

    /// Number of segments.
    pub fn ns(&self) -> usize {
        self.s.len()
    }

    pub fn q(&self) -> &[f64] {
        &self.q
    }

    pub fn qd(&self) -> &[f64] {
        &self.qd
    }

    pub fn qdd(&self) -> &[f64] {
        &self.qdd
    }

    /// Overwrite joint positions, e.g. with a measurement from the drivers.
    pub fn q_mut(&mut self) -> &mut [f64] {
        &mut self.q
    }

    /// Overwrite joint velocities, e.g. with a measurement from the drivers.
    pub fn qd_mut(&mut self) -> &mut [f64] {
        &mut self.qd
    }

    /// Split borrow of `(q, qd, qdd)` for the integrator.
    pub(crate) fn joints_mut(&mut self) -> (&mut [f64], &mut [f64], &mut [f64]) {
        (&mut self.q, &mut self.qd, &mut self.qdd)
    }

    /// Split borrow for forward kinematics: joint arrays read-only, segment
    /// poses and twists writable.
    #[allow(clippy::type_complexity)]
    pub(crate) fn kinematics_view(
        &mut self,
    ) -> (&[f64], &[f64], &mut [Vector6Array], &mut [Vector6Array]) {
        (&self.q, &self.qd, &mut self.s, &mut self.sd)
    }

    pub fn segment_poses(&self) -> &[Vector6Array] {
        &self.s
    }

    pub fn segment_twists(&self) -> &[Vector6Array] {
        &self.sd
    }

    pub fn segment_accelerations(&self) -> &[Vector6Array] {
        &self.sdd
    }

    pub fn segment_pose(&self, index: usize) -> Result<&Vector6Array, StateError> {
        self.s.get(index).ok_or_else(|| self.out_of_range(index))
    }

    pub fn segment_twist(&self, index: usize) -> Result<&Vector6Array, StateError> {
        self.sd.get(index).ok_or_else(|| self.out_of_range(index))
    }

    pub fn segment_acceleration(&self, index: usize) -> Result<&Vector6Array, StateError> {
        self.sdd.get(index).ok_or_else(|| self.out_of_range(index))
    }

    /// Pose of the tool segment (`ns - 1`).
    pub fn tool_pose(&self) -> &Vector6Array {
        &self.s[self.s.len() - 1]
    }

    /// Twist of the tool segment (`ns - 1`).
    pub fn tool_twist(&self) -> &Vector6Array {
        &self.sd[self.sd.len() - 1]
    }

    /// Spatial acceleration of the tool segment (`ns - 1`).
    pub fn tool_acceleration(&self) -> &Vector6Array {
        &self.sdd[self.sdd.len() - 1]
    }

    pub fn set_segment_pose(&mut self, index: usize, pose: Vector6Array) -> Result<(), StateError> {
        let err = self.out_of_range(index);
        *self.s.get_mut(index).ok_or(err)? = pose;
        Ok(())
    }

    pub fn set_segment_twist(
        &mut self,
        index: usize,
        twist: Vector6Array,
    ) -> Result<(), StateError> {
        let err = self.out_of_range(index);
        *self.sd.get_mut(index).ok_or(err)? = twist;
        Ok(())
    }

    pub fn set_segment_acceleration(
        &mut self,
        index: usize,
        acceleration: Vector6Array,
    ) -> Result<(), StateError> {
        let err = self.out_of_range(index);
        *self.sdd.get_mut(index).ok_or(err)? = acceleration;
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> StateError {
        StateError::SegmentIndexOutOfRange {
            index,
            count: self.s.len(),
        }
    }
}
