//! Forward position and velocity kinematics.
//!
//! Recurses from the root segment applying each segment's origin and joint
//! transform. Poses and twists are expressed in the chain base frame; the
//! twist is the velocity of the segment origin followed by the segment's
//! angular velocity.

use nalgebra::{Isometry3, Vector3, Vector6};

use achd_core::{AchdError, KinematicsError, Vector6Array};

use crate::chain::{Chain, JointKind};
use crate::spatial::motion_transform;
use crate::state::RobotState;

// ---------------------------------------------------------------------------
// SegmentSelector
// ---------------------------------------------------------------------------

/// Which segment a kinematics query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentSelector {
    /// The tool segment, `ns - 1`.
    #[default]
    Tip,
    /// An explicit segment index.
    Index(usize),
}

impl From<usize> for SegmentSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl SegmentSelector {
    /// Resolve to a concrete index, validating it against `chain`.
    pub fn resolve(self, chain: &Chain) -> Result<usize, KinematicsError> {
        let count = chain.segment_count();
        let index = match self {
            Self::Tip => chain.tip_index(),
            Self::Index(index) => index,
        };
        if index >= count {
            return Err(KinematicsError::SegmentIndexOutOfRange { index, count });
        }
        Ok(index)
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Position (m) and roll/pitch/yaw orientation (rad) of a segment frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: [f64; 3],
    pub rpy: [f64; 3],
}

impl Pose {
    pub fn from_isometry(frame: &Isometry3<f64>) -> Self {
        let t = frame.translation.vector;
        let (roll, pitch, yaw) = frame.rotation.euler_angles();
        Self {
            position: [t.x, t.y, t.z],
            rpy: [roll, pitch, yaw],
        }
    }

    /// `[x, y, z, roll, pitch, yaw]`, the layout of `RobotState` segment poses.
    pub const fn to_array(&self) -> Vector6Array {
        let [x, y, z] = self.position;
        let [roll, pitch, yaw] = self.rpy;
        [x, y, z, roll, pitch, yaw]
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Pose of `segment` in the base frame as a rigid transform.
pub fn compute_frame(
    chain: &Chain,
    q: &[f64],
    segment: impl Into<SegmentSelector>,
) -> Result<Isometry3<f64>, KinematicsError> {
    check_len("joint positions", chain.joint_count(), q.len())?;
    let index = segment.into().resolve(chain)?;
    Ok(chain.segments()[..=index]
        .iter()
        .enumerate()
        .fold(Isometry3::identity(), |frame, (i, s)| {
            frame * s.pose(chain.segment_q(i, q))
        }))
}

/// Position and roll/pitch/yaw orientation of `segment` in the base frame.
pub fn compute_pose(
    chain: &Chain,
    q: &[f64],
    segment: impl Into<SegmentSelector>,
) -> Result<Pose, KinematicsError> {
    compute_frame(chain, q, segment).map(|frame| Pose::from_isometry(&frame))
}

/// Twist of `segment` in the base frame: `[v_origin; ω]`.
pub fn compute_twist(
    chain: &Chain,
    q: &[f64],
    qd: &[f64],
    segment: impl Into<SegmentSelector>,
) -> Result<Vector6Array, KinematicsError> {
    check_len("joint positions", chain.joint_count(), q.len())?;
    check_len("joint velocities", chain.joint_count(), qd.len())?;
    let index = segment.into().resolve(chain)?;
    let mut twist = [0.0; 6];
    walk(chain, q, qd, index, |i, _, v, w| {
        if i == index {
            twist = [v.x, v.y, v.z, w.x, w.y, w.z];
        }
    });
    Ok(twist)
}

/// Twist of the segment representing `link_name`.
pub fn compute_twist_of_link(
    chain: &Chain,
    link_name: &str,
    q: &[f64],
    qd: &[f64],
) -> Result<Vector6Array, AchdError> {
    let index = chain.segment_index_of(link_name)?;
    Ok(compute_twist(chain, q, qd, index)?)
}

/// Recompute every segment pose and twist of `state` from its joint arrays.
///
/// This is the feedback step of the control cycle. It runs one recursion
/// over the chain and does not allocate.
pub fn update_segment_states(chain: &Chain, state: &mut RobotState) -> Result<(), KinematicsError> {
    check_len("state joints", chain.joint_count(), state.nj())?;
    check_len("state segments", chain.segment_count(), state.ns())?;

    let tip = chain.tip_index();
    let (q, qd, poses, twists) = state.kinematics_view();
    walk(chain, q, qd, tip, |i, frame, v, w| {
        poses[i] = Pose::from_isometry(frame).to_array();
        twists[i] = [v.x, v.y, v.z, w.x, w.y, w.z];
    });
    Ok(())
}

/// Root acceleration expressed in the tool frame at configuration `q`.
///
/// Adding `column · result` to a constraint target turns a desired tool
/// acceleration into the acceleration energy the solver expects, since the
/// solver models gravity as a root acceleration.
pub fn gravity_compensation(
    chain: &Chain,
    q: &[f64],
    root_acceleration: &Vector6Array,
) -> Result<Vector6Array, KinematicsError> {
    let tool = compute_frame(chain, q, SegmentSelector::Tip)?;
    let local = motion_transform(&tool) * Vector6::from(*root_acceleration);
    Ok(local.into())
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), KinematicsError> {
    if expected == got {
        Ok(())
    } else {
        Err(KinematicsError::DimensionMismatch {
            what,
            expected,
            got,
        })
    }
}

/// Visit segments `0..=last` with their base-frame pose, origin velocity and
/// angular velocity.
fn walk(
    chain: &Chain,
    q: &[f64],
    qd: &[f64],
    last: usize,
    mut visit: impl FnMut(usize, &Isometry3<f64>, &Vector3<f64>, &Vector3<f64>),
) {
    let mut frame = Isometry3::identity();
    let mut v = Vector3::zeros();
    let mut w = Vector3::zeros();
    for (i, segment) in chain.segments()[..=last].iter().enumerate() {
        let parent_origin = frame.translation.vector;
        frame *= segment.pose(chain.segment_q(i, q));
        v += w.cross(&(frame.translation.vector - parent_origin));

        if let Some(j) = chain.joint_index_of(i) {
            let axis = frame.rotation * segment.joint().axis().into_inner();
            match segment.joint().kind() {
                JointKind::Revolute => w += axis * qd[j],
                JointKind::Prismatic => v += axis * qd[j],
                JointKind::Fixed => {}
            }
        }
        visit(i, &frame, &v, &w);
    }
}
