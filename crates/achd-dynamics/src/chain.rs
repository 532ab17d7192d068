//! Kinematic chain extracted from a URDF [`RobotModel`].
//!
//! A [`Chain`] is an ordered list of segments from the base link to the tool
//! link. Every joint on the path produces exactly one segment, fixed joints
//! included; fixed segments carry zero degrees of freedom. The chain is
//! immutable after construction and is shared read-only by every component
//! of the control core.

use nalgebra::{
    Isometry3, Matrix3, Matrix6, Translation3, UnitQuaternion, UnitVector3, Vector3, Vector6,
};
use tracing::info;

use achd_core::ChainError;
use achd_urdf::{Inertial, JointType, Origin, RobotModel};

use crate::spatial::{spatial, RigidBodyInertia};

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// Motion a joint allows between its parent and child segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Revolute,
    Prismatic,
    Fixed,
}

/// A joint at the root of a segment.
#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    kind: JointKind,
    /// Joint axis in the joint (= child segment) frame.
    axis: UnitVector3<f64>,
}

impl Joint {
    /// Rotation about `axis`.
    pub fn revolute(name: impl Into<String>, axis: Vector3<f64>) -> Result<Self, ChainError> {
        Self::with_axis(name.into(), JointKind::Revolute, axis)
    }

    /// Translation along `axis`.
    pub fn prismatic(name: impl Into<String>, axis: Vector3<f64>) -> Result<Self, ChainError> {
        Self::with_axis(name.into(), JointKind::Prismatic, axis)
    }

    /// Rigid connection, zero degrees of freedom.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Fixed,
            axis: Vector3::z_axis(),
        }
    }

    fn with_axis(name: String, kind: JointKind, axis: Vector3<f64>) -> Result<Self, ChainError> {
        let axis = UnitVector3::try_new(axis, 1e-12)
            .ok_or_else(|| ChainError::DegenerateAxis(name.clone()))?;
        Ok(Self { name, kind, axis })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> JointKind {
        self.kind
    }

    pub const fn axis(&self) -> &UnitVector3<f64> {
        &self.axis
    }

    /// Whether this joint contributes an entry to the joint arrays.
    pub fn is_moving(&self) -> bool {
        self.kind != JointKind::Fixed
    }

    /// Motion subspace in the child segment frame, `[linear; angular]`.
    pub fn motion_subspace(&self) -> Vector6<f64> {
        let axis = self.axis.into_inner();
        match self.kind {
            JointKind::Revolute => spatial(&Vector3::zeros(), &axis),
            JointKind::Prismatic => spatial(&axis, &Vector3::zeros()),
            JointKind::Fixed => Vector6::zeros(),
        }
    }

    /// Joint displacement transform at position `q`.
    pub fn transform(&self, q: f64) -> Isometry3<f64> {
        match self.kind {
            JointKind::Revolute => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, q),
            ),
            JointKind::Prismatic => Isometry3::from_parts(
                Translation3::from(self.axis.into_inner() * q),
                UnitQuaternion::identity(),
            ),
            JointKind::Fixed => Isometry3::identity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One rigid body of the chain together with the joint that connects it to
/// its parent.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Name of the link this segment represents.
    name: String,
    joint: Joint,
    /// Static transform from the parent segment frame to the joint frame.
    origin: Isometry3<f64>,
    inertia: RigidBodyInertia,
    /// Cached 6x6 spatial inertia about the segment origin.
    spatial_inertia: Matrix6<f64>,
}

impl Segment {
    pub fn new(
        name: impl Into<String>,
        joint: Joint,
        origin: Isometry3<f64>,
        inertia: RigidBodyInertia,
    ) -> Self {
        let spatial_inertia = inertia.to_spatial();
        Self {
            name: name.into(),
            joint,
            origin,
            inertia,
            spatial_inertia,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn joint(&self) -> &Joint {
        &self.joint
    }

    pub const fn origin(&self) -> &Isometry3<f64> {
        &self.origin
    }

    pub const fn inertia(&self) -> &RigidBodyInertia {
        &self.inertia
    }

    pub const fn spatial_inertia(&self) -> &Matrix6<f64> {
        &self.spatial_inertia
    }

    /// Pose of this segment's frame in its parent's frame at joint position `q`.
    pub fn pose(&self, q: f64) -> Isometry3<f64> {
        self.origin * self.joint.transform(q)
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// An ordered kinematic chain from base to tool.
#[derive(Debug, Clone)]
pub struct Chain {
    segments: Vec<Segment>,
    /// Joint-array index for each segment, `None` for fixed segments.
    joint_index: Vec<Option<usize>>,
    joint_count: usize,
}

impl Chain {
    /// Build the chain between `base_link` and `tool_link` of a robot model.
    ///
    /// Walks from the tool up the parent joints until the base is reached.
    ///
    /// # Errors
    ///
    /// [`ChainError::MissingLink`] if either link is absent from the model,
    /// [`ChainError::NoPath`] if the base is not an ancestor of the tool,
    /// [`ChainError::Empty`] if base and tool coincide, and
    /// [`ChainError::UnsupportedJoint`] for floating or planar joints on the path.
    pub fn build(model: &RobotModel, base_link: &str, tool_link: &str) -> Result<Self, ChainError> {
        for link in [base_link, tool_link] {
            if model.link(link).is_err() {
                return Err(ChainError::MissingLink(link.to_owned()));
            }
        }

        let path = find_path_to_link(model, base_link, tool_link).ok_or_else(|| {
            ChainError::NoPath {
                base: base_link.to_owned(),
                tool: tool_link.to_owned(),
            }
        })?;
        if path.is_empty() {
            return Err(ChainError::Empty {
                base: base_link.to_owned(),
                tool: tool_link.to_owned(),
            });
        }

        let mut segments = Vec::with_capacity(path.len());
        for joint in path {
            let axis = Vector3::new(joint.axis[0], joint.axis[1], joint.axis[2]);
            let chain_joint = match joint.joint_type {
                JointType::Revolute | JointType::Continuous => {
                    Joint::revolute(joint.name.as_str(), axis)?
                }
                JointType::Prismatic => Joint::prismatic(joint.name.as_str(), axis)?,
                JointType::Fixed => Joint::fixed(joint.name.as_str()),
                JointType::Floating | JointType::Planar => {
                    return Err(ChainError::UnsupportedJoint {
                        joint: joint.name.clone(),
                        kind: format!("{:?}", joint.joint_type),
                    });
                }
            };

            let inertia = model
                .links
                .get(&joint.child)
                .and_then(|link| link.inertial.as_ref())
                .map_or_else(RigidBodyInertia::zero, inertial_to_rigid_body);

            segments.push(Segment::new(
                joint.child.as_str(),
                chain_joint,
                origin_to_isometry(&joint.origin),
                inertia,
            ));
        }

        let chain = Self::from_segments(segments)?;
        info!(
            base = base_link,
            tool = tool_link,
            joints = chain.joint_count(),
            segments = chain.segment_count(),
            "built kinematic chain"
        );
        Ok(chain)
    }

    /// Build a chain directly from root-to-tip ordered segments.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, ChainError> {
        if segments.is_empty() {
            return Err(ChainError::Empty {
                base: String::new(),
                tool: String::new(),
            });
        }
        let mut joint_count = 0;
        let joint_index = segments
            .iter()
            .map(|segment| {
                segment.joint.is_moving().then(|| {
                    joint_count += 1;
                    joint_count - 1
                })
            })
            .collect();
        Ok(Self {
            segments,
            joint_index,
            joint_count,
        })
    }

    /// Number of moving joints (`nj`).
    pub const fn joint_count(&self) -> usize {
        self.joint_count
    }

    /// Number of segments (`ns`), fixed segments included.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Index of the tool segment (`ns - 1`).
    pub fn tip_index(&self) -> usize {
        self.segments.len() - 1
    }

    /// Access the segments in root-to-tip order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at `index`, if in range.
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Segment index of the link called `link_name`.
    pub fn segment_index_of(&self, link_name: &str) -> Result<usize, ChainError> {
        self.segments
            .iter()
            .position(|s| s.name == link_name)
            .ok_or_else(|| ChainError::LinkNotFound(link_name.to_owned()))
    }

    /// Joint-array index driving segment `segment`, `None` for fixed segments
    /// and out-of-range indices.
    pub fn joint_index_of(&self, segment: usize) -> Option<usize> {
        self.joint_index.get(segment).copied().flatten()
    }

    /// Joint position of segment `segment` taken from a joint array.
    pub(crate) fn segment_q(&self, segment: usize, q: &[f64]) -> f64 {
        self.joint_index_of(segment).map_or(0.0, |j| q[j])
    }

    /// Names of the moving joints in joint-array order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|s| s.joint.is_moving())
            .map(|s| s.joint.name())
            .collect()
    }
}

/// Convert a URDF [`Origin`] (xyz + rpy) to an [`Isometry3`].
fn origin_to_isometry(origin: &Origin) -> Isometry3<f64> {
    let translation = Translation3::new(origin.xyz[0], origin.xyz[1], origin.xyz[2]);
    let rotation = UnitQuaternion::from_euler_angles(origin.rpy[0], origin.rpy[1], origin.rpy[2]);
    Isometry3::from_parts(translation, rotation)
}

/// Express a URDF inertial in its link frame.
fn inertial_to_rigid_body(inertial: &Inertial) -> RigidBodyInertia {
    let [ixx, ixy, ixz, iyy, iyz, izz] = inertial.inertia;
    let local = Matrix3::new(ixx, ixy, ixz, ixy, iyy, iyz, ixz, iyz, izz);
    let frame = origin_to_isometry(&inertial.origin);
    let r = frame.rotation.to_rotation_matrix().into_inner();
    RigidBodyInertia::new(
        inertial.mass,
        frame.translation.vector,
        r * local * r.transpose(),
    )
}

/// Ordered joints from `base` down to `target`, or `None` if `base` is not
/// an ancestor of `target`.
fn find_path_to_link<'a>(
    model: &'a RobotModel,
    base: &str,
    target: &str,
) -> Option<Vec<&'a achd_urdf::JointData>> {
    let mut path = Vec::new();
    let mut link = target;
    while link != base {
        let joint = model.parent_joint_of(link)?;
        // Guard against malformed descriptions with a cycle.
        if path.len() > model.joints.len() {
            return None;
        }
        path.push(joint);
        link = joint.parent.as_str();
    }
    path.reverse();
    Some(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use achd_test_utils::urdf::{PENDULUM_WITH_TOOL, SIX_DOF_ARM, TWO_LINK_PLANAR};
    use achd_urdf::parse_string;
    use approx::assert_relative_eq;

    #[test]
    fn chain_from_six_dof_arm() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let chain = Chain::build(&model, "base", "tool_frame").unwrap();
        assert_eq!(chain.joint_count(), 6);
        assert_eq!(chain.segment_count(), 7);
        assert!(chain.joint_count() <= chain.segment_count());
        assert_eq!(
            chain.joint_names(),
            vec![
                "j1_base_yaw",
                "j2_shoulder_pitch",
                "j3_elbow_pitch",
                "j4_forearm_roll",
                "j5_wrist_pitch",
                "j6_wrist_roll"
            ]
        );
    }

    #[test]
    fn sub_chain_between_intermediate_links() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let chain = Chain::build(&model, "upper_arm", "wrist_link").unwrap();
        assert_eq!(chain.segment_count(), 3);
        assert_eq!(chain.segment(0).unwrap().name(), "elbow_link");
        assert_eq!(chain.segment(2).unwrap().name(), "wrist_link");
    }

    #[test]
    fn segment_index_is_injective() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let chain = Chain::build(&model, "base", "tool_frame").unwrap();
        let mut seen = std::collections::HashSet::new();
        for segment in chain.segments() {
            let index = chain.segment_index_of(segment.name()).unwrap();
            assert!(seen.insert(index));
        }
        assert_eq!(chain.segment_index_of("tool_frame").unwrap(), chain.tip_index());
    }

    #[test]
    fn segment_index_of_unknown_link_fails() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        let chain = Chain::build(&model, "base", "tool_frame").unwrap();
        let err = chain.segment_index_of("gripper").unwrap_err();
        assert_eq!(err, ChainError::LinkNotFound("gripper".into()));
        // The base link is not a segment of its own chain.
        assert!(chain.segment_index_of("base").is_err());
    }

    #[test]
    fn fixed_segments_have_no_joint_index() {
        let model = parse_string(PENDULUM_WITH_TOOL).unwrap();
        let chain = Chain::build(&model, "base", "tool").unwrap();
        assert_eq!(chain.joint_count(), 1);
        assert_eq!(chain.segment_count(), 2);
        assert_eq!(chain.joint_index_of(0), Some(0));
        assert_eq!(chain.joint_index_of(1), None);
        assert_eq!(chain.joint_index_of(5), None);
    }

    #[test]
    fn missing_links_fail_to_build() {
        let model = parse_string(TWO_LINK_PLANAR).unwrap();
        assert_eq!(
            Chain::build(&model, "base", "nonexistent").unwrap_err(),
            ChainError::MissingLink("nonexistent".into())
        );
        assert_eq!(
            Chain::build(&model, "nowhere", "tool").unwrap_err(),
            ChainError::MissingLink("nowhere".into())
        );
    }

    #[test]
    fn reversed_links_have_no_path() {
        let model = parse_string(TWO_LINK_PLANAR).unwrap();
        let err = Chain::build(&model, "tool", "base").unwrap_err();
        assert!(matches!(err, ChainError::NoPath { .. }));
        assert!(err.is_build_error());
    }

    #[test]
    fn same_base_and_tool_is_empty() {
        let model = parse_string(TWO_LINK_PLANAR).unwrap();
        assert!(matches!(
            Chain::build(&model, "link1", "link1"),
            Err(ChainError::Empty { .. })
        ));
    }

    #[test]
    fn zero_axis_is_rejected() {
        assert_eq!(
            Joint::revolute("bad", Vector3::zeros()).unwrap_err(),
            ChainError::DegenerateAxis("bad".into())
        );
    }

    #[test]
    fn inertial_is_moved_into_link_frame() {
        let model = parse_string(TWO_LINK_PLANAR).unwrap();
        let chain = Chain::build(&model, "base", "tool").unwrap();
        let inertia = chain.segment(0).unwrap().inertia();
        assert_relative_eq!(inertia.mass, 1.0, epsilon = 1e-12);
        assert_relative_eq!(inertia.com, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotated_inertial_frame_rotates_tensor() {
        let inertial = Inertial {
            origin: Origin {
                xyz: [0.0; 3],
                rpy: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
            },
            mass: 1.0,
            inertia: [1.0, 0.0, 0.0, 2.0, 0.0, 3.0],
        };
        let body = inertial_to_rigid_body(&inertial);
        assert_relative_eq!(body.rotational[(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(body.rotational[(1, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.rotational[(2, 2)], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn origin_to_isometry_translation() {
        let origin = Origin {
            xyz: [1.0, 2.0, 3.0],
            rpy: [0.0, 0.0, 0.0],
        };
        let iso = origin_to_isometry(&origin);
        assert_relative_eq!(iso.translation.vector, Vector3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn revolute_subspace_is_angular() {
        let joint = Joint::revolute("j", Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_relative_eq!(
            joint.motion_subspace(),
            Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            epsilon = 1e-12
        );
        let joint = Joint::prismatic("p", Vector3::x()).unwrap();
        assert_relative_eq!(
            joint.motion_subspace(),
            Vector6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            epsilon = 1e-12
        );
    }
}
