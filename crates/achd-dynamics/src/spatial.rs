//! 6D spatial algebra in `[linear; angular]` order.
//!
//! Motion vectors are `(v, ω)`: linear velocity of the frame origin and
//! angular velocity. Force vectors are `(f, n)`: force and moment about the
//! frame origin. Both are plain [`Vector6`] so the recursion can use nalgebra
//! fixed-size arithmetic without allocating.

use nalgebra::{Isometry3, Matrix3, Matrix6, Vector3, Vector6};

/// Linear part of a spatial vector.
pub fn linear(v: &Vector6<f64>) -> Vector3<f64> {
    v.fixed_rows::<3>(0).into_owned()
}

/// Angular part of a spatial vector.
pub fn angular(v: &Vector6<f64>) -> Vector3<f64> {
    v.fixed_rows::<3>(3).into_owned()
}

/// Assemble a spatial vector from its linear and angular parts.
pub fn spatial(linear: &Vector3<f64>, angular: &Vector3<f64>) -> Vector6<f64> {
    Vector6::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z)
}

/// Motion cross-product operator: `motion_cross(m) * x == m × x`.
pub fn motion_cross(m: &Vector6<f64>) -> Matrix6<f64> {
    let v = linear(m).cross_matrix();
    let w = angular(m).cross_matrix();
    let mut out = Matrix6::zeros();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(&w);
    out.fixed_view_mut::<3, 3>(0, 3).copy_from(&v);
    out.fixed_view_mut::<3, 3>(3, 3).copy_from(&w);
    out
}

/// Force cross-product operator: `force_cross(m) * f == m ×* f`.
pub fn force_cross(m: &Vector6<f64>) -> Matrix6<f64> {
    -motion_cross(m).transpose()
}

/// Motion transform from a parent frame to a child frame whose pose in the
/// parent is `pose`.
///
/// The transpose maps forces from the child frame back to the parent.
pub fn motion_transform(pose: &Isometry3<f64>) -> Matrix6<f64> {
    let rt = pose.rotation.to_rotation_matrix().into_inner().transpose();
    let p = pose.translation.vector.cross_matrix();
    let mut out = Matrix6::zeros();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(&rt);
    out.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-rt * p));
    out.fixed_view_mut::<3, 3>(3, 3).copy_from(&rt);
    out
}

/// Mass properties of one rigid segment, expressed in the segment frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyInertia {
    /// Mass in kilograms.
    pub mass: f64,
    /// Centre of mass in the segment frame.
    pub com: Vector3<f64>,
    /// Rotational inertia about the centre of mass, segment-frame axes.
    pub rotational: Matrix3<f64>,
}

impl RigidBodyInertia {
    pub const fn new(mass: f64, com: Vector3<f64>, rotational: Matrix3<f64>) -> Self {
        Self {
            mass,
            com,
            rotational,
        }
    }

    /// A massless frame.
    pub fn zero() -> Self {
        Self::new(0.0, Vector3::zeros(), Matrix3::zeros())
    }

    /// Point mass located at `com`.
    pub fn point_mass(mass: f64, com: Vector3<f64>) -> Self {
        Self::new(mass, com, Matrix3::zeros())
    }

    /// 6x6 spatial inertia about the segment origin.
    pub fn to_spatial(&self) -> Matrix6<f64> {
        let m = self.mass;
        let c = self.com.cross_matrix();
        let mut out = Matrix6::zeros();
        out.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&(Matrix3::identity() * m));
        out.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-c * m));
        out.fixed_view_mut::<3, 3>(3, 0).copy_from(&(c * m));
        out.fixed_view_mut::<3, 3>(3, 3)
            .copy_from(&(self.rotational + c * c.transpose() * m));
        out
    }
}
