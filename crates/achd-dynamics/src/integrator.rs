//! Fixed-step joint-space integration.

use achd_core::IntegrationError;

use crate::state::RobotState;

/// Advance `state` by `dt` seconds under joint accelerations `qdd`.
///
/// Semi-implicit Euler: velocities are updated first and the *new*
/// velocities advance the positions. `qdd` is also stored in the state.
/// No clamping or joint-limit handling happens here.
///
/// # Errors
///
/// [`IntegrationError::InvalidTimestep`] unless `dt` is finite and positive,
/// [`IntegrationError::DimensionMismatch`] if `qdd` is not `nj` long. The
/// state is untouched on error.
pub fn integrate(state: &mut RobotState, qdd: &[f64], dt: f64) -> Result<(), IntegrationError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(IntegrationError::InvalidTimestep(dt));
    }
    if qdd.len() != state.nj() {
        return Err(IntegrationError::DimensionMismatch {
            expected: state.nj(),
            got: qdd.len(),
        });
    }

    let (q, qd, stored_qdd) = state.joints_mut();
    for ((q, qd), &a) in q.iter_mut().zip(qd.iter_mut()).zip(qdd) {
        *qd += a * dt;
        *q += *qd * dt;
    }
    stored_qdd.copy_from_slice(qdd);
    Ok(())
}
