//! Cartesian constraint formulation.
//!
//! A [`ConstraintSet`] holds up to six constraint directions (`alpha`
//! columns, tool frame) and their acceleration-energy targets (`beta`).
//! Column order is preserved: `beta[k]` always belongs to `alpha` column `k`.

use nalgebra::{Matrix6, Vector6};

use achd_core::{CartesianAxis, ConstraintError, Vector6Array};

/// Maximum number of constraints on a single tool frame.
pub const MAX_CONSTRAINTS: usize = 6;

/// Norm tolerance for constraint columns.
const UNIT_TOLERANCE: f64 = 1e-9;

/// Constraint directions and targets for one control cycle.
///
/// Storage is fixed at six columns; only the first [`count`](Self::count)
/// are meaningful and the rest stay zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintSet {
    alpha: Matrix6<f64>,
    beta: Vector6<f64>,
    count: usize,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConstraintSet {
    /// No constraints: the solver reduces to plain forward dynamics.
    pub fn empty() -> Self {
        Self {
            alpha: Matrix6::zeros(),
            beta: Vector6::zeros(),
            count: 0,
        }
    }

    /// Number of constraints (`nc`).
    pub const fn count(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Full 6x6 storage; columns `count..` are zero.
    pub const fn alpha(&self) -> &Matrix6<f64> {
        &self.alpha
    }

    /// Full 6-vector storage; entries `count..` are zero.
    pub const fn beta(&self) -> &Vector6<f64> {
        &self.beta
    }

    /// The meaningful `beta` entries.
    pub fn targets(&self) -> &[f64] {
        &self.beta.as_slice()[..self.count]
    }

    /// Constraint column `k`, if `k < count`.
    pub fn column(&self, k: usize) -> Option<Vector6<f64>> {
        (k < self.count).then(|| self.alpha.column(k).into_owned())
    }

    /// `beta` padded to six entries, the layout of manipulator log rows.
    pub fn padded_beta(&self) -> Vector6Array {
        self.beta.into()
    }
}

/// Build a constraint set from caller-ordered columns and targets.
///
/// With `gravity_compensation` (the root acceleration in the tool frame, see
/// [`gravity_compensation`](crate::kinematics::gravity_compensation)), each
/// target becomes `target + column · g`, so callers can state targets as the
/// desired tool acceleration.
///
/// # Errors
///
/// [`ConstraintError::SizeMismatch`] if the lengths differ,
/// [`ConstraintError::TooManyConstraints`] for more than six columns,
/// [`ConstraintError::InvalidConstraintColumn`] for a column that is not a
/// unit vector in exactly one of the linear or angular sub-spaces, and
/// [`ConstraintError::NonFiniteTarget`].
pub fn build_constraints(
    columns: &[Vector6Array],
    targets: &[f64],
    gravity_compensation: Option<&Vector6Array>,
) -> Result<ConstraintSet, ConstraintError> {
    if columns.len() != targets.len() {
        return Err(ConstraintError::SizeMismatch {
            columns: columns.len(),
            targets: targets.len(),
        });
    }
    if columns.len() > MAX_CONSTRAINTS {
        return Err(ConstraintError::TooManyConstraints(columns.len()));
    }

    let gravity = gravity_compensation.map(|g| Vector6::from(*g));
    let mut set = ConstraintSet::empty();
    for (k, (column, &target)) in columns.iter().zip(targets).enumerate() {
        if !is_valid_column(column) {
            return Err(ConstraintError::InvalidConstraintColumn { column: k });
        }
        if !target.is_finite() {
            return Err(ConstraintError::NonFiniteTarget { index: k });
        }
        let column = Vector6::from(*column);
        set.alpha.set_column(k, &column);
        set.beta[k] = target + gravity.map_or(0.0, |g| column.dot(&g));
    }
    set.count = columns.len();
    Ok(set)
}

/// Axis-aligned constraints, one per entry of `axes`, in the given order.
pub fn build_axis_constraints(
    axes: &[CartesianAxis],
    targets: &[f64],
    gravity_compensation: Option<&Vector6Array>,
) -> Result<ConstraintSet, ConstraintError> {
    if axes.len() > MAX_CONSTRAINTS {
        return Err(ConstraintError::TooManyConstraints(axes.len()));
    }
    let mut columns = [[0.0; 6]; MAX_CONSTRAINTS];
    for (slot, axis) in columns.iter_mut().zip(axes) {
        *slot = axis.unit_column();
    }
    build_constraints(&columns[..axes.len()], targets, gravity_compensation)
}

fn is_valid_column(column: &Vector6Array) -> bool {
    if column.iter().any(|v| !v.is_finite()) {
        return false;
    }
    let norm = |part: &[f64]| part.iter().map(|v| v * v).sum::<f64>().sqrt();
    let (linear, angular) = (norm(&column[..3]), norm(&column[3..]));
    let is_unit = |n: f64| (n - 1.0).abs() <= UNIT_TOLERANCE;
    let is_zero = |n: f64| n <= UNIT_TOLERANCE;
    (is_unit(linear) && is_zero(angular)) || (is_zero(linear) && is_unit(angular))
}
