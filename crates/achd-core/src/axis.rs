//! The six Cartesian axes and the ordering every 6-vector in the workspace
//! follows: linear x/y/z first, then angular x/y/z.
//!
//! Twists, wrenches, constraint columns and acceleration targets are all plain
//! `[f64; 6]` arrays indexed by [`CartesianAxis::index`].

use serde::{Deserialize, Serialize};

/// A 6-vector in `[linear_x, linear_y, linear_z, angular_x, angular_y, angular_z]` order.
pub type Vector6Array = [f64; 6];

/// One of the six independently controllable Cartesian directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartesianAxis {
    LinearX,
    LinearY,
    LinearZ,
    AngularX,
    AngularY,
    AngularZ,
}

impl CartesianAxis {
    /// All six axes in canonical order.
    pub const ALL: [Self; 6] = [
        Self::LinearX,
        Self::LinearY,
        Self::LinearZ,
        Self::AngularX,
        Self::AngularY,
        Self::AngularZ,
    ];

    /// Position of this axis inside a 6-vector.
    pub const fn index(self) -> usize {
        match self {
            Self::LinearX => 0,
            Self::LinearY => 1,
            Self::LinearZ => 2,
            Self::AngularX => 3,
            Self::AngularY => 4,
            Self::AngularZ => 5,
        }
    }

    /// Inverse of [`index`](Self::index).
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::LinearX),
            1 => Some(Self::LinearY),
            2 => Some(Self::LinearZ),
            3 => Some(Self::AngularX),
            4 => Some(Self::AngularY),
            5 => Some(Self::AngularZ),
            _ => None,
        }
    }

    /// Whether this axis lies in the linear (force) sub-space.
    pub const fn is_linear(self) -> bool {
        self.index() < 3
    }

    /// Unit constraint column along this axis.
    pub fn unit_column(self) -> Vector6Array {
        let mut column = [0.0; 6];
        column[self.index()] = 1.0;
        column
    }

    /// Short label used in log headers (`x`, `y`, `z`, `qx`, `qy`, `qz`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::LinearX => "x",
            Self::LinearY => "y",
            Self::LinearZ => "z",
            Self::AngularX => "qx",
            Self::AngularY => "qy",
            Self::AngularZ => "qz",
        }
    }
}
