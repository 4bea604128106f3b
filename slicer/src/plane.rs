use std::fmt::{self, Display};

use common::geometry::{Axis, Pos};
use serde::{Deserialize, Serialize};

/// The plane `a·x + b·y + c·z + d = 0`. The normal `(a, b, c)` does not need
/// to be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Plane {
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// The plane perpendicular to the x axis at `x`.
    pub fn at_x(x: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, -x)
    }

    /// The plane perpendicular to the y axis at `y`.
    pub fn at_y(y: f32) -> Self {
        Self::new(0.0, 1.0, 0.0, -y)
    }

    /// The plane perpendicular to the z axis at `z`.
    pub fn at_z(z: f32) -> Self {
        Self::new(0.0, 0.0, 1.0, -z)
    }

    pub fn axis_aligned(axis: Axis, value: f32) -> Self {
        match axis {
            Axis::X => Self::at_x(value),
            Axis::Y => Self::at_y(value),
            Axis::Z => Self::at_z(value),
        }
    }

    /// Signed, unnormalized distance of `point` from the plane.
    pub fn eval(&self, point: &Pos) -> f32 {
        self.a * point.x + self.b * point.y + self.c * point.z + self.d
    }

    pub fn coefficients(&self) -> [f32; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

impl Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x + {}y + {}z + {} = 0",
            self.a, self.b, self.c, self.d
        )
    }
}
