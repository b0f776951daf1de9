//! Planar value types shared by the model and the analysis stages.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Global axis of a planar degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal direction, first DOF of a node.
    X,
    /// Vertical direction, second DOF of a node.
    Y,
}

impl Axis {
    /// Offset of this axis within a node's pair of global DOF indices.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    /// Recover the axis from a global DOF index.
    #[must_use]
    pub const fn of_dof(dof: usize) -> Self {
        if dof % 2 == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Position in the plane. Units are whatever the caller draws in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Cartesian force components in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Force {
    /// Force component acting along the global X axis.
    pub x: f64,
    /// Force component acting along the global Y axis.
    pub y: f64,
}

impl Force {
    /// Create a [`Force`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Decompose a magnitude acting at `angle_degrees` from the positive X axis.
    ///
    /// # Examples
    /// ```
    /// use truss2d::Force;
    ///
    /// let up = Force::from_polar(2.0, 90.0);
    /// assert!(up.x.abs() < 1.0e-12);
    /// assert!((up.y - 2.0).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn from_polar(magnitude: f64, angle_degrees: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self::new(magnitude * cos, magnitude * sin)
    }

    /// Convert the force into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl std::ops::Add for Force {
    type Output = Force;

    fn add(self, rhs: Force) -> Force {
        Force::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::iter::Sum for Force {
    fn sum<I: Iterator<Item = Force>>(iter: I) -> Force {
        iter.fold(Force::default(), |acc, f| acc + f)
    }
}

impl From<Vector2<f64>> for Force {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Force> for Vector2<f64> {
    fn from(value: Force) -> Self {
        value.to_vector()
    }
}

/// Translation of a node after analysis.
///
/// With the unit axial rigidity used by the assembler these values are relative,
/// not physical lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    /// Displacement component along the global X axis.
    pub x: f64,
    /// Displacement component along the global Y axis.
    pub y: f64,
}

impl Displacement {
    /// Create a [`Displacement`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the displacement into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Displacement {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use truss2d::point;
///
/// let origin = point(0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Convenience helper for creating [`Force`] instances.
///
/// # Examples
/// ```
/// use truss2d::force;
///
/// let load = force(1.0, -5.0);
/// assert_eq!(load.y, -5.0);
/// ```
#[must_use]
pub const fn force(x: f64, y: f64) -> Force {
    Force::new(x, y)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn point_to_vector_roundtrip() {
        let origin = Point::new(1.0, 2.0);
        let vector: Vector2<f64> = origin.into();
        assert_eq!(vector, Vector2::new(1.0, 2.0));
        assert_eq!(Point::from(vector), origin);
    }

    #[test]
    fn polar_force_decomposes_along_axes() {
        let diagonal = Force::from_polar(2.0_f64.sqrt(), 45.0);
        assert_relative_eq!(diagonal.x, 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(diagonal.y, 1.0, epsilon = 1.0e-12);

        let left = Force::from_polar(3.0, 180.0);
        assert_relative_eq!(left.x, -3.0, epsilon = 1.0e-12);
        assert_relative_eq!(left.y, 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn forces_sum_componentwise() {
        let total: Force = [force(1.0, 2.0), force(-3.0, 0.5)].into_iter().sum();
        assert_eq!(total, force(-2.0, 2.5));
    }

    #[test]
    fn axis_follows_dof_parity() {
        assert_eq!(Axis::of_dof(4), Axis::X);
        assert_eq!(Axis::of_dof(5), Axis::Y);
        assert_eq!(Axis::Y.offset(), 1);
    }
}
