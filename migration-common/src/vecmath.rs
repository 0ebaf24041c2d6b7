use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// A point or free vector in the plane.
///
/// The same type is used for positions (cell and fibre centers, pivots) and
/// for directions (fibre orientation, cell polarity).
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderedPair {
    pub x: f64,
    pub y: f64,
}

impl OrderedPair {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
    #[inline(always)]
    pub fn zero() -> Self { Self::new(0.0, 0.0) }
    #[inline(always)]
    pub fn magnitude_squared(self) -> f64 { self.x * self.x + self.y * self.y }
    #[inline(always)]
    pub fn magnitude(self) -> f64 { self.magnitude_squared().sqrt() }
    #[inline(always)]
    pub fn distance(self, other: Self) -> f64 { self.sub(other).magnitude() }
    #[inline(always)]
    pub fn add(self, other: Self) -> Self { Self::new(self.x + other.x, self.y + other.y) }
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self { Self::new(self.x - other.x, self.y - other.y) }
    #[inline(always)]
    pub fn scale(self, scalar: f64) -> Self { Self::new(self.x * scalar, self.y * scalar) }
    #[inline(always)]
    pub fn negate(self) -> Self { Self::new(-self.x, -self.y) }
    #[inline(always)]
    pub fn dot(self, other: Self) -> f64 { self.x * other.x + self.y * other.y }
    /// z-component of the 3D cross product. Positive when `other` lies
    /// counter-clockwise of `self`.
    #[inline(always)]
    pub fn cross(self, other: Self) -> f64 { self.x * other.y - self.y * other.x }
    #[inline(always)]
    pub fn is_finite(self) -> bool { self.x.is_finite() && self.y.is_finite() }

    /// Unit vector in the direction of `self`.
    ///
    /// Fails for the zero vector and for non-finite input; callers are expected
    /// to guard empty accumulations before normalizing.
    pub fn normalize(self) -> Result<Self, SimError> {
        let len = self.magnitude();
        if len > 0.0 && len.is_finite() {
            Ok(self.scale(1.0 / len))
        } else {
            Err(SimError::InvalidGeometry(format!(
                "cannot normalize vector ({}, {}) with magnitude {}",
                self.x, self.y, len
            )))
        }
    }

    /// Vector projection of `self` onto `onto`: `dot(self, onto) / |onto|² · onto`.
    pub fn project(self, onto: Self) -> Self {
        onto.scale(self.dot(onto) / onto.magnitude_squared())
    }

    /// Unsigned angle between two vectors, in `[0, π]`.
    pub fn angle_between(self, other: Self) -> f64 {
        let cos = self.dot(other) / (self.magnitude() * other.magnitude());
        // Rounding can push |cos| marginally above 1 for (anti)parallel vectors.
        cos.clamp(-1.0, 1.0).acos()
    }

    /// Rotates counter-clockwise by `phi` radians.
    pub fn rotate(self, phi: f64) -> Self {
        let (sin, cos) = phi.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Line through two points in slope-intercept form `y = m·x + b`.
///
/// Returns `None` for a vertical line, where the slope is undefined.
pub fn line_through(p1: OrderedPair, p2: OrderedPair) -> Option<(f64, f64)> {
    let run = p2.x - p1.x;
    if run == 0.0 {
        return None;
    }
    let m = (p2.y - p1.y) / run;
    Some((m, p1.y - m * p1.x))
}

/// Line through two points in homogeneous form `A·x + B·y + C = 0`.
///
/// Well defined for vertical lines; degenerate (`A = B = 0`) only when the
/// points coincide.
pub fn homogeneous_line(p1: OrderedPair, p2: OrderedPair) -> (f64, f64, f64) {
    let a = p2.y - p1.y;
    let b = p1.x - p2.x;
    let c = p2.x * p1.y - p1.x * p2.y;
    (a, b, c)
}

/// Perpendicular distance from `point` to the homogeneous line `(A, B, C)`.
pub fn distance_to_line(point: OrderedPair, (a, b, c): (f64, f64, f64)) -> f64 {
    (a * point.x + b * point.y + c).abs() / (a * a + b * b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn normalize_rejects_zero_vector() {
        let err = OrderedPair::zero().normalize().unwrap_err();
        assert!(matches!(err, SimError::InvalidGeometry(_)));
    }

    #[test]
    fn projection_onto_axis_keeps_parallel_component() {
        let v = OrderedPair::new(3.0, 4.0);
        let p = v.project(OrderedPair::new(2.0, 0.0));
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 0.0);

        // Scaling the target axis does not change the projection.
        let q = v.project(OrderedPair::new(-7.0, 0.0));
        assert_relative_eq!(q.x, 3.0);
        assert_relative_eq!(q.y, 0.0);
    }

    #[test]
    fn angle_between_spans_zero_to_pi() {
        let x = OrderedPair::new(1.0, 0.0);
        assert_relative_eq!(x.angle_between(x), 0.0);
        assert_relative_eq!(x.angle_between(OrderedPair::new(0.0, 5.0)), FRAC_PI_2);
        assert_relative_eq!(x.angle_between(OrderedPair::new(-2.0, 0.0)), PI);
    }

    #[test]
    fn rotate_is_counter_clockwise() {
        let r = OrderedPair::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn slope_intercept_is_undefined_for_vertical_lines() {
        assert_eq!(line_through(OrderedPair::new(2.0, 0.0), OrderedPair::new(2.0, 5.0)), None);
        let (m, b) = line_through(OrderedPair::new(0.0, 1.0), OrderedPair::new(2.0, 5.0)).unwrap();
        assert_relative_eq!(m, 2.0);
        assert_relative_eq!(b, 1.0);
    }

    #[test]
    fn homogeneous_line_handles_vertical_lines() {
        let line = homogeneous_line(OrderedPair::new(2.0, 0.0), OrderedPair::new(2.0, 5.0));
        assert_relative_eq!(distance_to_line(OrderedPair::new(7.0, 3.0), line), 5.0);
        assert_relative_eq!(distance_to_line(OrderedPair::new(-1.0, -9.0), line), 3.0);
    }

    #[test]
    fn perpendicular_distance_to_horizontal_fibre_axis() {
        let line = homogeneous_line(OrderedPair::new(287.5, 250.0), OrderedPair::new(250.0, 250.0));
        assert_relative_eq!(distance_to_line(OrderedPair::new(250.0, 260.0), line), 10.0);
    }

    fn coord() -> impl Strategy<Value = f64> {
        -1.0e4_f64..1.0e4
    }

    fn point() -> impl Strategy<Value = OrderedPair> {
        (coord(), coord()).prop_map(|(x, y)| OrderedPair::new(x, y))
    }

    proptest! {
        #[test]
        fn normalized_vectors_have_unit_magnitude(v in point()) {
            prop_assume!(v.magnitude() > 1e-6);
            let n = v.normalize().unwrap();
            prop_assert!((n.magnitude() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn distance_is_a_metric(a in point(), b in point(), c in point()) {
            prop_assert_eq!(a.distance(a), 0.0);
            prop_assert_eq!(a.distance(b), b.distance(a));
            prop_assert!(a.distance(c) <= a.distance(b) + b.distance(c) + 1e-9);
        }

        #[test]
        fn rotation_preserves_magnitude(v in point(), phi in -10.0_f64..10.0) {
            let r = v.rotate(phi);
            prop_assert!((r.magnitude() - v.magnitude()).abs() <= 1e-9 * (1.0 + v.magnitude()));
        }
    }
}
