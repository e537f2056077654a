// src/point.rs

//! Points on the unit sphere.

use crate::math::r3::Vector;
use crate::math::s1::{Angle, ChordAngle};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A point on the unit sphere, represented as a 3D vector.
///
/// Most operations expect unit length; `Point::from_coords` normalizes.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point(pub Vector);

impl Point {
  /// Unit point in the direction of `(x, y, z)`. The zero vector maps to `(1, 0, 0)`.
  #[must_use]
  pub fn from_coords(x: f64, y: f64, z: f64) -> Point {
    if x == 0.0 && y == 0.0 && z == 0.0 {
      return Point(Vector::new(1.0, 0.0, 0.0));
    }
    Point(Vector::new(x, y, z).normalize())
  }

  /// A fixed point used as the reference of containment tests.
  ///
  /// It lies near the north pole but is unlikely to be a vertex or on an edge of test geometry,
  /// and is not on any cell boundary at any level.
  #[must_use]
  pub const fn origin() -> Point {
    Point(Vector::new(-0.009_999_466_435_025_02, 0.002_592_454_260_932_412_1, 0.999_946_643_502_501_95))
  }

  #[inline]
  #[must_use]
  pub fn x(self) -> f64 {
    self.0.x
  }

  #[inline]
  #[must_use]
  pub fn y(self) -> f64 {
    self.0.y
  }

  #[inline]
  #[must_use]
  pub fn z(self) -> f64 {
    self.0.z
  }

  #[inline]
  #[must_use]
  pub fn dot(self, o: Point) -> f64 {
    self.0.dot(o.0)
  }

  #[inline]
  #[must_use]
  pub fn cross(self, o: Point) -> Point {
    Point(self.0.cross(o.0))
  }

  #[inline]
  #[must_use]
  pub fn norm(self) -> f64 {
    self.0.norm()
  }

  #[inline]
  #[must_use]
  pub fn norm2(self) -> f64 {
    self.0.norm2()
  }

  #[must_use]
  pub fn normalize(self) -> Point {
    Point(self.0.normalize())
  }

  #[must_use]
  pub fn is_unit(self) -> bool {
    self.0.is_unit()
  }

  /// A unit point orthogonal to this one.
  #[must_use]
  pub fn ortho(self) -> Point {
    Point(self.0.ortho())
  }

  /// Angle between the two points.
  #[must_use]
  pub fn distance(self, o: Point) -> Angle {
    Angle(self.0.angle(o.0))
  }

  /// Squared chord distance between the two points, clamped to a straight angle.
  #[must_use]
  pub fn chord_angle(self, o: Point) -> ChordAngle {
    ChordAngle::from_squared_length((self.0 - o.0).norm2())
  }

  /// Whether the two points are within `max_error` radians of each other.
  #[must_use]
  pub fn approx_eq_within(self, o: Point, max_error: Angle) -> bool {
    self.0.angle(o.0) <= max_error.radians()
  }

  #[must_use]
  pub fn approx_eq(self, o: Point) -> bool {
    self.approx_eq_within(o, Angle(1e-15))
  }

  /// A cross product that is never zero for distinct points.
  ///
  /// Computes `(b+a) x (b-a)`, which is twice `a x b` but far more accurate when the points
  /// are nearly identical. Exactly equal points yield an arbitrary orthogonal vector.
  #[must_use]
  pub fn point_cross(self, o: Point) -> Point {
    let x = (self.0 + o.0).cross(o.0 - self.0);
    if x == Vector::default() {
      return self.ortho();
    }
    Point(x)
  }
}

impl Add for Point {
  type Output = Point;
  fn add(self, o: Point) -> Point {
    Point(self.0 + o.0)
  }
}

impl Sub for Point {
  type Output = Point;
  fn sub(self, o: Point) -> Point {
    Point(self.0 - o.0)
  }
}

impl Mul<f64> for Point {
  type Output = Point;
  fn mul(self, m: f64) -> Point {
    Point(self.0 * m)
  }
}

impl Neg for Point {
  type Output = Point;
  fn neg(self) -> Point {
    Point(-self.0)
  }
}

impl From<Vector> for Point {
  fn from(v: Vector) -> Self {
    Point(v)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_origin_is_unit() {
    assert!(Point::origin().is_unit());
  }

  #[test]
  fn test_point_cross_never_zero() {
    let a = Point::from_coords(1.0, 2.0, 3.0);
    assert!(a.point_cross(a).norm() > 0.0, "identical points still yield a direction");
    let b = Point::from_coords(1.0, 2.0, 3.0 + 1e-15);
    let c = a.point_cross(b);
    assert!(c.norm() > 0.0);
    assert!(c.normalize().dot(a).abs() < 1e-10);
  }

  #[test]
  fn test_chord_angle_and_distance() {
    let x = Point::from_coords(1.0, 0.0, 0.0);
    let y = Point::from_coords(0.0, 1.0, 0.0);
    assert!((x.chord_angle(y).length2() - 2.0).abs() < 1e-15);
    assert!((x.distance(-x).radians() - std::f64::consts::PI).abs() < 1e-15);
    assert_eq!(x.chord_angle(-x), ChordAngle::STRAIGHT);
  }
}
