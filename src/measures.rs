// src/measures.rs

//! Angles and areas of spherical triangles.

use crate::math::r3::Vector;
use crate::math::s1::Angle;
use crate::point::Point;
use crate::predicates::{robust_sign, Direction};

/// Area of the triangle ABC, in steradians.
///
/// Uses l'Huilier's formula, switching to Girard's for long skinny triangles where it is more
/// accurate. Degenerate triangles have area zero.
#[must_use]
pub fn point_area(a: Point, b: Point, c: Point) -> f64 {
  let sa = b.distance(c).radians();
  let sb = c.distance(a).radians();
  let sc = a.distance(b).radians();
  let s = 0.5 * (sa + sb + sc);
  if s >= 3e-4 {
    let dmin = s - sa.max(sb).max(sc);
    if dmin < 1e-2 * s * s * s * s * s {
      let area = girard_area(a, b, c);
      if dmin < s * 0.1 * area {
        return area;
      }
    }
  }
  let t = (0.5 * s).tan() * (0.5 * (s - sa)).tan() * (0.5 * (s - sb)).tan() * (0.5 * (s - sc)).tan();
  4.0 * t.max(0.0).sqrt().atan()
}

/// Area of the triangle ABC by Girard's formula. Fast, but loses precision on small triangles.
#[must_use]
pub fn girard_area(a: Point, b: Point, c: Point) -> f64 {
  let ab = a.point_cross(b);
  let bc = b.point_cross(c);
  let ac = a.point_cross(c);
  let area = ab.distance(ac).radians() - ab.distance(bc).radians() + bc.distance(ac).radians();
  area.max(0.0)
}

/// Area of ABC, positive when the triangle is counterclockwise and negative otherwise.
#[must_use]
pub fn signed_area(a: Point, b: Point, c: Point) -> f64 {
  f64::from(robust_sign(a, b, c) as i8) * point_area(a, b, c)
}

/// Interior angle at B of the triangle ABC, in [0, Pi].
#[must_use]
pub fn angle(a: Point, b: Point, c: Point) -> Angle {
  a.point_cross(b).distance(c.point_cross(b))
}

/// Exterior angle at B of the path A->B->C: positive for a left turn, negative for a right turn.
/// Its magnitude is in [0, Pi].
#[must_use]
pub fn turn_angle(a: Point, b: Point, c: Point) -> Angle {
  let angle = a.point_cross(b).distance(b.point_cross(c));
  if robust_sign(a, b, c) == Direction::CounterClockwise {
    angle
  } else {
    -angle
  }
}

/// Centroid of the spherical triangle ABC scaled by its area, not unit length.
///
/// Summing these over a triangulation gives the centroid of the region, which is why the
/// result is left unnormalized.
#[must_use]
pub fn true_centroid(a: Point, b: Point, c: Point) -> Point {
  let ratio = |s: f64| if s == 0.0 { 1.0 } else { s / s.sin() };
  let ra = ratio(b.distance(c).radians());
  let rb = ratio(c.distance(a).radians());
  let rc = ratio(a.distance(b).radians());

  // Solve the linear system for the centroid relative to A, which is more accurate for small
  // triangles.
  let x = Vector::new(a.x(), b.x() - a.x(), c.x() - a.x());
  let y = Vector::new(a.y(), b.y() - a.y(), c.y() - a.y());
  let z = Vector::new(a.z(), b.z() - a.z(), c.z() - a.z());
  let r = Vector::new(ra, rb - ra, rc - ra);
  Point(Vector::new(y.cross(z).dot(r), z.cross(x).dot(r), x.cross(y).dot(r)) * 0.5)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::{M_PI, M_PI_2};

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  #[test]
  fn test_octant_area() {
    let (x, y, z) = (p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0));
    assert!((point_area(x, y, z) - M_PI_2).abs() < 1e-15);
    assert!((girard_area(x, y, z) - M_PI_2).abs() < 1e-15);
    assert!((signed_area(x, y, z) - M_PI_2).abs() < 1e-15);
    assert!((signed_area(x, z, y) + M_PI_2).abs() < 1e-15);
  }

  #[test]
  fn test_degenerate_and_tiny() {
    let a = p(1.0, 0.0, 0.0);
    assert_eq!(point_area(a, a, p(0.0, 1.0, 0.0)), 0.0);
    // A very small right triangle is close to its planar area.
    let e = 1e-6;
    let area = point_area(a, p(1.0, e, 0.0), p(1.0, 0.0, e));
    assert!((area - 0.5 * e * e).abs() < 1e-18);
  }

  #[test]
  fn test_angles() {
    let (x, y, z) = (p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0));
    assert!((angle(x, z, y).radians() - M_PI_2).abs() < 1e-15);
    assert!((turn_angle(x, y, z).radians() - M_PI_2).abs() < 1e-15);
    assert!((turn_angle(x, z, y).radians() + M_PI_2).abs() < 1e-15);
    // Going straight on turns by zero, reversing turns by Pi.
    let mid = p(1.0, 1.0, 0.0).normalize();
    assert!(turn_angle(x, mid, y).radians().abs() < 1e-15);
    assert!((turn_angle(x, y, x).radians().abs() - M_PI).abs() < 1e-15);
  }

  #[test]
  fn test_true_centroid_of_octant() {
    let a = Point::from_coords(1.0, 0.0, 0.0);
    let b = Point::from_coords(0.0, 1.0, 0.0);
    let c = Point::from_coords(0.0, 0.0, 1.0);
    let centroid = true_centroid(a, b, c);
    // By symmetry the centroid lies on the diagonal.
    assert!((centroid.x() - centroid.y()).abs() < 1e-15);
    assert!((centroid.y() - centroid.z()).abs() < 1e-15);
    assert!(centroid.x() > 0.0);
    assert!(centroid.normalize().approx_eq(Point::from_coords(1.0, 1.0, 1.0)));
  }

  #[test]
  fn test_true_centroid_of_degenerate_triangle_is_tiny() {
    let a = Point::from_coords(1.0, 0.0, 0.0);
    assert!(true_centroid(a, a, a).norm() < 1e-15);
  }
}
