// src/edge/distances.rs

//! Distances between points and edges, measured as chord angles.

use super::crossings::{crossing_sign, intersection, Crossing};
use crate::constants::{DBL_EPSILON, M_SQRT3};
use crate::math::s1::{Angle, ChordAngle};
use crate::point::Point;
use crate::predicates::sign;

/// Distance from `x` to the edge AB. Degenerate edges (A == B) are allowed.
#[must_use]
pub fn distance_from_segment(x: Point, a: Point, b: Point) -> Angle {
  let mut min_dist = ChordAngle::ZERO;
  update_min_distance_impl(x, a, b, &mut min_dist, true);
  min_dist.to_angle()
}

/// Whether the distance from `x` to AB is less than `limit`.
#[must_use]
pub fn is_distance_less(x: Point, a: Point, b: Point, limit: ChordAngle) -> bool {
  let mut d = limit;
  update_min_distance(x, a, b, &mut d)
}

/// Lowers `min_dist` to the distance from `x` to AB if that is smaller. Returns whether it did.
///
/// Useful for computing the minimum distance to a collection of edges.
pub fn update_min_distance(x: Point, a: Point, b: Point, min_dist: &mut ChordAngle) -> bool {
  update_min_distance_impl(x, a, b, min_dist, false)
}

/// Raises `max_dist` to the maximum distance from `x` to AB if that is larger.
pub fn update_max_distance(x: Point, a: Point, b: Point, max_dist: &mut ChordAngle) -> bool {
  let mut dist = x.chord_angle(a).max(x.chord_angle(b));
  if dist > ChordAngle::RIGHT {
    update_min_distance_impl(-x, a, b, &mut dist, true);
    dist = ChordAngle::STRAIGHT - dist;
  }
  if *max_dist < dist {
    *max_dist = dist;
    return true;
  }
  false
}

/// Like [`update_min_distance`], but only considers points interior to AB.
pub fn update_min_interior_distance(x: Point, a: Point, b: Point, min_dist: &mut ChordAngle) -> bool {
  interior_dist(x, a, b, min_dist, false)
}

fn update_min_distance_impl(x: Point, a: Point, b: Point, min_dist: &mut ChordAngle, always_update: bool) -> bool {
  if interior_dist(x, a, b, min_dist, always_update) {
    return true;
  }
  let xa2 = (x.0 - a.0).norm2();
  let xb2 = (x.0 - b.0).norm2();
  let dist = ChordAngle(xa2.min(xb2));
  if !always_update && dist >= *min_dist {
    return false;
  }
  *min_dist = dist;
  true
}

fn interior_dist(x: Point, a: Point, b: Point, min_dist: &mut ChordAngle, always_update: bool) -> bool {
  let xa2 = (x.0 - a.0).norm2();
  let xb2 = (x.0 - b.0).norm2();

  // The closest point can only be interior if the planar angles XAB and XBA are both acute,
  // i.e. |XA^2 - XB^2| < AB^2, tested with the bound on normalization and rounding error.
  let ab2 = (a.0 - b.0).norm2();
  let max_error = 4.75 * DBL_EPSILON * (xa2 + xb2 + ab2) + 8.0 * DBL_EPSILON * DBL_EPSILON;
  if (xa2 - xb2).abs() >= ab2 + max_error {
    return false;
  }

  // XQ^2 = (X.C)^2 / |C|^2 with C = A x B is a lower bound on the distance to the great circle.
  let c = a.point_cross(b);
  let c2 = c.norm2();
  let x_dot_c = x.dot(c);
  let x_dot_c2 = x_dot_c * x_dot_c;
  if !always_update && x_dot_c2 > c2 * min_dist.length2() {
    return false;
  }

  let cx = c.cross(x);
  if (a - x).dot(cx) >= 0.0 || (b - x).dot(cx) <= 0.0 {
    return false;
  }

  // XR^2 = XQ^2 + QR^2, accurate for all chord lengths.
  let qr = 1.0 - (cx.norm2() / c2).sqrt();
  let dist = ChordAngle((x_dot_c2 / c2) + qr * qr);
  if !always_update && dist >= *min_dist {
    return false;
  }
  *min_dist = dist;
  true
}

/// Maximum error of a distance computed by [`update_min_distance`], in squared chord length.
#[must_use]
pub fn min_update_distance_max_error(dist: ChordAngle) -> f64 {
  min_update_interior_distance_max_error(dist).max(dist.max_point_error())
}

fn min_update_interior_distance_max_error(dist: ChordAngle) -> f64 {
  if dist >= ChordAngle::RIGHT {
    return 0.0;
  }
  let b = (0.5 * dist.length2()).min(1.0);
  let a = (b * (2.0 - b)).sqrt();
  ((2.5 + 2.0 * M_SQRT3 + 8.5 * a) * a
    + (2.0 + 2.0 * M_SQRT3 / 3.0 + 6.5 * (1.0 - b)) * b
    + (23.0 + 16.0 / M_SQRT3) * DBL_EPSILON)
    * DBL_EPSILON
}

/// Point on AB closest to `x`.
#[must_use]
pub fn project(x: Point, a: Point, b: Point) -> Point {
  let a_cross_b = a.point_cross(b);
  // Closest point on the great circle through AB.
  let p = x - a_cross_b * (x.dot(a_cross_b) / a_cross_b.norm2());
  if sign(a_cross_b, a, p) && sign(p, b, a_cross_b) {
    return p.normalize();
  }
  if (x - a).norm2() <= (x - b).norm2() {
    a
  } else {
    b
  }
}

/// Point at fraction `t` of the way from `a` to `b`.
#[must_use]
pub fn interpolate(t: f64, a: Point, b: Point) -> Point {
  if t == 0.0 {
    return a;
  }
  if t == 1.0 {
    return b;
  }
  let ab = a.distance(b);
  interpolate_at_distance(ab * t, a, b)
}

/// Point at distance `ax` from `a` along the great circle towards `b`.
#[must_use]
pub fn interpolate_at_distance(ax: Angle, a: Point, b: Point) -> Point {
  let r = ax.radians();
  // Tangent at A towards B; perpendicular to A even when A == ±B.
  let normal = a.point_cross(b);
  let tangent = normal.cross(a);
  (a * r.cos() + tangent * (r.sin() / tangent.norm())).normalize()
}

/// Lowers `min_dist` to the minimum distance between edges A and B.
pub fn update_edge_pair_min_distance(a0: Point, a1: Point, b0: Point, b1: Point, min_dist: &mut ChordAngle) -> bool {
  if min_dist.is_zero() {
    return false;
  }
  if crossing_sign(a0, a1, b0, b1) == Crossing::Cross {
    *min_dist = ChordAngle::ZERO;
    return true;
  }
  // Otherwise the minimum is attained at an endpoint of one of the edges; check all four.
  let u1 = update_min_distance(a0, b0, b1, min_dist);
  let u2 = update_min_distance(a1, b0, b1, min_dist);
  let u3 = update_min_distance(b0, a0, a1, min_dist);
  let u4 = update_min_distance(b1, a0, a1, min_dist);
  u1 || u2 || u3 || u4
}

/// Raises `max_dist` to the maximum distance between edges A and B.
pub fn update_edge_pair_max_distance(a0: Point, a1: Point, b0: Point, b1: Point, max_dist: &mut ChordAngle) -> bool {
  if *max_dist == ChordAngle::STRAIGHT {
    return false;
  }
  if crossing_sign(a0, a1, -b0, -b1) == Crossing::Cross {
    *max_dist = ChordAngle::STRAIGHT;
    return true;
  }
  let u1 = update_max_distance(a0, b0, b1, max_dist);
  let u2 = update_max_distance(a1, b0, b1, max_dist);
  let u3 = update_max_distance(b0, a0, a1, max_dist);
  let u4 = update_max_distance(b1, a0, a1, max_dist);
  u1 || u2 || u3 || u4
}

/// The pair of points, one on each edge, that are closest to each other.
#[must_use]
pub fn edge_pair_closest_points(a0: Point, a1: Point, b0: Point, b1: Point) -> (Point, Point) {
  if crossing_sign(a0, a1, b0, b1) == Crossing::Cross {
    let x = intersection(a0, a1, b0, b1);
    return (x, x);
  }
  let mut min_dist = ChordAngle::ZERO;
  update_min_distance_impl(a0, b0, b1, &mut min_dist, true);
  let mut closest = 0;
  if update_min_distance(a1, b0, b1, &mut min_dist) {
    closest = 1;
  }
  if update_min_distance(b0, a0, a1, &mut min_dist) {
    closest = 2;
  }
  if update_min_distance(b1, a0, a1, &mut min_dist) {
    closest = 3;
  }
  match closest {
    0 => (a0, project(a0, b0, b1)),
    1 => (a1, project(a1, b0, b1)),
    2 => (project(b0, a0, a1), b0),
    _ => (project(b1, a0, a1), b1),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::M_PI_4;

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  #[test]
  fn test_distance_from_segment() {
    let a = p(1.0, 0.0, 0.0);
    let b = p(0.0, 1.0, 0.0);
    // Interior closest point.
    let d = distance_from_segment(p(1.0, 1.0, 1.0), a, b);
    assert!((d.radians() - (1.0 / 3f64.sqrt()).asin()).abs() < 1e-14);
    // Endpoint closest point.
    let d = distance_from_segment(p(-1.0, 0.0, 0.0), a, b);
    assert!((d.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-14);
    // Degenerate edge.
    let d = distance_from_segment(b, a, a);
    assert!((d.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-14);
  }

  #[test]
  fn test_update_min_distance_only_lowers() {
    let a = p(1.0, 0.0, 0.0);
    let b = p(0.0, 1.0, 0.0);
    let x = p(0.0, 0.0, 1.0);
    let mut d = ChordAngle::infinity();
    assert!(update_min_distance(x, a, b, &mut d));
    assert_eq!(d, ChordAngle::RIGHT);
    assert!(!update_min_distance(x, a, b, &mut d));
    let mut small = ChordAngle::from_angle(Angle::from_degrees(1.0));
    assert!(!update_min_distance(x, a, b, &mut small));
    assert!(is_distance_less(x, a, b, ChordAngle::STRAIGHT));
    assert!(!is_distance_less(x, a, b, ChordAngle::RIGHT));
  }

  #[test]
  fn test_update_max_distance() {
    let a = p(1.0, 0.0, 0.0);
    let b = p(0.0, 1.0, 0.0);
    let mut d = ChordAngle::negative();
    assert!(update_max_distance(p(-1.0, -1.0, 0.0), a, b, &mut d));
    assert!((d.to_angle().radians() - std::f64::consts::PI).abs() < 1e-7);
  }

  #[test]
  fn test_project_and_interpolate() {
    let a = p(1.0, 0.0, 0.0);
    let b = p(0.0, 1.0, 0.0);
    assert!(project(p(1.0, 1.0, 5.0), a, b).approx_eq(p(1.0, 1.0, 0.0)));
    assert_eq!(project(p(-1.0, -0.5, 0.0), a, b), b);
    let mid = interpolate(0.5, a, b);
    assert!(mid.approx_eq(p(1.0, 1.0, 0.0)));
    let q = interpolate_at_distance(Angle(M_PI_4 / 2.0), a, b);
    assert!((q.distance(a).radians() - M_PI_4 / 2.0).abs() < 1e-15);
    assert_eq!(interpolate(0.0, a, b), a);
    assert_eq!(interpolate(1.0, a, b), b);
  }

  #[test]
  fn test_edge_pair_distances() {
    let a0 = p(1.0, -1.0, 0.0);
    let a1 = p(1.0, 1.0, 0.0);
    let mut d = ChordAngle::infinity();
    assert!(update_edge_pair_min_distance(a0, a1, p(1.0, 0.0, -1.0), p(1.0, 0.0, 1.0), &mut d));
    assert_eq!(d, ChordAngle::ZERO);

    let mut d = ChordAngle::infinity();
    update_edge_pair_min_distance(a0, a1, p(1.0, -1.0, 1.0), p(1.0, 1.0, 1.0), &mut d);
    assert!(d > ChordAngle::ZERO);

    let (x, y) = edge_pair_closest_points(a0, a1, p(1.0, 0.0, 0.5), p(1.0, 0.0, 1.0));
    assert!(x.approx_eq(p(1.0, 0.0, 0.0)));
    assert!(y.approx_eq(p(1.0, 0.0, 0.5)));

    let mut m = ChordAngle::negative();
    assert!(update_edge_pair_max_distance(a0, a1, p(-1.0, 0.0, -1.0), p(-1.0, 0.0, 1.0), &mut m));
    assert_eq!(m, ChordAngle::STRAIGHT);
  }

  #[test]
  fn test_max_error_is_small() {
    let e = min_update_distance_max_error(ChordAngle::from_angle(Angle::from_degrees(1.0)));
    assert!(e > 0.0 && e < 1e-14);
  }
}
