// src/edge/crossings.rs

use super::crosser::EdgeCrosser;
use crate::constants::DBL_ERROR;
use crate::math::r3::{PreciseVector, Vector};
use crate::math::s1::Angle;
use crate::point::Point;
use crate::predicates::ordered_ccw;

/// Result of testing two edges for a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crossing {
  /// The edges cross at a point interior to both.
  Cross,
  /// Two vertices from different edges are equal; see [`vertex_crossing`].
  MaybeCross,
  DoNotCross,
}

/// Maximum angular distance between the point returned by [`intersection`] and the true
/// intersection of the two edges.
pub const INTERSECTION_ERROR: Angle = Angle(8.0 * DBL_ERROR);

/// Whether AB crosses CD at a point interior to both edges.
///
/// Returns `MaybeCross` if any vertex of one edge equals a vertex of the other, and
/// `DoNotCross` if either edge is degenerate. The result is symmetric under swapping the
/// edges or reversing either of them.
#[must_use]
pub fn crossing_sign(a: Point, b: Point, c: Point, d: Point) -> Crossing {
  let mut crosser = EdgeCrosser::new_chain(a, b, c);
  crosser.chain_crossing_sign(d)
}

/// Resolves the shared-vertex case of [`crossing_sign`].
///
/// Of all edges sharing a vertex, each pair is consistently assigned "crossing" or not so that
/// point-in-polygon parity stays correct: AB and CD cross iff AB is encountered after CD when
/// sweeping counterclockwise around the shared vertex from a fixed reference direction.
#[must_use]
pub fn vertex_crossing(a: Point, b: Point, c: Point, d: Point) -> bool {
  if a == b || c == d {
    return false;
  }
  if a == d {
    return ordered_ccw(a.ortho(), c, b, a);
  }
  if b == c {
    return ordered_ccw(b.ortho(), d, a, b);
  }
  if a == c {
    return ordered_ccw(a.ortho(), d, b, a);
  }
  if b == d {
    return ordered_ccw(b.ortho(), c, a, b);
  }
  false
}

/// [`crossing_sign`] with shared vertices resolved by [`vertex_crossing`].
#[must_use]
pub fn edge_or_vertex_crossing(a: Point, b: Point, c: Point, d: Point) -> bool {
  match crossing_sign(a, b, c, d) {
    Crossing::DoNotCross => false,
    Crossing::Cross => true,
    Crossing::MaybeCross => vertex_crossing(a, b, c, d),
  }
}

fn cmp_lex(a: Vector, b: Vector) -> std::cmp::Ordering {
  a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Intersection point of two edges that cross (`crossing_sign(..) == Cross`).
///
/// The result is within [`INTERSECTION_ERROR`] of the true intersection and does not change
/// when the edges are swapped or reversed.
#[must_use]
pub fn intersection(a0: Point, a1: Point, b0: Point, b1: Point) -> Point {
  let a_norm = a0.point_cross(a1).normalize();
  let b_norm = b0.point_cross(b1).normalize();
  let x = a_norm.cross(b_norm);
  // The f64 result is accurate unless the edges are nearly parallel.
  let mut pt = if x.norm2() > (16.0 * DBL_ERROR) * (16.0 * DBL_ERROR) {
    x.normalize()
  } else {
    intersection_exact(a0, a1, b0, b1)
  };
  // Both edges are shorter than 180 degrees, so the sum of all vertices lies on the same side.
  if pt.0.dot((a0.0 + a1.0) + (b0.0 + b1.0)) < 0.0 {
    pt = -pt;
  }
  pt
}

fn intersection_exact(a0: Point, a1: Point, b0: Point, b1: Point) -> Point {
  let a_norm = PreciseVector::from_vector(a0.0).cross(&PreciseVector::from_vector(a1.0));
  let b_norm = PreciseVector::from_vector(b0.0).cross(&PreciseVector::from_vector(b1.0));
  let x = a_norm.cross(&b_norm);
  if !x.is_zero() {
    return Point(x.to_vector());
  }
  // Exactly collinear edges: two endpoints lie inside the other edge; take the smaller one.
  let a_norm = Point(a_norm.to_vector());
  let b_norm = Point(b_norm.to_vector());
  let mut best = Vector::new(10.0, 10.0, 10.0);
  let candidates = [
    (ordered_ccw(b0, a0, b1, b_norm), a0),
    (ordered_ccw(b0, a1, b1, b_norm), a1),
    (ordered_ccw(a0, b0, a1, a_norm), b0),
    (ordered_ccw(a0, b1, a1, a_norm), b1),
  ];
  for (inside, v) in candidates {
    if inside && cmp_lex(v.0, best) == std::cmp::Ordering::Less {
      best = v.0;
    }
  }
  Point(best.normalize())
}
