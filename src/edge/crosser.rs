// src/edge/crosser.rs

use super::crossings::{vertex_crossing, Crossing};
use crate::constants::{DBL_EPSILON, M_SQRT3};
use crate::point::Point;
use crate::predicates::{expensive_sign, robust_sign, triage_sign, Direction};

/// Tests a fixed edge AB against a stream of other edges.
///
/// Edges may be given one at a time with [`EdgeCrosser::crossing_sign`], or as a connected
/// chain of vertices with [`EdgeCrosser::chain_crossing_sign`], which is cheaper because the
/// orientation of the previous vertex is carried over.
#[derive(Debug, Clone)]
pub struct EdgeCrosser {
  a: Point,
  b: Point,
  a_cross_b: Point,
  // Outward-facing tangents at A and B. If the plane perpendicular to one of them separates
  // AB from CD, there is no crossing.
  a_tangent: Point,
  b_tangent: Point,
  // Previous vertex of the chain and the orientation of ACB.
  c: Point,
  acb: Direction,
}

impl EdgeCrosser {
  #[must_use]
  pub fn new(a: Point, b: Point) -> Self {
    let norm = a.point_cross(b);
    Self {
      a,
      b,
      a_cross_b: a.cross(b),
      a_tangent: a.cross(norm),
      b_tangent: norm.cross(b),
      c: Point::default(),
      acb: Direction::Indeterminate,
    }
  }

  /// An edge crosser whose chain starts at `c`.
  #[must_use]
  pub fn new_chain(a: Point, b: Point, c: Point) -> Self {
    let mut e = Self::new(a, b);
    e.restart_at(c);
    e
  }

  #[inline]
  #[must_use]
  pub fn a(&self) -> Point {
    self.a
  }

  #[inline]
  #[must_use]
  pub fn b(&self) -> Point {
    self.b
  }

  /// `a x b`, unnormalized.
  #[inline]
  #[must_use]
  pub fn normal(&self) -> Point {
    self.a_cross_b
  }

  /// Whether AB crosses CD.
  pub fn crossing_sign(&mut self, c: Point, d: Point) -> Crossing {
    if c != self.c {
      self.restart_at(c);
    }
    self.chain_crossing_sign(d)
  }

  /// Like `crossing_sign`, but shared vertices count as crossings per `vertex_crossing`.
  pub fn edge_or_vertex_crossing(&mut self, c: Point, d: Point) -> bool {
    if c != self.c {
      self.restart_at(c);
    }
    self.edge_or_vertex_chain_crossing(d)
  }

  /// Starts a new chain at `c`.
  pub fn restart_at(&mut self, c: Point) {
    self.c = c;
    self.acb = -triage_sign(self.a, self.b, c);
  }

  /// Whether AB crosses the edge from the previous chain vertex to `d`. `d` becomes the new
  /// previous vertex.
  pub fn chain_crossing_sign(&mut self, d: Point) -> Crossing {
    // A crossing needs ACB, CBD, BDA and DAC to share an orientation. The cheap common case
    // is C and D on opposite sides of AB.
    let bda = triage_sign(self.a, self.b, d);
    if self.acb == -bda && bda != Direction::Indeterminate {
      self.c = d;
      self.acb = -bda;
      return Crossing::DoNotCross;
    }
    let (result, bda) = self.crossing_sign_slow(d, bda);
    self.c = d;
    self.acb = -bda;
    result
  }

  pub fn edge_or_vertex_chain_crossing(&mut self, d: Point) -> bool {
    let c = self.c;
    match self.chain_crossing_sign(d) {
      Crossing::DoNotCross => false,
      Crossing::Cross => true,
      Crossing::MaybeCross => vertex_crossing(self.a, self.b, c, d),
    }
  }

  fn crossing_sign_slow(&mut self, d: Point, mut bda: Direction) -> (Crossing, Direction) {
    // Collinear, non-overlapping edges are common (finely sampled lines); the tangent planes
    // reject them without exact arithmetic.
    let max_error = (1.5 + 1.0 / M_SQRT3) * DBL_EPSILON;
    let c = self.c;
    if (c.dot(self.a_tangent) > max_error && d.dot(self.a_tangent) > max_error)
      || (c.dot(self.b_tangent) > max_error && d.dot(self.b_tangent) > max_error)
    {
      return (Crossing::DoNotCross, bda);
    }

    if self.a == c || self.a == d || self.b == c || self.b == d {
      return (Crossing::MaybeCross, bda);
    }

    if self.a == self.b || c == d {
      return (Crossing::DoNotCross, bda);
    }

    if self.acb == Direction::Indeterminate {
      self.acb = -expensive_sign(self.a, self.b, c);
    }
    if bda == Direction::Indeterminate {
      bda = expensive_sign(self.a, self.b, d);
    }
    if bda != self.acb {
      return (Crossing::DoNotCross, bda);
    }

    let cbd = -robust_sign(c, d, self.b);
    if cbd != self.acb {
      return (Crossing::DoNotCross, bda);
    }
    let dac = robust_sign(c, d, self.a);
    if dac != self.acb {
      return (Crossing::DoNotCross, bda);
    }
    (Crossing::Cross, bda)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  #[test]
  fn test_simple_crossing() {
    let mut e = EdgeCrosser::new(p(1.0, -0.1, 0.0), p(1.0, 0.1, 0.0));
    assert_eq!(e.crossing_sign(p(1.0, 0.0, -0.1), p(1.0, 0.0, 0.1)), Crossing::Cross);
    assert_eq!(e.crossing_sign(p(1.0, 0.2, -0.1), p(1.0, 0.2, 0.1)), Crossing::DoNotCross);
  }

  #[test]
  fn test_shared_vertex_is_maybe() {
    let a = p(1.0, 0.0, 0.0);
    let b = p(0.0, 1.0, 0.0);
    let mut e = EdgeCrosser::new(a, b);
    assert_eq!(e.crossing_sign(b, p(0.0, 0.0, 1.0)), Crossing::MaybeCross);
  }

  #[test]
  fn test_chain_matches_individual_tests() {
    let a = p(1.0, -0.5, 0.0);
    let b = p(1.0, 0.5, 0.0);
    let chain = [p(1.0, -0.2, -0.3), p(1.0, -0.1, 0.3), p(1.0, 0.3, 0.2), p(1.0, 0.2, -0.4), p(1.0, 0.6, -0.1)];
    let mut chained = EdgeCrosser::new_chain(a, b, chain[0]);
    for w in chain.windows(2) {
      let mut single = EdgeCrosser::new(a, b);
      assert_eq!(chained.chain_crossing_sign(w[1]), single.crossing_sign(w[0], w[1]));
    }
  }

  #[test]
  fn test_collinear_disjoint_edges() {
    let mut e = EdgeCrosser::new(p(1.0, 0.0, 0.0), p(1.0, 0.1, 0.0));
    assert_eq!(e.crossing_sign(p(1.0, 0.2, 0.0), p(1.0, 0.3, 0.0)), Crossing::DoNotCross);
  }
}
