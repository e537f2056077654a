// src/loops.rs

//! Simple spherical polygons: closed chains of vertices with the interior on the left.

use std::sync::OnceLock;

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cellid::CellId;
use crate::constants::{M_2PI, M_4PI, M_PI_2};
use crate::edge::{crossing_sign, Crossing, EdgeCrosser};
use crate::error::{Result, S2Error};
use crate::math::r1::Interval as R1Interval;
use crate::math::r3::Vector;
use crate::math::s1::{Angle, Interval as S1Interval};
use crate::measures::{signed_area, true_centroid, turn_angle};
use crate::point::Point;
use crate::predicates::ordered_ccw;
use crate::query::{ContainsPointQuery, VertexModel};
use crate::rect::Rect;
use crate::rect_bounder::RectBounder;
use crate::region::Region;
use crate::shape::{Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape};
use crate::shape_index::{IndexCellData, ShapeIndex, ShapeIndexRegion};

// Loops with fewer vertices test containment by walking every edge.
const MAX_BRUTE_FORCE_VERTICES: usize = 32;

// Error bound of the turning angle, per vertex.
const TURNING_ANGLE_MAX_ERROR_PER_VERTEX: f64 = 3.330_7e-15;

/// A closed loop of vertices. The last vertex is implicitly joined to the first, and the
/// interior is on the left of each edge.
///
/// Two special loops have a single vertex and no edges: [`Loop::empty`] and [`Loop::full`].
/// Loops are not validated on construction; call [`Loop::validate`] before relying on area or
/// containment results for untrusted input.
pub struct Loop {
  vertices: Vec<Point>,
  origin_inside: bool,
  // Nesting depth within a polygon; odd depths are holes.
  depth: i32,
  bound: Rect,
  // Built on first use. The indexed shape is a copy of this loop without its own index.
  index: OnceLock<ShapeIndex>,
}

impl Loop {
  /// A loop from its vertices, in counterclockwise order around the interior.
  #[must_use]
  pub fn new(vertices: Vec<Point>) -> Loop {
    let mut l = Loop { vertices, origin_inside: false, depth: 0, bound: Rect::full(), index: OnceLock::new() };
    l.init_origin_and_bound();
    l
  }

  /// The loop containing no points.
  #[must_use]
  pub fn empty() -> Loop {
    Loop::new(vec![Point::from_coords(0.0, 0.0, 1.0)])
  }

  /// The loop containing every point.
  #[must_use]
  pub fn full() -> Loop {
    Loop::new(vec![Point::from_coords(0.0, 0.0, -1.0)])
  }

  /// The boundary of a cell, counterclockwise.
  #[must_use]
  pub fn from_cell(cell: &Cell) -> Loop {
    Loop::new((0..4).map(|k| cell.vertex(k)).collect())
  }

  /// A regular polygon with `num_vertices` vertices at angular distance `radius` from
  /// `center`, counterclockwise around it.
  #[must_use]
  pub fn regular(center: Point, radius: Angle, num_vertices: usize) -> Loop {
    // A right-handed frame whose z-axis is the center.
    let z = center.0;
    let y = center.ortho().0;
    let x = y.cross(z);
    let (sin_r, cos_r) = radius.radians().sin_cos();
    let step = M_2PI / num_vertices as f64;
    let vertices = (0..num_vertices)
      .map(|i| {
        let (sin_a, cos_a) = (i as f64 * step).sin_cos();
        Point(x * (sin_r * cos_a) + y * (sin_r * sin_a) + z * cos_r).normalize()
      })
      .collect();
    Loop::new(vertices)
  }

  // A loop whose origin containment is already known, as when decoding.
  pub(crate) fn from_raw_parts(vertices: Vec<Point>, origin_inside: bool, depth: i32) -> Loop {
    let mut l = Loop { vertices, origin_inside, depth, bound: Rect::full(), index: OnceLock::new() };
    l.init_bound();
    l
  }

  fn init_origin_and_bound(&mut self) {
    if self.vertices.len() < 3 {
      // Only the special empty and full loops may have fewer than three vertices; the
      // vertex hemisphere tells them apart.
      self.origin_inside = self.is_empty_or_full() && self.vertices[0].0.z < 0.0;
    } else {
      // Vertex 1 is inside iff the angle at it opens towards the interior; comparing that
      // with the parity seen from an origin assumed outside fixes the origin.
      let v1_inside = ordered_ccw(self.vertices[1].ortho(), self.vertices[0], self.vertices[2], self.vertices[1]);
      self.origin_inside = false;
      if v1_inside != self.brute_force_contains_point(self.vertices[1]) {
        self.origin_inside = true;
      }
    }
    self.init_bound();
  }

  fn init_bound(&mut self) {
    if self.vertices.is_empty() {
      self.bound = Rect::empty();
      return;
    }
    if self.is_empty_or_full() {
      self.bound = if self.origin_inside { Rect::full() } else { Rect::empty() };
      return;
    }
    let mut bounder = RectBounder::new();
    for i in 0..=self.vertices.len() {
      bounder.add_point(self.vertex(i));
    }
    let mut bound = bounder.rect_bound();
    // The edges alone miss a pole the loop wraps around.
    self.bound = Rect::full();
    if self.contains_point(Point::from_coords(0.0, 0.0, 1.0)) {
      bound = Rect::new(R1Interval::new(bound.lat.lo, M_PI_2), S1Interval::full());
    }
    if bound.lng.is_full() && self.contains_point(Point::from_coords(0.0, 0.0, -1.0)) {
      bound.lat.lo = -M_PI_2;
    }
    self.bound = bound;
  }

  #[inline]
  #[must_use]
  pub fn vertices(&self) -> &[Point] {
    &self.vertices
  }

  #[inline]
  #[must_use]
  pub fn num_vertices(&self) -> usize {
    self.vertices.len()
  }

  /// Vertex `i` modulo the number of vertices, so `vertex(n)` is `vertex(0)`.
  #[inline]
  #[must_use]
  pub fn vertex(&self, i: usize) -> Point {
    self.vertices[i % self.vertices.len()]
  }

  #[inline]
  fn is_empty_or_full(&self) -> bool {
    self.vertices.len() == 1
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.is_empty_or_full() && !self.origin_inside
  }

  #[must_use]
  pub fn is_full(&self) -> bool {
    self.is_empty_or_full() && self.origin_inside
  }

  /// Whether the loop contains [`Point::origin`].
  #[inline]
  #[must_use]
  pub fn contains_origin(&self) -> bool {
    self.origin_inside
  }

  #[inline]
  #[must_use]
  pub fn depth(&self) -> i32 {
    self.depth
  }

  pub fn set_depth(&mut self, depth: i32) {
    self.depth = depth;
  }

  #[inline]
  #[must_use]
  pub fn is_hole(&self) -> bool {
    self.depth & 1 != 0
  }

  /// -1 for holes, 1 otherwise.
  #[inline]
  #[must_use]
  pub fn sign(&self) -> i32 {
    if self.is_hole() {
      -1
    } else {
      1
    }
  }

  #[inline]
  #[must_use]
  pub fn bound(&self) -> Rect {
    self.bound
  }

  /// The index of this loop's edges, built on first use.
  #[must_use]
  pub fn index(&self) -> &ShapeIndex {
    self.index.get_or_init(|| {
      let mut index = ShapeIndex::new();
      index.add(self.clone());
      index
    })
  }

  /// Whether the loop contains `p`. Vertices follow the semi-open model: of the loops sharing
  /// a vertex, exactly one contains it.
  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    if !self.bound.contains_point(p) {
      return false;
    }
    if self.vertices.len() < MAX_BRUTE_FORCE_VERTICES {
      return self.brute_force_contains_point(p);
    }
    ContainsPointQuery::new(self.index(), VertexModel::SemiOpen).shape_contains(0, p)
  }

  fn brute_force_contains_point(&self, p: Point) -> bool {
    let mut inside = self.origin_inside;
    let mut crosser = EdgeCrosser::new_chain(Point::origin(), p, self.vertex(0));
    for i in 1..=self.vertices.len() {
      inside ^= crosser.edge_or_vertex_chain_crossing(self.vertex(i));
    }
    inside
  }

  /// Whether the loop encloses at most half the sphere.
  #[must_use]
  pub fn is_normalized(&self) -> bool {
    // A bound narrower than a hemisphere in longitude settles it cheaply.
    if self.bound.lng.length() < std::f64::consts::PI {
      return true;
    }
    self.turning_angle() >= -self.turning_angle_max_error()
  }

  /// Inverts the loop if it encloses more than half the sphere.
  pub fn normalize(&mut self) {
    if !self.is_normalized() {
      self.invert();
    }
  }

  /// Swaps interior and exterior.
  pub fn invert(&mut self) {
    self.index = OnceLock::new();
    if self.is_empty_or_full() {
      let z = if self.is_full() { 1.0 } else { -1.0 };
      self.vertices[0] = Point::from_coords(0.0, 0.0, z);
    } else {
      self.vertices.reverse();
    }
    self.origin_inside = !self.origin_inside;
    self.init_bound();
  }

  /// Sum of the turn angles at each vertex: 2*Pi for a tiny counterclockwise loop, -2*Pi for
  /// a tiny clockwise one, and 0 for a loop along a great circle. The result does not depend
  /// on which vertex comes first.
  #[must_use]
  pub fn turning_angle(&self) -> f64 {
    if self.is_empty_or_full() {
      return if self.origin_inside { -M_2PI } else { M_2PI };
    }
    let n = self.vertices.len();
    if n < 3 {
      return 0.0;
    }

    // Start at the smallest vertex, walking towards its smaller neighbor, so the sum is
    // computed in the same order for every rotation and reflection of the loop.
    let (first, dir) = self.canonical_first_vertex();
    let v = |i: isize| self.vertices[i.rem_euclid(n as isize) as usize];
    let mut i = first;
    let mut sum = turn_angle(v(i - dir), v(i), v(i + dir)).radians();
    // Kahan summation.
    let mut compensation = 0.0;
    for _ in 1..n {
      i += dir;
      let angle = turn_angle(v(i - dir), v(i), v(i + dir)).radians() + compensation;
      let old_sum = sum;
      sum += angle;
      compensation = (old_sum - sum) + angle;
    }
    let max_curvature = M_2PI - 4.0 * f64::EPSILON;
    (dir as f64 * (sum + compensation)).clamp(-max_curvature, max_curvature)
  }

  fn canonical_first_vertex(&self) -> (isize, isize) {
    let n = self.vertices.len();
    let mut first = 0;
    for i in 1..n {
      if self.vertices[i].0 < self.vertices[first].0 {
        first = i;
      }
    }
    if self.vertex(first + 1).0 < self.vertex(first + n - 1).0 {
      (first as isize, 1)
    } else {
      ((first + n) as isize, -1)
    }
  }

  fn turning_angle_max_error(&self) -> f64 {
    TURNING_ANGLE_MAX_ERROR_PER_VERTEX * self.vertices.len() as f64
  }

  /// Area of the interior in steradians, in [0, 4*Pi].
  #[must_use]
  pub fn area(&self) -> f64 {
    if self.is_empty_or_full() {
      return if self.origin_inside { M_4PI } else { 0.0 };
    }
    let mut area = self.surface_integral(signed_area, 0.0, |sum, x| sum + x);
    // The signed sum is off by a multiple of 4*Pi for loops around the surface origin.
    if area < 0.0 {
      area += M_4PI;
    }
    area = area.clamp(0.0, M_4PI);
    // Near the limits the orientation decides between empty-like and full-like loops.
    let max_error = self.turning_angle_max_error();
    if area < max_error && !self.is_normalized() {
      return M_4PI;
    }
    if area > M_4PI - max_error && self.is_normalized() {
      return 0.0;
    }
    area
  }

  /// Centroid of the interior scaled by its area. Not unit length; zero for empty and full
  /// loops.
  #[must_use]
  pub fn centroid(&self) -> Point {
    self.surface_integral(true_centroid, Point::default(), |sum, x| sum + x)
  }

  // Sums `f` over a fan of triangles covering the loop. The fan origin moves whenever the
  // next vertex gets close to its antipode, where triangle measures become unstable.
  fn surface_integral<T: Copy>(&self, f: fn(Point, Point, Point) -> T, zero: T, add: fn(T, T) -> T) -> T {
    const MAX_LENGTH: f64 = std::f64::consts::PI - 1e-5;
    let n = self.vertices.len();
    let mut sum = zero;
    let mut origin = self.vertex(0);
    for i in 1..n.saturating_sub(1) {
      if origin.distance(self.vertex(i + 1)).radians() > MAX_LENGTH {
        let old_origin = origin;
        if origin == self.vertex(0) {
          origin = self.vertex(0).point_cross(self.vertex(i)).normalize();
        } else if self.vertex(i).distance(self.vertex(0)).radians() < MAX_LENGTH {
          origin = self.vertex(0);
        } else {
          origin = Point(self.vertex(0).0.cross(old_origin.0));
          sum = add(sum, f(self.vertex(0), old_origin, origin));
        }
        sum = add(sum, f(old_origin, self.vertex(i), origin));
      }
      sum = add(sum, f(origin, self.vertex(i), self.vertex(i + 1)));
    }
    if origin != self.vertex(0) {
      sum = add(sum, f(origin, self.vertex(n - 1), self.vertex(0)));
    }
    sum
  }

  /// Checks that the loop is well formed: unit-length vertices, no degenerate or antipodal
  /// edges, no repeated vertices and no crossing edges.
  pub fn validate(&self) -> Result<()> {
    self.validate_vertices()?;
    self.validate_crossings()
  }

  /// Whether [`Loop::validate`] succeeds.
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.validate().is_ok()
  }

  fn validate_vertices(&self) -> Result<()> {
    if let Some(i) = self.vertices.iter().position(|v| !v.is_unit()) {
      return Err(S2Error::InvalidLoop(format!("vertex {i} is not unit length")));
    }
    if self.vertices.len() < 3 {
      if self.is_empty_or_full() {
        return Ok(());
      }
      return Err(S2Error::InvalidLoop("non-empty, non-full loops must have at least 3 vertices".into()));
    }
    let n = self.vertices.len();
    for i in 0..n {
      let next = self.vertex(i + 1);
      if self.vertices[i] == next {
        return Err(S2Error::InvalidLoop(format!("edge {i} is degenerate (duplicate vertex)")));
      }
      if self.vertices[i] == -next {
        return Err(S2Error::InvalidLoop(format!("vertices {i} and {} are antipodal", (i + 1) % n)));
      }
    }
    let mut sorted: Vec<(Vector, usize)> = self.vertices.iter().enumerate().map(|(i, v)| (v.0, i)).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    for w in sorted.windows(2) {
      if w[0].0 == w[1].0 {
        return Err(S2Error::InvalidLoop(format!("vertices {} and {} are identical", w[0].1, w[1].1)));
      }
    }
    Ok(())
  }

  fn validate_crossings(&self) -> Result<()> {
    if self.is_empty_or_full() {
      return Ok(());
    }
    let n = self.vertices.len() as i32;
    let index = self.index();
    let table = index.cell_table();
    let mut data = IndexCellData::new();
    for (&id, cell) in table.ids.iter().zip(&table.cells) {
      data.load_cell(index, id, cell);
      let edges = data.shape_edges(0);
      for (k, a) in edges.iter().enumerate() {
        for b in &edges[k + 1..] {
          // Adjacent edges share a vertex and never cross at interior points.
          let (lo, hi) = (a.id.min(b.id), a.id.max(b.id));
          if hi == lo + 1 || (lo == 0 && hi == n - 1) {
            continue;
          }
          if crossing_sign(a.edge.v0, a.edge.v1, b.edge.v0, b.edge.v1) == Crossing::Cross {
            return Err(S2Error::InvalidLoop(format!("edge {} crosses edge {}", a.id, b.id)));
          }
        }
      }
    }
    Ok(())
  }

  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    self.bound.cap_bound()
  }

  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    self.bound
  }

  /// Whether the loop contains the whole cell. May return false for cells that touch the
  /// boundary.
  #[must_use]
  pub fn contains_cell(&self, cell: &Cell) -> bool {
    if !self.bound.contains(&cell.rect_bound()) {
      return false;
    }
    ShapeIndexRegion::new(self.index()).contains_cell(cell)
  }

  /// Whether the loop may intersect the cell.
  #[must_use]
  pub fn intersects_cell(&self, cell: &Cell) -> bool {
    if !self.bound.intersects(&cell.rect_bound()) {
      return false;
    }
    ShapeIndexRegion::new(self.index()).intersects_cell(cell)
  }

  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    ShapeIndexRegion::new(self.index()).cell_union_bound()
  }
}

impl Clone for Loop {
  fn clone(&self) -> Self {
    Loop {
      vertices: self.vertices.clone(),
      origin_inside: self.origin_inside,
      depth: self.depth,
      bound: self.bound,
      index: OnceLock::new(),
    }
  }
}

impl PartialEq for Loop {
  fn eq(&self, other: &Self) -> bool {
    self.vertices == other.vertices && self.origin_inside == other.origin_inside
  }
}

impl std::fmt::Debug for Loop {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Loop")
      .field("vertices", &self.vertices)
      .field("origin_inside", &self.origin_inside)
      .field("depth", &self.depth)
      .finish_non_exhaustive()
  }
}

impl Shape for Loop {
  fn num_edges(&self) -> usize {
    if self.is_empty_or_full() {
      0
    } else {
      self.vertices.len()
    }
  }

  fn edge(&self, i: usize) -> Edge {
    Edge::new(self.vertex(i), self.vertex(i + 1))
  }

  fn reference_point(&self) -> ReferencePoint {
    ReferencePoint::origin(self.origin_inside)
  }

  fn num_chains(&self) -> usize {
    usize::from(!self.is_empty())
  }

  fn chain(&self, _chain_id: usize) -> Chain {
    Chain { start: 0, length: self.num_edges() }
  }

  fn chain_edge(&self, _chain_id: usize, offset: usize) -> Edge {
    self.edge(offset)
  }

  fn chain_position(&self, edge_id: usize) -> ChainPosition {
    ChainPosition { chain_id: 0, offset: edge_id }
  }

  fn dimension(&self) -> Dimension {
    Dimension::Polygon
  }
}

impl Region for Loop {
  fn cap_bound(&self) -> Cap {
    Loop::cap_bound(self)
  }

  fn rect_bound(&self) -> Rect {
    Loop::rect_bound(self)
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    Loop::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    Loop::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    Loop::contains_point(self, p)
  }

  fn cell_union_bound(&self) -> Vec<CellId> {
    Loop::cell_union_bound(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::latlng::LatLng;

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  fn ll(lat: f64, lng: f64) -> Point {
    LatLng::from_degrees(lat, lng).to_point()
  }

  // The octant x, y, z > 0.
  fn octant() -> Loop {
    Loop::new(vec![p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)])
  }

  #[test]
  fn test_empty_and_full() {
    let empty = Loop::empty();
    let full = Loop::full();
    assert!(empty.is_empty() && !empty.is_full());
    assert!(full.is_full() && !full.is_empty());
    assert_eq!(empty.num_edges(), 0);
    assert_eq!(empty.num_chains(), 0);
    assert_eq!(full.num_chains(), 1);
    assert!(!empty.contains_point(p(0.3, 0.2, 0.1)));
    assert!(full.contains_point(p(0.3, 0.2, 0.1)));
    assert_eq!(empty.area(), 0.0);
    assert_eq!(full.area(), M_4PI);
    assert!(empty.validate().is_ok() && full.validate().is_ok());
  }

  #[test]
  fn test_octant_containment_and_area() {
    let l = octant();
    assert!(l.contains_point(p(1.0, 1.0, 1.0)));
    assert!(!l.contains_point(p(-1.0, 1.0, 1.0)));
    assert!(!l.contains_origin());
    assert!((l.area() - M_PI_2).abs() < 1e-14);
    // Gauss-Bonnet: the turning angle and the area sum to 2*Pi.
    assert!((l.turning_angle() + l.area() - M_2PI).abs() < 1e-14);
    let c = l.centroid().normalize();
    assert!((c.0.x - c.0.y).abs() < 1e-14 && (c.0.y - c.0.z).abs() < 1e-14);
  }

  #[test]
  fn test_invert_and_normalize() {
    let mut l = octant();
    assert!(l.is_normalized());
    l.invert();
    assert!(!l.is_normalized());
    assert!(l.contains_point(p(-1.0, 1.0, 1.0)));
    assert!((l.area() - (M_4PI - M_PI_2)).abs() < 1e-13);
    l.normalize();
    assert!(l.is_normalized());
    assert!(l.contains_point(p(1.0, 1.0, 1.0)));

    let mut e = Loop::empty();
    e.invert();
    assert!(e.is_full());
  }

  #[test]
  fn test_turning_angle_independent_of_start() {
    let l = Loop::regular(p(0.0, 0.0, 1.0), Angle::from_degrees(10.0), 7);
    let mut rotated = l.vertices().to_vec();
    rotated.rotate_left(3);
    let r = Loop::new(rotated);
    assert_eq!(l.turning_angle(), r.turning_angle());
    assert!(l.turning_angle() > 0.0);
    let mut reversed = l.vertices().to_vec();
    reversed.reverse();
    assert_eq!(Loop::new(reversed).turning_angle(), -l.turning_angle());
  }

  #[test]
  fn test_bound_includes_pole() {
    // A loop circling the north pole at 80 degrees latitude.
    let l = Loop::new((0..6).map(|i| ll(80.0, f64::from(i) * 60.0)).collect());
    assert!(l.contains_point(p(0.0, 0.0, 1.0)));
    let bound = l.bound();
    assert_eq!(bound.lat.hi, M_PI_2);
    assert!(bound.lng.is_full());
    assert!((bound.lat.lo - 80f64.to_radians()).abs() < 1e-13);
  }

  #[test]
  fn test_large_loop_uses_index() {
    let center = p(1.0, 2.0, 3.0);
    let l = Loop::regular(center, Angle::from_degrees(5.0), 100);
    assert!(l.vertices().len() >= MAX_BRUTE_FORCE_VERTICES);
    assert!(l.contains_point(center));
    assert!(!l.contains_point(-center));
    for i in 0..100 {
      // Just inside and just outside the midpoint of each edge.
      let mid = (l.vertex(i) + l.vertex(i + 1)).normalize();
      let inward = (mid * 0.999 + center.normalize() * 0.001).normalize();
      assert_eq!(l.contains_point(inward), l.brute_force_contains_point(inward));
    }
    let cell = Cell::from_cell_id(CellId::from_point(center).parent(12));
    assert!(l.contains_cell(&cell));
    assert!(l.intersects_cell(&cell));
    let far = Cell::from_cell_id(CellId::from_point(-center).parent(5));
    assert!(!l.intersects_cell(&far));
  }

  #[test]
  fn test_validate() {
    assert!(octant().validate().is_ok());
    let bowtie = Loop::new(vec![ll(0.0, 0.0), ll(10.0, 10.0), ll(0.0, 10.0), ll(10.0, 0.0)]);
    assert!(matches!(bowtie.validate(), Err(S2Error::InvalidLoop(msg)) if msg.contains("crosses")));
    let dup = Loop::new(vec![ll(0.0, 0.0), ll(0.0, 0.0), ll(10.0, 10.0)]);
    assert!(matches!(dup.validate(), Err(S2Error::InvalidLoop(msg)) if msg.contains("degenerate")));
    let two = Loop::new(vec![ll(0.0, 0.0), ll(10.0, 10.0)]);
    assert!(!two.is_valid());
    let repeated = Loop::new(vec![ll(0.0, 0.0), ll(10.0, 0.0), ll(0.0, 0.0), ll(10.0, 10.0)]);
    assert!(matches!(repeated.validate(), Err(S2Error::InvalidLoop(msg)) if msg.contains("identical")));
  }

  #[test]
  fn test_cell_loop() {
    let cell = Cell::from_cell_id(CellId::from_face(2).child_begin_at_level(3));
    let l = Loop::from_cell(&cell);
    assert!(l.validate().is_ok());
    assert!(l.contains_point(cell.center()));
    assert!((l.area() - cell.exact_area()).abs() < 1e-14);
  }

  #[test]
  fn test_clone_drops_index() {
    let l = Loop::regular(p(0.0, 1.0, 0.0), Angle::from_degrees(1.0), 40);
    assert_eq!(l.index().len(), 1);
    let c = l.clone();
    assert_eq!(c, l);
    assert!(c.index.get().is_none());
  }
}
