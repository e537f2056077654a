// src/shape/mod.rs

//! The shape abstraction: geometry exposed as edges grouped into chains.

#[cfg(test)]
pub(crate) mod edge_vector;
pub mod lax_polygon;
pub mod lax_polyline;
pub mod point_vector;
pub mod polyline;

use std::cmp::Ordering;

use crate::edge::EdgeCrosser;
use crate::point::Point;
use crate::predicates::ordered_ccw;
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

pub use lax_polygon::LaxPolygon;
pub use lax_polyline::LaxPolyline;
pub use point_vector::PointVector;
pub use polyline::Polyline;

/// A directed edge between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edge {
  pub v0: Point,
  pub v1: Point,
}

impl Edge {
  #[inline]
  #[must_use]
  pub fn new(v0: Point, v1: Point) -> Edge {
    Edge { v0, v1 }
  }

  #[inline]
  #[must_use]
  pub fn reversed(self) -> Edge {
    Edge { v0: self.v1, v1: self.v0 }
  }

  /// Lexicographic order on (v0, v1).
  #[must_use]
  pub fn cmp_lex(&self, other: &Edge) -> Ordering {
    self
      .v0
      .partial_cmp(&other.v0)
      .unwrap_or(Ordering::Equal)
      .then_with(|| self.v1.partial_cmp(&other.v1).unwrap_or(Ordering::Equal))
  }
}

/// A contiguous run of edges `[start, start + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chain {
  pub start: usize,
  pub length: usize,
}

/// Position of an edge within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainPosition {
  pub chain_id: usize,
  pub offset: usize,
}

/// A point together with whether the shape contains it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
  pub point: Point,
  pub contained: bool,
}

impl ReferencePoint {
  /// The fixed origin point with the given containment.
  #[must_use]
  pub fn origin(contained: bool) -> ReferencePoint {
    ReferencePoint { point: Point::origin(), contained }
  }
}

/// Dimension of a shape's geometry.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
pub enum Dimension {
  Point = 0,
  Polyline = 1,
  Polygon = 2,
}

/// Identifies an edge within a shape index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeEdgeId {
  pub shape_id: i32,
  pub edge_id: i32,
}

/// An edge together with its id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeEdge {
  pub id: ShapeEdgeId,
  pub edge: Edge,
}

pub const TYPE_TAG_NONE: u32 = 0;
pub const TYPE_TAG_POLYGON: u32 = 1;
pub const TYPE_TAG_POLYLINE: u32 = 2;
pub const TYPE_TAG_POINT_VECTOR: u32 = 3;
pub const TYPE_TAG_LAX_POLYLINE: u32 = 4;
pub const TYPE_TAG_LAX_POLYGON: u32 = 5;

/// Geometry made of edges, organized into chains.
///
/// Points are degenerate edges `(p, p)`, each in its own chain. Polylines are one chain.
/// Polygons have one chain per loop, and their interior lies to the left of every edge. A
/// polygon with no edges is empty unless it has a chain, in which case it is full.
pub trait Shape: Send + Sync {
  fn num_edges(&self) -> usize;

  fn edge(&self, i: usize) -> Edge;

  /// A point with known containment, used to seed crossing-parity tests. Only meaningful for
  /// two-dimensional shapes.
  fn reference_point(&self) -> ReferencePoint;

  fn num_chains(&self) -> usize;

  fn chain(&self, chain_id: usize) -> Chain;

  fn chain_edge(&self, chain_id: usize, offset: usize) -> Edge;

  fn chain_position(&self, edge_id: usize) -> ChainPosition;

  fn dimension(&self) -> Dimension;

  fn is_empty(&self) -> bool {
    self.num_edges() == 0 && (self.dimension() != Dimension::Polygon || self.num_chains() == 0)
  }

  fn is_full(&self) -> bool {
    self.num_edges() == 0 && self.dimension() == Dimension::Polygon && self.num_chains() > 0
  }

  /// Identifies the concrete type for encoding; 0 for types with no encoding.
  fn type_tag(&self) -> u32 {
    TYPE_TAG_NONE
  }
}

/// Whether a two-dimensional shape contains `p`, by counting crossings from its reference point.
#[must_use]
pub fn contains_brute_force(shape: &dyn Shape, p: Point) -> bool {
  if shape.dimension() != Dimension::Polygon {
    return false;
  }
  let reference = shape.reference_point();
  if reference.point == p {
    return reference.contained;
  }
  let mut crosser = EdgeCrosser::new(reference.point, p);
  let mut inside = reference.contained;
  for e in 0..shape.num_edges() {
    let edge = shape.edge(e);
    inside ^= crosser.edge_or_vertex_crossing(edge.v0, edge.v1);
  }
  inside
}

/// A reference point for a polygonal shape, derived from the orientation of its edges.
///
/// Works for any set of edges whose interior is on the left, including degenerate ones where
/// every edge is matched by its reverse; those are full if some chain has no edges and empty
/// otherwise.
#[must_use]
pub fn reference_point_for_shape(shape: &dyn Shape) -> ReferencePoint {
  if shape.num_edges() == 0 {
    return ReferencePoint::origin(shape.num_chains() > 0);
  }
  // Any vertex with an unmatched incident edge will do; usually the first one is.
  if let Some(r) = reference_point_at_vertex(shape, shape.edge(0).v0) {
    return r;
  }
  // Otherwise an edge present in one sorted list but not the other is unmatched.
  let n = shape.num_edges();
  let mut edges: Vec<Edge> = (0..n).map(|i| shape.edge(i)).collect();
  let mut rev_edges: Vec<Edge> = edges.iter().map(|e| e.reversed()).collect();
  edges.sort_by(Edge::cmp_lex);
  rev_edges.sort_by(Edge::cmp_lex);
  for (e, r) in edges.iter().zip(&rev_edges) {
    match e.cmp_lex(r) {
      Ordering::Less => {
        if let Some(rp) = reference_point_at_vertex(shape, e.v0) {
          return rp;
        }
      }
      Ordering::Greater => {
        if let Some(rp) = reference_point_at_vertex(shape, r.v0) {
          return rp;
        }
      }
      Ordering::Equal => {}
    }
  }
  // Every vertex is balanced.
  let has_empty_chain = (0..shape.num_chains()).any(|i| shape.chain(i).length == 0);
  ReferencePoint::origin(has_empty_chain)
}

// Containment of `v` itself, decided by whether the polygon contains the direction v.ortho()
// leaving it. None when every edge at `v` is matched.
fn reference_point_at_vertex(shape: &dyn Shape, v: Point) -> Option<ReferencePoint> {
  let mut query = ContainsVertexQuery::new(v);
  for e in 0..shape.num_edges() {
    let edge = shape.edge(e);
    if edge.v0 == v {
      query.add_edge(edge.v1, 1);
    }
    if edge.v1 == v {
      query.add_edge(edge.v0, -1);
    }
  }
  match query.contains_vertex() {
    0 => None,
    sign => Some(ReferencePoint { point: v, contained: sign > 0 }),
  }
}

/// Decides whether a polygon contains one of its vertices from the edges incident to it.
#[derive(Debug, Clone)]
pub struct ContainsVertexQuery {
  target: Point,
  // Net direction count per neighbor: +1 outgoing, -1 incoming.
  edges: Vec<(Point, i32)>,
}

impl ContainsVertexQuery {
  #[must_use]
  pub fn new(target: Point) -> ContainsVertexQuery {
    ContainsVertexQuery { target, edges: Vec::new() }
  }

  /// Adds an edge from the target to `v` (`direction` 1) or from `v` to the target (-1).
  pub fn add_edge(&mut self, v: Point, direction: i32) {
    match self.edges.iter_mut().find(|(p, _)| *p == v) {
      Some((_, d)) => *d += direction,
      None => self.edges.push((v, direction)),
    }
  }

  /// +1 if the target is contained, -1 if not, 0 if all incident edges are matched.
  #[must_use]
  pub fn contains_vertex(&self) -> i32 {
    // The unmatched edge immediately clockwise from target.ortho() decides.
    let reference_dir = self.target.ortho();
    let mut best_point = reference_dir;
    let mut best_dir = 0;
    for &(p, dir) in &self.edges {
      if dir == 0 {
        continue;
      }
      if ordered_ccw(reference_dir, best_point, p, self.target) {
        best_point = p;
        best_dir = dir;
      }
    }
    best_dir
  }
}
