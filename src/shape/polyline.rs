// src/shape/polyline.rs

use crate::math::s1::Angle;
use crate::point::Point;
use crate::shape::{Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape, TYPE_TAG_POLYLINE};

/// A connected sequence of vertices joined by geodesic edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
  vertices: Vec<Point>,
}

impl Polyline {
  #[must_use]
  pub fn new(vertices: Vec<Point>) -> Polyline {
    Polyline { vertices }
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

  #[inline]
  #[must_use]
  pub fn vertex(&self, i: usize) -> Point {
    self.vertices[i]
  }

  /// Total arc length of the edges.
  #[must_use]
  pub fn length(&self) -> Angle {
    self.vertices.windows(2).fold(Angle::from_radians(0.0), |acc, w| acc + w[0].distance(w[1]))
  }

  /// The same vertices in reverse order.
  #[must_use]
  pub fn reversed(&self) -> Polyline {
    Polyline { vertices: self.vertices.iter().rev().copied().collect() }
  }
}

impl Shape for Polyline {
  fn num_edges(&self) -> usize {
    self.vertices.len().saturating_sub(1)
  }

  fn edge(&self, i: usize) -> Edge {
    Edge::new(self.vertices[i], self.vertices[i + 1])
  }

  fn reference_point(&self) -> ReferencePoint {
    ReferencePoint::origin(false)
  }

  fn num_chains(&self) -> usize {
    self.num_edges().min(1)
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
    Dimension::Polyline
  }

  fn type_tag(&self) -> u32 {
    TYPE_TAG_POLYLINE
  }
}
