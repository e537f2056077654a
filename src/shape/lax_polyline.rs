// src/shape/lax_polyline.rs

use crate::point::Point;
use crate::shape::{Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape, TYPE_TAG_LAX_POLYLINE};

/// A polyline with no validity requirements: duplicate and antipodal adjacent vertices are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaxPolyline {
  vertices: Vec<Point>,
}

impl LaxPolyline {
  #[must_use]
  pub fn new(vertices: Vec<Point>) -> LaxPolyline {
    LaxPolyline { vertices }
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
}

impl Shape for LaxPolyline {
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
    TYPE_TAG_LAX_POLYLINE
  }
}
