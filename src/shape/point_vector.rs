// src/shape/point_vector.rs

use crate::point::Point;
use crate::shape::{Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape, TYPE_TAG_POINT_VECTOR};

/// A set of points, each exposed as a degenerate edge in a chain of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointVector {
  points: Vec<Point>,
}

impl PointVector {
  #[must_use]
  pub fn new(points: Vec<Point>) -> PointVector {
    PointVector { points }
  }

  #[inline]
  #[must_use]
  pub fn points(&self) -> &[Point] {
    &self.points
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.points.len()
  }
}

impl Shape for PointVector {
  fn num_edges(&self) -> usize {
    self.points.len()
  }

  fn edge(&self, i: usize) -> Edge {
    Edge::new(self.points[i], self.points[i])
  }

  fn reference_point(&self) -> ReferencePoint {
    ReferencePoint::origin(false)
  }

  fn num_chains(&self) -> usize {
    self.points.len()
  }

  fn chain(&self, chain_id: usize) -> Chain {
    Chain { start: chain_id, length: 1 }
  }

  fn chain_edge(&self, chain_id: usize, _offset: usize) -> Edge {
    self.edge(chain_id)
  }

  fn chain_position(&self, edge_id: usize) -> ChainPosition {
    ChainPosition { chain_id: edge_id, offset: 0 }
  }

  fn dimension(&self) -> Dimension {
    Dimension::Point
  }

  fn type_tag(&self) -> u32 {
    TYPE_TAG_POINT_VECTOR
  }
}
