// src/shape/edge_vector.rs

use crate::point::Point;
use crate::shape::{Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape};

/// An arbitrary soup of edges, each in a chain of its own. Used to index edge sets that form
/// neither polylines nor loops.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct EdgeVector {
  edges: Vec<Edge>,
}

impl EdgeVector {
  pub(crate) fn new(edges: Vec<Edge>) -> EdgeVector {
    EdgeVector { edges }
  }

  pub(crate) fn from_pairs(pairs: &[(Point, Point)]) -> EdgeVector {
    EdgeVector::new(pairs.iter().map(|&(a, b)| Edge::new(a, b)).collect())
  }

  pub(crate) fn push(&mut self, a: Point, b: Point) {
    self.edges.push(Edge::new(a, b));
  }
}

impl Shape for EdgeVector {
  fn num_edges(&self) -> usize {
    self.edges.len()
  }

  fn edge(&self, i: usize) -> Edge {
    self.edges[i]
  }

  fn reference_point(&self) -> ReferencePoint {
    ReferencePoint::origin(false)
  }

  fn num_chains(&self) -> usize {
    self.edges.len()
  }

  fn chain(&self, chain_id: usize) -> Chain {
    Chain { start: chain_id, length: 1 }
  }

  fn chain_edge(&self, chain_id: usize, _offset: usize) -> Edge {
    self.edges[chain_id]
  }

  fn chain_position(&self, edge_id: usize) -> ChainPosition {
    ChainPosition { chain_id: edge_id, offset: 0 }
  }

  fn dimension(&self) -> Dimension {
    Dimension::Polyline
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_each_edge_is_a_chain() {
    let a = Point::from_coords(1.0, 0.0, 0.0);
    let b = Point::from_coords(0.0, 1.0, 0.0);
    let c = Point::from_coords(0.0, 0.0, 1.0);
    let mut ev = EdgeVector::from_pairs(&[(a, b)]);
    ev.push(c, a);
    assert_eq!(ev.num_edges(), 2);
    assert_eq!(ev.num_chains(), 2);
    assert_eq!(ev.chain_edge(1, 0), Edge::new(c, a));
    assert_eq!(ev.chain_position(1), ChainPosition { chain_id: 1, offset: 0 });
    assert_eq!(ev.dimension(), Dimension::Polyline);
    assert!(EdgeVector::default().is_empty());
  }
}
