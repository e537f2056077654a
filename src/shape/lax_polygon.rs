// src/shape/lax_polygon.rs

use crate::point::Point;
use crate::shape::{
  reference_point_for_shape, Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape, TYPE_TAG_LAX_POLYGON,
};

/// A polygon given as loops with no validity requirements.
///
/// A loop with one vertex is a degenerate edge. A loop with no vertices is the full loop. Each
/// loop contributes one chain, and the edge count equals the total vertex count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaxPolygon {
  vertices: Vec<Point>,
  // loop_starts[i] is the index of loop i's first vertex; one trailing entry holds the total.
  loop_starts: Vec<usize>,
}

impl LaxPolygon {
  #[must_use]
  pub fn from_loops(loops: &[Vec<Point>]) -> LaxPolygon {
    let mut vertices = Vec::with_capacity(loops.iter().map(Vec::len).sum());
    let mut loop_starts = Vec::with_capacity(loops.len() + 1);
    loop_starts.push(0);
    for l in loops {
      vertices.extend_from_slice(l);
      loop_starts.push(vertices.len());
    }
    LaxPolygon { vertices, loop_starts }
  }

  #[inline]
  #[must_use]
  pub fn num_loops(&self) -> usize {
    self.loop_starts.len().saturating_sub(1)
  }

  #[inline]
  #[must_use]
  pub fn num_loop_vertices(&self, i: usize) -> usize {
    self.loop_starts[i + 1] - self.loop_starts[i]
  }

  #[inline]
  #[must_use]
  pub fn loop_vertex(&self, i: usize, j: usize) -> Point {
    self.vertices[self.loop_starts[i] + j]
  }

  #[inline]
  #[must_use]
  pub fn num_vertices(&self) -> usize {
    self.vertices.len()
  }
}

impl Shape for LaxPolygon {
  fn num_edges(&self) -> usize {
    self.vertices.len()
  }

  fn edge(&self, e: usize) -> Edge {
    let pos = self.chain_position(e);
    self.chain_edge(pos.chain_id, pos.offset)
  }

  fn reference_point(&self) -> ReferencePoint {
    reference_point_for_shape(self)
  }

  fn num_chains(&self) -> usize {
    self.num_loops()
  }

  fn chain(&self, chain_id: usize) -> Chain {
    Chain { start: self.loop_starts[chain_id], length: self.num_loop_vertices(chain_id) }
  }

  fn chain_edge(&self, chain_id: usize, offset: usize) -> Edge {
    let n = self.num_loop_vertices(chain_id);
    let next = if offset + 1 == n { 0 } else { offset + 1 };
    Edge::new(self.loop_vertex(chain_id, offset), self.loop_vertex(chain_id, next))
  }

  fn chain_position(&self, edge_id: usize) -> ChainPosition {
    // Last loop whose start is <= edge_id; empty loops share a start with their successor.
    let chain_id = self.loop_starts.partition_point(|&s| s <= edge_id) - 1;
    ChainPosition { chain_id, offset: edge_id - self.loop_starts[chain_id] }
  }

  fn dimension(&self) -> Dimension {
    Dimension::Polygon
  }

  fn type_tag(&self) -> u32 {
    TYPE_TAG_LAX_POLYGON
  }
}
