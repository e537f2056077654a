// src/query/contains_point.rs

use crate::edge::{vertex_crossing, Crossing, EdgeCrosser};
use crate::point::Point;
use crate::shape::{Dimension, ShapeEdge, ShapeEdgeId};
use crate::shape_index::{ClippedShape, ShapeIndex};
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Whether shapes contain their own vertices.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
pub enum VertexModel {
  /// No shape contains its vertices, not even points.
  Open = 0,
  /// Polygon vertices are assigned to exactly one of the polygons sharing them, so a point
  /// on a shared vertex is contained by exactly one polygon of a tiling. Points and
  /// polylines contain nothing.
  #[default]
  SemiOpen = 1,
  /// Every shape contains its vertices, including points and polyline vertices.
  Closed = 2,
}

/// Finds the shapes of an index that contain a point.
///
/// Only polygons contain points in their interior; under the closed model every shape also
/// contains its vertices.
#[derive(Debug, Clone, Copy)]
pub struct ContainsPointQuery<'a> {
  index: &'a ShapeIndex,
  model: VertexModel,
}

impl<'a> ContainsPointQuery<'a> {
  #[must_use]
  pub fn new(index: &'a ShapeIndex, model: VertexModel) -> ContainsPointQuery<'a> {
    ContainsPointQuery { index, model }
  }

  #[inline]
  #[must_use]
  pub fn index(&self) -> &'a ShapeIndex {
    self.index
  }

  /// Whether any shape contains `p`.
  #[must_use]
  pub fn contains(&self, p: Point) -> bool {
    !self.visit_containing_shapes(p, |_| false)
  }

  /// Whether the shape with the given id contains `p`.
  #[must_use]
  pub fn shape_contains(&self, shape_id: i32, p: Point) -> bool {
    let mut it = self.index.iter();
    if !it.locate_point(p) {
      return false;
    }
    match it.index_cell().find_by_shape_id(shape_id) {
      Some(clipped) => self.shape_contains_clipped(it.center(), clipped, p),
      None => false,
    }
  }

  /// Ids of every shape containing `p`, in increasing order.
  #[must_use]
  pub fn containing_shapes(&self, p: Point) -> Vec<i32> {
    let mut ids = Vec::new();
    self.visit_containing_shapes(p, |id| {
      ids.push(id);
      true
    });
    ids
  }

  /// Calls `visitor` with the id of each shape containing `p`, stopping early when it returns
  /// false. Returns false if stopped early.
  pub fn visit_containing_shapes<F>(&self, p: Point, mut visitor: F) -> bool
  where
    F: FnMut(i32) -> bool,
  {
    let mut it = self.index.iter();
    if !it.locate_point(p) {
      return true;
    }
    let center = it.center();
    for clipped in it.index_cell().shapes() {
      if self.shape_contains_clipped(center, clipped, p) && !visitor(clipped.shape_id()) {
        return false;
      }
    }
    true
  }

  /// Calls `visitor` with every edge that has `p` as a vertex, stopping early when it returns
  /// false. Returns false if stopped early.
  pub fn visit_incident_edges<F>(&self, p: Point, mut visitor: F) -> bool
  where
    F: FnMut(ShapeEdge) -> bool,
  {
    let mut it = self.index.iter();
    if !it.locate_point(p) {
      return true;
    }
    for clipped in it.index_cell().shapes() {
      let Some(shape) = self.index.shape(clipped.shape_id()) else {
        continue;
      };
      for &edge_id in clipped.edges() {
        let edge = shape.edge(edge_id as usize);
        if edge.v0 == p || edge.v1 == p {
          let id = ShapeEdgeId { shape_id: clipped.shape_id(), edge_id };
          if !visitor(ShapeEdge { id, edge }) {
            return false;
          }
        }
      }
    }
    true
  }

  /// Containment of `p` by a clipped shape of the cell whose center is `center`.
  pub(crate) fn shape_contains_clipped(&self, center: Point, clipped: &ClippedShape, p: Point) -> bool {
    let mut inside = clipped.contains_center();
    if clipped.num_edges() == 0 {
      return inside;
    }
    let Some(shape) = self.index.shape(clipped.shape_id()) else {
      return false;
    };
    if shape.dimension() != Dimension::Polygon {
      // Only vertices can contain the point, and only under the closed model.
      if self.model != VertexModel::Closed {
        return false;
      }
      return clipped.edges().iter().any(|&e| {
        let edge = shape.edge(e as usize);
        edge.v0 == p || edge.v1 == p
      });
    }
    let mut crosser = EdgeCrosser::new(center, p);
    for &e in clipped.edges() {
      let edge = shape.edge(e as usize);
      match crosser.crossing_sign(edge.v0, edge.v1) {
        Crossing::DoNotCross => {}
        Crossing::Cross => inside = !inside,
        Crossing::MaybeCross => {
          if self.model != VertexModel::SemiOpen && (edge.v0 == p || edge.v1 == p) {
            return self.model == VertexModel::Closed;
          }
          inside ^= vertex_crossing(center, p, edge.v0, edge.v1);
        }
      }
    }
    inside
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shape::{LaxPolygon, PointVector, Polyline};

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  fn square(lo: f64, hi: f64) -> LaxPolygon {
    LaxPolygon::from_loops(&[vec![p(1.0, lo, lo), p(1.0, hi, lo), p(1.0, hi, hi), p(1.0, lo, hi)]])
  }

  #[test]
  fn test_vertex_models() {
    let mut index = ShapeIndex::new();
    let vertex = p(1.0, 0.3, 0.3);
    index.add(PointVector::new(vec![vertex]));
    index.add(Polyline::new(vec![vertex, p(1.0, 0.4, 0.3)]));
    index.add(square(0.1, 0.3));

    let open = ContainsPointQuery::new(&index, VertexModel::Open);
    let semi = ContainsPointQuery::new(&index, VertexModel::SemiOpen);
    let closed = ContainsPointQuery::new(&index, VertexModel::Closed);
    assert!(open.containing_shapes(vertex).is_empty());
    assert_eq!(closed.containing_shapes(vertex), vec![0, 1, 2]);
    assert!(!semi.shape_contains(0, vertex));
    assert!(!semi.shape_contains(1, vertex));

    let interior = p(1.0, 0.2, 0.2);
    for q in [open, semi, closed] {
      assert!(q.contains(interior));
      assert!(q.shape_contains(2, interior));
      assert!(!q.contains(p(1.0, -0.2, 0.2)));
    }
  }

  #[test]
  fn test_semi_open_tiling_assigns_shared_vertex_once() {
    // Four squares sharing the vertex (1, 0.2, 0.2).
    let mut index = ShapeIndex::new();
    let quad = |y0: f64, y1: f64, z0: f64, z1: f64| {
      LaxPolygon::from_loops(&[vec![p(1.0, y0, z0), p(1.0, y1, z0), p(1.0, y1, z1), p(1.0, y0, z1)]])
    };
    index.add(quad(0.1, 0.2, 0.1, 0.2));
    index.add(quad(0.2, 0.3, 0.1, 0.2));
    index.add(quad(0.2, 0.3, 0.2, 0.3));
    index.add(quad(0.1, 0.2, 0.2, 0.3));
    let q = ContainsPointQuery::new(&index, VertexModel::SemiOpen);
    assert_eq!(q.containing_shapes(p(1.0, 0.2, 0.2)).len(), 1);
  }

  #[test]
  fn test_visit_incident_edges() {
    let mut index = ShapeIndex::new();
    index.add(square(0.1, 0.3));
    let q = ContainsPointQuery::new(&index, VertexModel::SemiOpen);
    let mut found = Vec::new();
    assert!(q.visit_incident_edges(p(1.0, 0.1, 0.1), |e| {
      found.push(e.id.edge_id);
      true
    }));
    found.sort_unstable();
    assert_eq!(found, vec![0, 3]);
    assert!(!q.visit_incident_edges(p(1.0, 0.1, 0.1), |_| false));
  }
}
