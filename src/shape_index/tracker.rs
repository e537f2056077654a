// src/shape_index/tracker.rs

use crate::cellid::CellId;
use crate::constants::MAX_LEVEL;
use crate::coords::stuv::face_uv_to_xyz;
use crate::edge::EdgeCrosser;
use crate::point::Point;
use crate::shape::Edge;

/// Tracks which polygonal shapes contain a moving focus point.
///
/// The focus starts at the entry vertex of the first cell on the curve and moves along the
/// curve while cells are emitted, so the set of containing shapes can be updated incrementally
/// by counting edge crossings along each segment.
#[derive(Debug, Clone)]
pub(crate) struct InteriorTracker {
  is_active: bool,
  a: Point,
  b: Point,
  next_cell_id: CellId,
  crosser: EdgeCrosser,
  // Sorted ids of the shapes that contain the focus.
  shape_ids: Vec<i32>,
}

impl InteriorTracker {
  pub(crate) fn new() -> InteriorTracker {
    let origin = Point::origin();
    let mut tracker = InteriorTracker {
      is_active: false,
      a: origin,
      b: origin,
      next_cell_id: CellId::from_face(0).child_begin_at_level(MAX_LEVEL),
      crosser: EdgeCrosser::new(origin, origin),
      shape_ids: Vec::new(),
    };
    tracker.draw_to(Point(face_uv_to_xyz(0, -1.0, -1.0).normalize()));
    tracker
  }

  #[inline]
  pub(crate) fn is_active(&self) -> bool {
    self.is_active
  }

  #[inline]
  pub(crate) fn focus(&self) -> Point {
    self.b
  }

  #[inline]
  pub(crate) fn shape_ids(&self) -> &[i32] {
    &self.shape_ids
  }

  /// Registers a polygonal shape; `contains_focus` seeds its state.
  pub(crate) fn add_shape(&mut self, shape_id: i32, contains_focus: bool) {
    self.is_active = true;
    if contains_focus {
      self.toggle_shape(shape_id);
    }
  }

  /// Moves the focus without updating containment.
  pub(crate) fn move_to(&mut self, b: Point) {
    self.b = b;
  }

  /// Moves the focus along a segment; crossings are reported through `test_edge`.
  pub(crate) fn draw_to(&mut self, b: Point) {
    self.a = self.b;
    self.b = b;
    self.crosser = EdgeCrosser::new(self.a, self.b);
  }

  pub(crate) fn test_edge(&mut self, shape_id: i32, edge: &Edge) {
    if self.crosser.edge_or_vertex_crossing(edge.v0, edge.v1) {
      self.toggle_shape(shape_id);
    }
  }

  /// Records that the focus is at the start of `next_cell_id`.
  pub(crate) fn set_next_cell_id(&mut self, next_cell_id: CellId) {
    self.next_cell_id = next_cell_id.range_min();
  }

  pub(crate) fn at_cell_id(&self, id: CellId) -> bool {
    id.range_min() == self.next_cell_id
  }

  fn toggle_shape(&mut self, shape_id: i32) {
    match self.shape_ids.binary_search(&shape_id) {
      Ok(pos) => {
        self.shape_ids.remove(pos);
      }
      Err(pos) => self.shape_ids.insert(pos, shape_id),
    }
  }
}
