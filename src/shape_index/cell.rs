// src/shape_index/cell.rs

use crate::cellid::CellId;
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// How a cell id relates to the cells of an index.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
pub enum CellRelation {
  /// The target is contained by an index cell.
  Indexed = 0,
  /// The target is subdivided into one or more index cells.
  Subdivided = 1,
  /// The target does not intersect any index cell.
  Disjoint = 2,
}

/// The part of one shape that intersects an index cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClippedShape {
  pub(crate) shape_id: i32,
  pub(crate) contains_center: bool,
  // Sorted ids of the shape's edges that intersect the cell.
  pub(crate) edges: Vec<i32>,
}

impl ClippedShape {
  #[inline]
  #[must_use]
  pub fn shape_id(&self) -> i32 {
    self.shape_id
  }

  /// Whether the shape contains the center of the cell.
  #[inline]
  #[must_use]
  pub fn contains_center(&self) -> bool {
    self.contains_center
  }

  #[inline]
  #[must_use]
  pub fn num_edges(&self) -> usize {
    self.edges.len()
  }

  #[inline]
  #[must_use]
  pub fn edge(&self, i: usize) -> i32 {
    self.edges[i]
  }

  #[inline]
  #[must_use]
  pub fn edges(&self) -> &[i32] {
    &self.edges
  }

  #[must_use]
  pub fn contains_edge(&self, id: i32) -> bool {
    self.edges.binary_search(&id).is_ok()
  }
}

/// The shapes that intersect one cell of the index, ordered by shape id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShapeIndexCell {
  pub(crate) shapes: Vec<ClippedShape>,
}

impl ShapeIndexCell {
  #[inline]
  #[must_use]
  pub fn shapes(&self) -> &[ClippedShape] {
    &self.shapes
  }

  #[inline]
  #[must_use]
  pub fn num_clipped(&self) -> usize {
    self.shapes.len()
  }

  #[must_use]
  pub fn find_by_shape_id(&self, shape_id: i32) -> Option<&ClippedShape> {
    self.shapes.iter().find(|c| c.shape_id == shape_id)
  }

  /// Total number of clipped edges over all shapes.
  #[must_use]
  pub fn num_edges(&self) -> usize {
    self.shapes.iter().map(ClippedShape::num_edges).sum()
  }
}

/// The cells of a built index, sorted by id.
#[derive(Debug, Default)]
pub(crate) struct CellTable {
  pub(crate) ids: Vec<CellId>,
  pub(crate) cells: Vec<ShapeIndexCell>,
}

impl CellTable {
  pub(crate) fn push(&mut self, id: CellId, cell: ShapeIndexCell) {
    debug_assert!(self.ids.last().map_or(true, |&last| last < id));
    self.ids.push(id);
    self.cells.push(cell);
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.ids.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_index_cell_lookup() {
    let cell = ShapeIndexCell {
      shapes: vec![
        ClippedShape { shape_id: 0, contains_center: true, edges: vec![] },
        ClippedShape { shape_id: 3, contains_center: false, edges: vec![1, 4, 7] },
      ],
    };
    assert_eq!(cell.num_clipped(), 2);
    assert_eq!(cell.num_edges(), 3);
    let clipped = cell.find_by_shape_id(3).unwrap();
    assert!(clipped.contains_edge(4));
    assert!(!clipped.contains_edge(5));
    assert!(cell.find_by_shape_id(1).is_none());
  }
}
