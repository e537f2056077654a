// src/shape_index/iterator.rs

use std::sync::Arc;

use super::cell::{CellRelation, CellTable, ShapeIndexCell};
use crate::cellid::CellId;
use crate::point::Point;

/// A cursor over the cells of a built index, in increasing cell id order.
///
/// The cursor holds a snapshot of the cells: mutating the index afterwards does not affect it.
#[derive(Debug, Clone)]
pub struct ShapeIndexIterator {
  table: Arc<CellTable>,
  position: usize,
}

impl ShapeIndexIterator {
  pub(crate) fn new(table: Arc<CellTable>) -> ShapeIndexIterator {
    ShapeIndexIterator { table, position: 0 }
  }

  /// The current cell id, or the sentinel when done.
  #[must_use]
  pub fn cell_id(&self) -> CellId {
    self.table.ids.get(self.position).copied().unwrap_or_else(CellId::sentinel)
  }

  /// The current cell. Must not be called when done.
  #[must_use]
  pub fn index_cell(&self) -> &ShapeIndexCell {
    &self.table.cells[self.position]
  }

  #[inline]
  pub(crate) fn position(&self) -> usize {
    self.position
  }

  /// Center of the current cell.
  #[must_use]
  pub fn center(&self) -> Point {
    self.cell_id().to_point()
  }

  pub fn begin(&mut self) {
    self.position = 0;
  }

  /// Positions past the last cell.
  pub fn finish(&mut self) {
    self.position = self.table.len();
  }

  pub fn next(&mut self) {
    self.position += 1;
  }

  /// Steps back, returning false (and not moving) at the first cell.
  pub fn prev(&mut self) -> bool {
    if self.position == 0 {
      return false;
    }
    self.position -= 1;
    true
  }

  #[must_use]
  pub fn done(&self) -> bool {
    self.position >= self.table.len()
  }

  /// Positions at the first cell with id >= `target`.
  pub fn seek(&mut self, target: CellId) {
    self.position = self.table.ids.partition_point(|&id| id < target);
  }

  /// Positions at the cell containing `p`, returning false if there is none.
  pub fn locate_point(&mut self, p: Point) -> bool {
    // The containing cell is either the first cell at or after the leaf, or the one before.
    let target = CellId::from_point(p);
    self.seek(target);
    if !self.done() && self.cell_id().range_min() <= target {
      return true;
    }
    self.prev() && self.cell_id().range_max() >= target
  }

  /// Relates `target` to the index cells. On `Indexed` the cursor is at the containing cell;
  /// on `Subdivided` it is at the first contained cell.
  pub fn locate_cell_id(&mut self, target: CellId) -> CellRelation {
    self.seek(target.range_min());
    if !self.done() {
      let id = self.cell_id();
      if id >= target && id.range_min() <= target {
        return CellRelation::Indexed;
      }
      if id <= target.range_max() {
        return CellRelation::Subdivided;
      }
    }
    if self.prev() && self.cell_id().range_max() >= target {
      return CellRelation::Indexed;
    }
    CellRelation::Disjoint
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shape::PointVector;
  use crate::shape_index::ShapeIndex;

  #[test]
  fn test_empty_index() {
    let index = ShapeIndex::new();
    let mut it = index.iter();
    assert!(it.done());
    assert_eq!(it.cell_id(), CellId::sentinel());
    assert!(!it.prev());
    assert!(!it.locate_point(Point::from_coords(1.0, 0.0, 0.0)));
    assert_eq!(it.locate_cell_id(CellId::from_face(2)), CellRelation::Disjoint);
  }

  #[test]
  fn test_locate() {
    let p = Point::from_coords(1.0, 0.3, 0.2);
    let mut index = ShapeIndex::new();
    index.add(PointVector::new(vec![p]));
    let mut it = index.iter();
    assert!(!it.done());
    let id = it.cell_id();
    assert!(it.locate_point(p));
    assert_eq!(it.cell_id(), id);
    assert!(!it.locate_point(-p));

    let leaf = CellId::from_point(p);
    assert_eq!(it.locate_cell_id(leaf), CellRelation::Indexed);
    assert_eq!(it.cell_id(), id);
    if !id.is_face() {
      assert_eq!(it.locate_cell_id(id.parent(id.level() - 1)), CellRelation::Subdivided);
    }
    assert_eq!(it.locate_cell_id(CellId::from_face(3)), CellRelation::Disjoint);

    it.finish();
    assert!(it.done());
    assert!(it.prev());
    assert_eq!(it.cell_id(), id);
  }
}
