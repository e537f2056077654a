// src/region.rs

//! The common interface of bounded areas on the sphere.

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cellid::CellId;
use crate::point::Point;
use crate::rect::Rect;

/// A region of the unit sphere that can answer bound and containment queries.
///
/// Bounds may be conservative: they must contain the region but need not be tight.
pub trait Region {
  /// A cap containing the region.
  fn cap_bound(&self) -> Cap;

  /// A latitude-longitude rectangle containing the region.
  fn rect_bound(&self) -> Rect;

  /// Whether the region contains the whole cell. May return false negatives.
  fn contains_cell(&self, cell: &Cell) -> bool;

  /// Whether the region may intersect the cell. May return false positives.
  fn intersects_cell(&self, cell: &Cell) -> bool;

  fn contains_point(&self, p: Point) -> bool;

  /// A small set of cells covering the region, used to seed coverings.
  fn cell_union_bound(&self) -> Vec<CellId> {
    self.cap_bound().cell_union_bound()
  }
}
