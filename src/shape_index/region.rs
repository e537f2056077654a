// src/shape_index/region.rs

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cell_union::CellUnion;
use crate::cellid::CellId;
use crate::constants::{FACE_CLIP_ERROR_UV_COORD, INTERSECTS_RECT_ERROR_UV_DIST};
use crate::edge::{clip_to_padded_face, edge_intersects_rect};
use crate::point::Point;
use crate::query::{ContainsPointQuery, VertexModel};
use crate::rect::Rect;
use crate::region::Region;
use crate::shape::Dimension;
use crate::shape_index::{CellRelation, ClippedShape, ShapeIndex, ShapeIndexIterator};

/// Views the union of the shapes in an index as a region.
///
/// Containment uses the semi-open vertex model. Point and polyline shapes intersect cells but
/// never contain them.
#[derive(Debug, Clone, Copy)]
pub struct ShapeIndexRegion<'a> {
  index: &'a ShapeIndex,
  query: ContainsPointQuery<'a>,
}

impl<'a> ShapeIndexRegion<'a> {
  #[must_use]
  pub fn new(index: &'a ShapeIndex) -> ShapeIndexRegion<'a> {
    ShapeIndexRegion { index, query: ContainsPointQuery::new(index, VertexModel::SemiOpen) }
  }

  /// A few cells covering the index: one per face it touches, or four children of the
  /// smallest cell containing it when it lies within one face.
  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    let mut ids = Vec::new();
    let mut it = self.index.iter();
    it.finish();
    if !it.prev() {
      return ids;
    }
    let last_index_id = it.cell_id();
    it.begin();
    if it.cell_id() != last_index_id {
      // A level at which the index spans at most 6 cells (several faces) or 4 (one face).
      let level = it.cell_id().common_ancestor_level(last_index_id).map_or(0, |l| l + 1);
      let last_id = last_index_id.parent(level);
      let mut id = it.cell_id().parent(level);
      while id != last_id {
        // Shrink each cell to the index cells it contains, skipping empty ones.
        if id.range_max() >= it.cell_id() {
          let first = it.cell_id();
          it.seek(id.range_max().next());
          it.prev();
          cover_range(first, it.cell_id(), &mut ids);
          it.next();
        }
        id = id.next();
      }
    }
    cover_range(it.cell_id(), last_index_id, &mut ids);
    ids
  }

  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    CellUnion::from_cell_ids_raw(self.cell_union_bound()).cap_bound()
  }

  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    self
      .cell_union_bound()
      .into_iter()
      .fold(Rect::empty(), |acc, id| acc.union(&Cell::from_cell_id(id).rect_bound()))
  }

  /// Whether some shape contains the whole cell. May return false negatives for cells that
  /// were subdivided in the index.
  #[must_use]
  pub fn contains_cell(&self, target: &Cell) -> bool {
    let mut it = self.index.iter();
    // A subdivided target has many edges nearby, so it is not reported as contained.
    if it.locate_cell_id(target.id()) != CellRelation::Indexed {
      return false;
    }
    let center = it.center();
    for clipped in it.index_cell().shapes() {
      if it.cell_id() == target.id() {
        if clipped.num_edges() == 0 && clipped.contains_center() {
          return true;
        }
      } else if self.index.shape(clipped.shape_id()).is_some_and(|s| s.dimension() == Dimension::Polygon)
        && !self.any_edge_intersects(clipped, target)
        && self.query.shape_contains_clipped(center, clipped, target.center())
      {
        return true;
      }
    }
    false
  }

  /// Whether some shape may intersect the cell.
  #[must_use]
  pub fn intersects_cell(&self, target: &Cell) -> bool {
    let mut it = self.index.iter();
    match it.locate_cell_id(target.id()) {
      CellRelation::Disjoint => return false,
      CellRelation::Subdivided => return true,
      CellRelation::Indexed => {}
    }
    // Index cells exist only where some shape has an edge or contains the cell.
    if it.cell_id() == target.id() {
      return true;
    }
    let center = it.center();
    it.index_cell().shapes().iter().any(|clipped| {
      self.any_edge_intersects(clipped, target) || self.query.shape_contains_clipped(center, clipped, target.center())
    })
  }

  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    self.query.contains(p)
  }

  /// A cursor over the underlying index.
  #[must_use]
  pub fn iter(&self) -> ShapeIndexIterator {
    self.index.iter()
  }

  fn any_edge_intersects(&self, clipped: &ClippedShape, target: &Cell) -> bool {
    const MAX_ERROR: f64 = FACE_CLIP_ERROR_UV_COORD + INTERSECTS_RECT_ERROR_UV_DIST;
    let Some(shape) = self.index.shape(clipped.shape_id()) else {
      return false;
    };
    let bound = target.bound_uv().expanded_by_margin(MAX_ERROR);
    clipped.edges().iter().any(|&e| {
      let edge = shape.edge(e as usize);
      clip_to_padded_face(edge.v0, edge.v1, target.face(), MAX_ERROR)
        .is_some_and(|(a, b)| edge_intersects_rect(a, b, &bound))
    })
  }
}

// The smallest cell covering the index cells in [first, last].
fn cover_range(first: CellId, last: CellId, ids: &mut Vec<CellId>) {
  if first == last {
    ids.push(first);
    return;
  }
  let level = first.common_ancestor_level(last).unwrap_or(0);
  ids.push(first.parent(level));
}

impl Region for ShapeIndexRegion<'_> {
  fn cap_bound(&self) -> Cap {
    ShapeIndexRegion::cap_bound(self)
  }

  fn rect_bound(&self) -> Rect {
    ShapeIndexRegion::rect_bound(self)
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    ShapeIndexRegion::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    ShapeIndexRegion::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    ShapeIndexRegion::contains_point(self, p)
  }

  fn cell_union_bound(&self) -> Vec<CellId> {
    ShapeIndexRegion::cell_union_bound(self)
  }
}
