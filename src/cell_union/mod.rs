// src/cell_union/mod.rs

//! Sets of cells kept as sorted, non-overlapping id lists.

pub mod encode;

use std::ops::Index;

use tracing::trace;

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cellid::{lsb_for_level, CellId};
use crate::constants::{MAX_LEVEL, NUM_FACES};
use crate::math::s1::Angle;
use crate::metric::{AVG_AREA, MIN_WIDTH};
use crate::point::Point;
use crate::rect::Rect;
use crate::region::Region;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A region made of cells.
///
/// A union is *valid* when its ids are valid, sorted and non-overlapping, and *normalized*
/// when it is valid and no four consecutive cells are the children of a common parent. The
/// operations documented as requiring a normalized union give unspecified results otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellUnion(Vec<CellId>);

impl CellUnion {
  /// A normalized union of `ids`.
  #[must_use]
  pub fn from_cell_ids(ids: Vec<CellId>) -> CellUnion {
    let mut cu = CellUnion(ids);
    cu.normalize();
    cu
  }

  /// A union holding `ids` exactly as given.
  #[must_use]
  pub fn from_cell_ids_raw(ids: Vec<CellId>) -> CellUnion {
    CellUnion(ids)
  }

  /// Wraps ids the caller already knows to be normalized.
  #[must_use]
  pub fn from_normalized(ids: Vec<CellId>) -> CellUnion {
    let cu = CellUnion(ids);
    debug_assert!(cu.is_normalized(), "ids are not normalized");
    cu
  }

  /// The minimal union covering the leaf cells from `min` to `max` inclusive.
  #[must_use]
  pub fn from_min_max(min: CellId, max: CellId) -> CellUnion {
    CellUnion::from_range(min.range_min(), max.range_max().next())
  }

  /// The minimal union covering the leaf cells in `[begin, end)`. Both must be leaf cells.
  #[must_use]
  pub fn from_range(begin: CellId, end: CellId) -> CellUnion {
    let mut ids = Vec::new();
    let mut id = begin.max_tile(end);
    while id != end {
      ids.push(id);
      id = id.next().max_tile(end);
    }
    // Cells come out in order, disjoint, and never as four siblings.
    CellUnion(ids)
  }

  /// Alias of [`CellUnion::from_range`].
  #[must_use]
  pub fn from_begin_end(begin: CellId, end: CellId) -> CellUnion {
    CellUnion::from_range(begin, end)
  }

  /// The six face cells.
  #[must_use]
  pub fn whole_sphere() -> CellUnion {
    CellUnion((0..NUM_FACES).map(CellId::from_face).collect())
  }

  /// Normalized union of two unions.
  #[must_use]
  pub fn from_union(x: &CellUnion, y: &CellUnion) -> CellUnion {
    let mut ids = Vec::with_capacity(x.len() + y.len());
    ids.extend_from_slice(&x.0);
    ids.extend_from_slice(&y.0);
    CellUnion::from_cell_ids(ids)
  }

  /// Normalized intersection of two normalized unions.
  #[must_use]
  pub fn from_intersection(x: &CellUnion, y: &CellUnion) -> CellUnion {
    let (x, y) = (&x.0, &y.0);
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    // Binary searches skip runs of cells that cannot overlap.
    while i < x.len() && j < y.len() {
      let i_min = x[i].range_min();
      let j_min = y[j].range_min();
      if i_min > j_min {
        // Either y[j] contains x[i] or they are disjoint.
        if x[i] <= y[j].range_max() {
          out.push(x[i]);
          i += 1;
        } else {
          j = lower_bound(y, j + 1, i_min);
          if x[i] <= y[j - 1].range_max() {
            j -= 1;
          }
        }
      } else if j_min > i_min {
        if y[j] <= x[i].range_max() {
          out.push(y[j]);
          j += 1;
        } else {
          i = lower_bound(x, i + 1, j_min);
          if y[j] <= x[i - 1].range_max() {
            i -= 1;
          }
        }
      } else if x[i] < y[j] {
        // Same range_min, so one contains the other; keep the smaller.
        out.push(x[i]);
        i += 1;
      } else {
        out.push(y[j]);
        j += 1;
      }
    }
    CellUnion::from_cell_ids(out)
  }

  /// Cells of `x` intersected with the single cell `id`.
  #[must_use]
  pub fn from_intersection_with_cell_id(x: &CellUnion, id: CellId) -> CellUnion {
    if x.contains_cell_id(id) {
      return CellUnion(vec![id]);
    }
    let id_max = id.range_max();
    let start = lower_bound(&x.0, 0, id.range_min());
    CellUnion(x.0[start..].iter().copied().take_while(|&c| c <= id_max).collect())
  }

  /// Normalized difference `x - y` of two normalized unions.
  #[must_use]
  pub fn from_difference(x: &CellUnion, y: &CellUnion) -> CellUnion {
    let mut out = Vec::new();
    for &id in &x.0 {
      difference_internal(id, y, &mut out);
    }
    // Output is sorted and disjoint, but subdivision may leave four siblings in a row.
    CellUnion::from_cell_ids(out)
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  #[inline]
  #[must_use]
  pub fn cell_ids(&self) -> &[CellId] {
    &self.0
  }

  #[must_use]
  pub fn into_cell_ids(self) -> Vec<CellId> {
    self.0
  }

  pub fn iter(&self) -> std::slice::Iter<'_, CellId> {
    self.0.iter()
  }

  /// Whether the ids are valid, sorted and non-overlapping.
  #[must_use]
  pub fn is_valid(&self) -> bool {
    if self.0.iter().any(|id| !id.is_valid()) {
      return false;
    }
    self.0.windows(2).all(|w| w[0].range_max() < w[1].range_min())
  }

  /// Whether the union is valid and holds no four consecutive siblings.
  #[must_use]
  pub fn is_normalized(&self) -> bool {
    if !self.is_valid() {
      return false;
    }
    !self.0.windows(4).any(|w| are_siblings(w[0], w[1], w[2], w[3]))
  }

  /// Sorts, removes contained and duplicate cells, and replaces every group of four siblings by
  /// their parent, repeatedly.
  pub fn normalize(&mut self) {
    self.0.sort_unstable();
    let mut output: Vec<CellId> = Vec::with_capacity(self.0.len());
    for &id in &self.0 {
      let mut id = id;
      if output.last().is_some_and(|last| last.contains(id)) {
        continue;
      }
      while output.last().is_some_and(|&last| id.contains(last)) {
        output.pop();
      }
      // A collapse can complete another group of siblings one level up.
      while output.len() >= 3 {
        let n = output.len();
        if !are_siblings(output[n - 3], output[n - 2], output[n - 1], id) {
          break;
        }
        output.truncate(n - 3);
        id = id.immediate_parent();
      }
      output.push(id);
    }
    if output.len() < self.0.len() {
      trace!(before = self.0.len(), after = output.len(), "normalized cell union");
    }
    self.0 = output;
  }

  /// Replaces each cell by its descendants at levels at least `min_level` and congruent to
  /// `min_level` modulo `level_mod`, capped at the leaf level.
  #[must_use]
  pub fn denormalize(&self, min_level: i32, level_mod: i32) -> CellUnion {
    debug_assert!((0..=MAX_LEVEL).contains(&min_level));
    debug_assert!((1..=3).contains(&level_mod));
    let mut out = Vec::with_capacity(self.0.len());
    for &id in &self.0 {
      let level = id.level();
      let mut new_level = level.max(min_level);
      if level_mod > 1 {
        new_level += (MAX_LEVEL - (new_level - min_level)) % level_mod;
        new_level = new_level.min(MAX_LEVEL);
      }
      if new_level == level {
        out.push(id);
      } else {
        let end = id.child_end_at_level(new_level);
        let mut ci = id.child_begin_at_level(new_level);
        while ci != end {
          out.push(ci);
          ci = ci.next();
        }
      }
    }
    CellUnion(out)
  }

  /// Whether the union contains `id`. Requires a normalized union.
  #[must_use]
  pub fn contains_cell_id(&self, id: CellId) -> bool {
    if !id.is_valid() {
      return false;
    }
    let i = self.0.partition_point(|&c| c <= id);
    if i < self.0.len() && self.0[i].range_min() <= id {
      return true;
    }
    i != 0 && self.0[i - 1].range_max() >= id
  }

  /// Whether the union intersects `id`. Requires a normalized union.
  #[must_use]
  pub fn intersects_cell_id(&self, id: CellId) -> bool {
    if !id.is_valid() {
      return false;
    }
    let i = self.0.partition_point(|&c| c <= id);
    if i < self.0.len() && self.0[i].range_min() <= id.range_max() {
      return true;
    }
    i != 0 && self.0[i - 1].range_max() >= id.range_min()
  }

  #[must_use]
  pub fn contains_union(&self, other: &CellUnion) -> bool {
    other.0.iter().all(|&id| self.contains_cell_id(id))
  }

  #[must_use]
  pub fn intersects_union(&self, other: &CellUnion) -> bool {
    other.0.iter().any(|&id| self.intersects_cell_id(id))
  }

  #[must_use]
  pub fn union(&self, other: &CellUnion) -> CellUnion {
    CellUnion::from_union(self, other)
  }

  #[must_use]
  pub fn intersection(&self, other: &CellUnion) -> CellUnion {
    CellUnion::from_intersection(self, other)
  }

  #[must_use]
  pub fn difference(&self, other: &CellUnion) -> CellUnion {
    CellUnion::from_difference(self, other)
  }

  /// Grows the union by the neighbors of each cell at `level`. Cells finer than `level` are
  /// first replaced by their ancestor at `level`.
  pub fn expand_at_level(&mut self, level: i32) {
    let level_lsb = lsb_for_level(level);
    let mut output = Vec::new();
    let mut i = self.0.len();
    while i > 0 {
      i -= 1;
      let mut id = self.0[i];
      if id.lsb() < level_lsb {
        id = id.parent(level);
        // Skip the cells the ancestor already covers.
        while i > 0 && id.contains(self.0[i - 1]) {
          i -= 1;
        }
      }
      output.push(id);
      output.extend(id.all_neighbors(level));
    }
    self.0 = output;
    self.normalize();
  }

  /// Grows the union so that it contains every point within `min_radius` of it, using cells no
  /// more than `max_level_diff` levels finer than the largest cell of the union.
  pub fn expand_by_radius(&mut self, min_radius: Angle, max_level_diff: i32) {
    let min_level = self.0.iter().map(|id| id.level()).min().unwrap_or(MAX_LEVEL);
    let radius_level = MIN_WIDTH.max_level(min_radius.radians());
    if radius_level == 0 && min_radius.radians() > MIN_WIDTH.value(0) {
      // Wider than a face: expanding twice covers it.
      self.expand_at_level(0);
    }
    self.expand_at_level((min_level + max_level_diff).min(radius_level));
  }

  /// Number of leaf cells covered. Requires a normalized union; invalid ids count as zero.
  #[must_use]
  pub fn leaf_cells_covered(&self) -> u64 {
    self.valid_ids().map(|id| 1u64 << ((MAX_LEVEL - id.level()) << 1)).sum()
  }

  /// Area assuming every leaf cell has the average leaf area.
  #[must_use]
  pub fn average_based_area(&self) -> f64 {
    AVG_AREA.value(MAX_LEVEL) * self.leaf_cells_covered() as f64
  }

  /// Sum of the approximate cell areas. Invalid ids, as a decoded union may hold, add nothing.
  #[must_use]
  pub fn approx_area(&self) -> f64 {
    self.valid_ids().map(|id| Cell::from_cell_id(id).approx_area()).sum()
  }

  #[must_use]
  pub fn exact_area(&self) -> f64 {
    self.valid_ids().map(|id| Cell::from_cell_id(id).exact_area()).sum()
  }

  fn valid_ids(&self) -> impl Iterator<Item = CellId> + '_ {
    self.0.iter().copied().filter(|id| id.is_valid())
  }

  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    if self.0.is_empty() {
      return Cap::empty();
    }
    // Area-weighted centroid of the cell centers as the axis. Bounding only the vertices is not
    // enough since the cap may span more than a hemisphere.
    let mut centroid = Point::default();
    for &id in &self.0 {
      centroid = centroid + id.to_point() * AVG_AREA.value(id.level());
    }
    let centroid = if centroid == Point::default() { Point::from_coords(1.0, 0.0, 0.0) } else { centroid.normalize() };
    self.0.iter().fold(Cap::from_point(centroid), |cap, &id| cap.add_cap(&Cell::from_cell_id(id).cap_bound()))
  }

  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    self.0.iter().fold(Rect::empty(), |r, &id| r.union(&Cell::from_cell_id(id).rect_bound()))
  }

  #[must_use]
  pub fn contains_cell(&self, cell: &Cell) -> bool {
    self.contains_cell_id(cell.id())
  }

  #[must_use]
  pub fn intersects_cell(&self, cell: &Cell) -> bool {
    self.intersects_cell_id(cell.id())
  }

  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    self.contains_cell_id(CellId::from_point(p))
  }

  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    self.0.clone()
  }
}

// First index in `ids[begin..]` whose id is >= `id`.
fn lower_bound(ids: &[CellId], begin: usize, id: CellId) -> usize {
  begin + ids[begin..].partition_point(|&c| c < id)
}

fn difference_internal(id: CellId, other: &CellUnion, out: &mut Vec<CellId>) {
  if !other.intersects_cell_id(id) {
    out.push(id);
    return;
  }
  if !other.contains_cell_id(id) {
    for child in id.children() {
      difference_internal(child, other, out);
    }
  }
}

/// Whether the four ids are the children of one parent.
fn are_siblings(a: CellId, b: CellId, c: CellId, d: CellId) -> bool {
  // Cheap necessary condition first.
  if a.0 ^ b.0 ^ c.0 != d.0 {
    return false;
  }
  // Clear the two position bits of the child level and compare the rest.
  let mut mask = d.lsb() << 1;
  mask = !(mask + (mask << 1));
  let id_masked = d.0 & mask;
  a.0 & mask == id_masked && b.0 & mask == id_masked && c.0 & mask == id_masked && !d.is_face()
}

impl Index<usize> for CellUnion {
  type Output = CellId;

  fn index(&self, i: usize) -> &CellId {
    &self.0[i]
  }
}

impl<'a> IntoIterator for &'a CellUnion {
  type Item = &'a CellId;
  type IntoIter = std::slice::Iter<'a, CellId>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

impl FromIterator<CellId> for CellUnion {
  /// Collects into a normalized union.
  fn from_iter<I: IntoIterator<Item = CellId>>(iter: I) -> Self {
    CellUnion::from_cell_ids(iter.into_iter().collect())
  }
}

impl Region for CellUnion {
  fn cap_bound(&self) -> Cap {
    CellUnion::cap_bound(self)
  }

  fn rect_bound(&self) -> Rect {
    CellUnion::rect_bound(self)
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    CellUnion::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    CellUnion::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    CellUnion::contains_point(self, p)
  }

  fn cell_union_bound(&self) -> Vec<CellId> {
    CellUnion::cell_union_bound(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::M_4PI;

  fn id_at(x: f64, y: f64, z: f64, level: i32) -> CellId {
    CellId::from_point(Point::from_coords(x, y, z)).parent(level)
  }

  #[test]
  fn test_normalize_collapses_siblings_recursively() {
    let parent = id_at(0.1, 0.2, 0.9, 8);
    // All 16 grandchildren collapse two levels.
    let mut ids = Vec::new();
    for child in parent.children() {
      ids.extend(child.children());
    }
    ids.reverse();
    let cu = CellUnion::from_cell_ids(ids);
    assert_eq!(cu.cell_ids(), &[parent]);
    assert!(cu.is_normalized());

    // Three children plus the fourth's own children.
    let c = parent.children();
    let mut ids = vec![c[0], c[1], c[2]];
    ids.extend(c[3].children());
    assert_eq!(CellUnion::from_cell_ids(ids).cell_ids(), &[parent]);
  }

  #[test]
  fn test_normalize_removes_contained_and_duplicates() {
    let a = id_at(0.5, -0.5, 0.5, 10);
    let inner = a.child_begin_at_level(14).advance(3);
    let other = id_at(-0.3, 0.8, 0.1, 6);
    let cu = CellUnion::from_cell_ids(vec![inner, other, a, a, inner]);
    let mut expected = vec![a, other];
    expected.sort();
    assert_eq!(cu.cell_ids(), expected.as_slice());
  }

  #[test]
  fn test_from_range() {
    let begin = CellId::begin(MAX_LEVEL);
    assert!(CellUnion::from_range(begin, begin).is_empty());
    assert_eq!(CellUnion::from_range(begin, begin.next()).cell_ids(), &[begin]);
    let whole = CellUnion::from_range(CellId::begin(MAX_LEVEL), CellId::end(MAX_LEVEL));
    assert_eq!(whole, CellUnion::whole_sphere());

    let id = id_at(0.0, 0.0, 1.0, 9);
    let cu = CellUnion::from_min_max(id.range_min(), id.range_max());
    assert_eq!(cu.cell_ids(), &[id]);
    let odd = CellUnion::from_range(id.range_min().next(), id.range_max());
    assert!(odd.is_normalized());
    assert_eq!(odd.leaf_cells_covered(), (1u64 << 42) - 2);
  }

  #[test]
  fn test_contains_intersects() {
    let a = id_at(0.2, 0.3, 0.9, 5);
    let b = id_at(-0.9, 0.1, -0.2, 12);
    let cu = CellUnion::from_cell_ids(vec![a, b]);
    assert!(cu.contains_cell_id(a));
    assert!(cu.contains_cell_id(a.child_begin_at_level(20)));
    assert!(cu.contains_cell_id(a.range_max()));
    assert!(!cu.contains_cell_id(a.parent(4)));
    assert!(cu.intersects_cell_id(a.parent(4)));
    assert!(cu.intersects_cell_id(b.parent(0)));
    assert!(!cu.intersects_cell_id(a.next()));
    assert!(!cu.contains_cell_id(CellId::none()));
    assert!(cu.contains_point(a.to_point()));
  }

  #[test]
  fn test_set_operations() {
    let p = id_at(0.4, 0.4, 0.8, 7);
    let c = p.children();
    let x = CellUnion::from_cell_ids(vec![c[0], c[1], c[2]]);
    let y = CellUnion::from_cell_ids(vec![c[2].child_begin(), c[3]]);

    assert_eq!(x.union(&y).cell_ids(), &[p]);
    assert_eq!(x.intersection(&y).cell_ids(), &[c[2].child_begin()]);
    let diff = x.difference(&y);
    assert!(diff.contains_cell_id(c[0]) && diff.contains_cell_id(c[1]));
    assert!(!diff.intersects_cell_id(c[2].child_begin()));
    assert!(diff.contains_cell_id(c[2].children()[3]));
    assert_eq!(diff.union(&x.intersection(&y)), x);

    assert!(x.contains_union(&CellUnion::from_cell_ids(vec![c[1].child_begin()])));
    assert!(!x.contains_union(&y));
    assert!(x.intersects_union(&y));
    assert_eq!(CellUnion::from_intersection_with_cell_id(&x, p), x);
    assert_eq!(CellUnion::from_intersection_with_cell_id(&x, c[0].child_begin()).cell_ids(), &[c[0].child_begin()]);
  }

  #[test]
  fn test_denormalize() {
    let cu = CellUnion::from_cell_ids(vec![id_at(0.1, 0.9, 0.1, 3), id_at(0.9, 0.1, 0.1, 7)]);
    let d = cu.denormalize(5, 2);
    // Level 3 expands to 5, level 7 stays.
    assert_eq!(d.len(), 16 + 1);
    assert!(d.iter().all(|id| id.level() >= 5 && (id.level() - 5) % 2 == 0));
    assert_eq!(CellUnion::from_cell_ids(d.into_cell_ids()), cu);
  }

  #[test]
  fn test_expand_at_level() {
    let id = id_at(0.3, -0.2, 0.9, 10);
    let mut cu = CellUnion::from_cell_ids(vec![id.child_begin_at_level(14)]);
    cu.expand_at_level(10);
    assert!(cu.contains_cell_id(id));
    for n in id.all_neighbors(10) {
      assert!(cu.contains_cell_id(n));
    }
    assert!(cu.is_normalized());
  }

  #[test]
  fn test_areas_skip_invalid_ids() {
    let cu = CellUnion::from_cell_ids_raw(vec![CellId(0), CellId(u64::MAX), CellId::from_face(2)]);
    let face_area = Cell::from_cell_id(CellId::from_face(2)).exact_area();
    assert_eq!(cu.leaf_cells_covered(), 1 << 60);
    assert!((cu.exact_area() - face_area).abs() < 1e-15);
    assert!((cu.approx_area() - Cell::from_cell_id(CellId::from_face(2)).approx_area()).abs() < 1e-15);
    assert!(cu.average_based_area() > 0.0 && cu.average_based_area() <= M_4PI);
  }

  #[test]
  fn test_areas_and_bounds() {
    let sphere = CellUnion::whole_sphere();
    assert_eq!(sphere.leaf_cells_covered(), 6 << 60);
    assert!((sphere.average_based_area() - M_4PI).abs() < 1e-12);
    assert!((sphere.exact_area() - M_4PI).abs() < 1e-12);
    assert!((sphere.approx_area() - M_4PI).abs() < 1e-12);
    assert!(sphere.cap_bound().is_full() || sphere.cap_bound().contains_point(Point::from_coords(-1.0, 0.0, 0.0)));

    let cu = CellUnion::from_cell_ids(vec![id_at(0.2, 0.1, 0.9, 6), id_at(0.2, 0.2, 0.9, 9)]);
    let cap = cu.cap_bound();
    let rect = cu.rect_bound();
    for &id in &cu {
      let cell = Cell::from_cell_id(id);
      for k in 0..4 {
        assert!(cap.contains_point(cell.vertex(k)));
        assert!(rect.contains_point(cell.vertex(k)));
      }
    }
    assert!(CellUnion::default().cap_bound().is_empty());
  }
}
