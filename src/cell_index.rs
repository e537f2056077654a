// src/cell_index.rs

//! An index of (cell id, label) pairs supporting range iteration and intersection queries.
//!
//! Cells may overlap and labels need not be unique. [`CellIndex::build`] turns the pairs into
//! a tree of nested cells plus a partition of the leaf-cell space into ranges, where every
//! leaf in a range is covered by the same set of cells.

use std::cmp::Reverse;

use tracing::debug;

use crate::cell_union::CellUnion;
use crate::cellid::CellId;
use crate::constants::MAX_LEVEL;

// Node index meaning "no node".
const DONE_CONTENTS: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellNode {
  cell_id: CellId,
  label: i32,
  // Index of the nearest enclosing node, or DONE_CONTENTS.
  parent: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeNode {
  start_id: CellId,
  // Index of the smallest node covering the range, or DONE_CONTENTS.
  contents: i32,
}

/// A collection of labelled cells. Call [`CellIndex::build`] after adding cells and before
/// iterating.
#[derive(Debug, Clone, Default)]
pub struct CellIndex {
  cell_tree: Vec<CellNode>,
  range_nodes: Vec<RangeNode>,
}

impl CellIndex {
  #[must_use]
  pub fn new() -> CellIndex {
    CellIndex::default()
  }

  /// Adds a labelled cell. Invalidates any previous build.
  pub fn add(&mut self, cell_id: CellId, label: i32) {
    debug_assert!(cell_id.is_valid(), "invalid cell id {cell_id:?}");
    self.cell_tree.push(CellNode { cell_id, label, parent: DONE_CONTENTS });
    self.range_nodes.clear();
  }

  /// Adds every cell of the union with the same label.
  pub fn add_cell_union(&mut self, cell_union: &CellUnion, label: i32) {
    for &id in cell_union {
      self.add(id, label);
    }
  }

  /// Number of (cell id, label) pairs.
  #[must_use]
  pub fn len(&self) -> usize {
    self.cell_tree.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.cell_tree.is_empty()
  }

  pub fn clear(&mut self) {
    self.cell_tree.clear();
    self.range_nodes.clear();
  }

  /// Builds the cell tree and leaf ranges.
  ///
  /// Sweeps over the leaf-cell space: each cell contributes an entry at its first leaf and an
  /// exit just past its last. Entries at one position are sorted from the largest cell down, so
  /// the stack of open cells stays nested and the innermost open cell is the range contents.
  pub fn build(&mut self) {
    // (start, cell, label); exits have no label.
    let mut deltas: Vec<(CellId, CellId, Option<i32>)> = Vec::with_capacity(2 * self.cell_tree.len() + 2);
    for node in &self.cell_tree {
      deltas.push((node.cell_id.range_min(), node.cell_id, Some(node.label)));
      deltas.push((node.cell_id.range_max().next(), CellId::sentinel(), None));
    }
    // Markers so that ranges span the whole leaf space.
    deltas.push((CellId::from_face(0).child_begin_at_level(MAX_LEVEL), CellId::from_face(0), None));
    deltas.push((CellId::from_face(5).child_end_at_level(MAX_LEVEL), CellId::from_face(0), None));
    deltas.sort_by_key(|&(start, cell, label)| (start, Reverse(cell), label));

    self.cell_tree.clear();
    self.range_nodes.clear();
    let mut contents = DONE_CONTENTS;
    let mut i = 0;
    while i < deltas.len() {
      let start_id = deltas[i].0;
      while i < deltas.len() && deltas[i].0 == start_id {
        let (_, cell_id, label) = deltas[i];
        if let Some(label) = label {
          self.cell_tree.push(CellNode { cell_id, label, parent: contents });
          contents = (self.cell_tree.len() - 1) as i32;
        } else if cell_id == CellId::sentinel() && contents != DONE_CONTENTS {
          contents = self.cell_tree[contents as usize].parent;
        }
        i += 1;
      }
      self.range_nodes.push(RangeNode { start_id, contents });
    }
    debug!(cells = self.cell_tree.len(), ranges = self.range_nodes.len(), "built cell index");
  }

  /// Iterator over all leaf ranges, empty or not.
  #[must_use]
  pub fn range_iter(&self) -> RangeIterator<'_> {
    RangeIterator { nodes: &self.range_nodes, pos: 0 }
  }

  /// Iterator over the leaf ranges covered by at least one cell.
  #[must_use]
  pub fn non_empty_range_iter(&self) -> NonEmptyRangeIterator<'_> {
    let mut it = NonEmptyRangeIterator { range: self.range_iter() };
    it.begin();
    it
  }

  /// Iterator over the cells covering a range.
  #[must_use]
  pub fn contents_iter(&self) -> ContentsIterator<'_> {
    ContentsIterator::new(self)
  }

  /// Calls `visitor` with every (cell id, label) whose cell intersects `target`, stopping
  /// early if it returns false. Each pair is visited once per target cell range it touches;
  /// the target should be normalized.
  pub fn visit_intersecting_cells<F>(&self, target: &CellUnion, mut visitor: F) -> bool
  where
    F: FnMut(CellId, i32) -> bool,
  {
    let target = target.cell_ids();
    if target.is_empty() {
      return true;
    }
    let mut contents = self.contents_iter();
    let mut range = self.non_empty_range_iter();
    let mut pos = 0;
    while pos < target.len() {
      if range.limit_id() <= target[pos].range_min() {
        range.seek(target[pos].range_min());
      }
      while range.start_id() <= target[pos].range_max() {
        contents.start_union(&range.range);
        while !contents.done() {
          if !visitor(contents.cell_id(), contents.label()) {
            return false;
          }
          contents.next();
        }
        range.next();
      }
      // Skip target cells that end before the next non-empty range.
      pos += 1;
      if pos < target.len() && target[pos].range_max() < range.start_id() {
        let start = range.start_id();
        pos += 1 + target[pos + 1..].partition_point(|id| *id < start);
        if target[pos - 1].range_max() >= start {
          pos -= 1;
        }
      }
    }
    true
  }

  /// Distinct labels of the cells intersecting `target`, sorted.
  #[must_use]
  pub fn intersecting_labels(&self, target: &CellUnion) -> Vec<i32> {
    let mut labels = Vec::new();
    self.visit_intersecting_cells(target, |_, label| {
      labels.push(label);
      true
    });
    labels.sort_unstable();
    labels.dedup();
    labels
  }
}

/// A cursor over the ranges partitioning the leaf cells, each covered by one fixed set of
/// cells.
#[derive(Debug, Clone)]
pub struct RangeIterator<'a> {
  nodes: &'a [RangeNode],
  pos: usize,
}

impl<'a> RangeIterator<'a> {
  /// First leaf of the current range.
  #[must_use]
  pub fn start_id(&self) -> CellId {
    self.nodes.get(self.pos).map_or(CellId::sentinel(), |n| n.start_id)
  }

  /// One past the last leaf of the current range.
  #[must_use]
  pub fn limit_id(&self) -> CellId {
    self.nodes.get(self.pos + 1).map_or(CellId::sentinel(), |n| n.start_id)
  }

  /// Whether no cell covers the current range.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.contents() == DONE_CONTENTS
  }

  fn contents(&self) -> i32 {
    self.nodes.get(self.pos).map_or(DONE_CONTENTS, |n| n.contents)
  }

  pub fn begin(&mut self) {
    self.pos = 0;
  }

  /// Positions past the last range.
  pub fn finish(&mut self) {
    self.pos = self.nodes.len().saturating_sub(1);
  }

  pub fn next(&mut self) {
    self.pos += 1;
  }

  /// Steps back, returning false (and not moving) at the first range.
  pub fn prev(&mut self) -> bool {
    if self.pos == 0 {
      return false;
    }
    self.pos -= 1;
    true
  }

  /// Positions at the range containing the leaf `target`, or done if `target` is past the
  /// last leaf.
  pub fn seek(&mut self, target: CellId) {
    self.pos = self.nodes.partition_point(|n| n.start_id <= target).saturating_sub(1);
  }

  #[must_use]
  pub fn done(&self) -> bool {
    self.pos + 1 >= self.nodes.len()
  }
}

/// A [`RangeIterator`] that skips ranges no cell covers.
#[derive(Debug, Clone)]
pub struct NonEmptyRangeIterator<'a> {
  range: RangeIterator<'a>,
}

impl<'a> NonEmptyRangeIterator<'a> {
  #[must_use]
  pub fn start_id(&self) -> CellId {
    self.range.start_id()
  }

  #[must_use]
  pub fn limit_id(&self) -> CellId {
    self.range.limit_id()
  }

  #[must_use]
  pub fn done(&self) -> bool {
    self.range.done()
  }

  fn skip_empty(&mut self) {
    while self.range.is_empty() && !self.range.done() {
      self.range.next();
    }
  }

  pub fn begin(&mut self) {
    self.range.begin();
    self.skip_empty();
  }

  pub fn finish(&mut self) {
    self.range.finish();
  }

  pub fn next(&mut self) {
    self.range.next();
    self.skip_empty();
  }

  /// Steps back to the previous non-empty range. Returns false and stays put if there is
  /// none.
  pub fn prev(&mut self) -> bool {
    let pos = self.range.pos;
    while self.range.prev() {
      if !self.range.is_empty() {
        return true;
      }
    }
    self.range.pos = pos;
    false
  }

  /// Positions at the first non-empty range containing or following `target`.
  pub fn seek(&mut self, target: CellId) {
    self.range.seek(target);
    self.skip_empty();
  }

  /// The underlying range cursor.
  #[must_use]
  pub fn range(&self) -> &RangeIterator<'a> {
    &self.range
  }
}

/// Visits the cells covering a range, innermost first.
///
/// When started on a sequence of increasing ranges, cells already reported for an earlier
/// range are skipped.
#[derive(Debug, Clone)]
pub struct ContentsIterator<'a> {
  cell_tree: &'a [CellNode],
  node: i32,
  prev_start_id: CellId,
  // Nodes at or below this index were reported by an earlier range.
  node_cutoff: i32,
  next_node_cutoff: i32,
}

impl<'a> ContentsIterator<'a> {
  #[must_use]
  pub fn new(index: &'a CellIndex) -> ContentsIterator<'a> {
    ContentsIterator {
      cell_tree: &index.cell_tree,
      node: DONE_CONTENTS,
      prev_start_id: CellId(0),
      node_cutoff: DONE_CONTENTS,
      next_node_cutoff: DONE_CONTENTS,
    }
  }

  /// Forgets previously reported cells.
  pub fn clear(&mut self) {
    self.node = DONE_CONTENTS;
    self.prev_start_id = CellId(0);
    self.node_cutoff = DONE_CONTENTS;
    self.next_node_cutoff = DONE_CONTENTS;
  }

  /// Starts on the cells covering the current range of `range`.
  pub fn start_union(&mut self, range: &RangeIterator<'_>) {
    if range.start_id() < self.prev_start_id {
      // Ranges went backwards, so duplicates cannot be suppressed.
      self.node_cutoff = DONE_CONTENTS;
    }
    self.prev_start_id = range.start_id();
    let contents = range.contents();
    self.node = if contents <= self.node_cutoff { DONE_CONTENTS } else { contents };
    self.next_node_cutoff = contents;
  }

  pub fn next(&mut self) {
    let parent = self.cell_tree[self.node as usize].parent;
    if parent <= self.node_cutoff {
      // The rest of the chain was reported already.
      self.node_cutoff = self.next_node_cutoff;
      self.node = DONE_CONTENTS;
    } else {
      self.node = parent;
    }
  }

  #[must_use]
  pub fn done(&self) -> bool {
    self.node == DONE_CONTENTS
  }

  /// The current cell. Must not be called when done.
  #[must_use]
  pub fn cell_id(&self) -> CellId {
    self.cell_tree[self.node as usize].cell_id
  }

  /// The current label. Must not be called when done.
  #[must_use]
  pub fn label(&self) -> i32 {
    self.cell_tree[self.node as usize].label
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::point::Point;
  use rand::rngs::StdRng;
  use rand::{Rng, SeedableRng};

  fn id_at(x: f64, y: f64, z: f64, level: i32) -> CellId {
    CellId::from_point(Point::from_coords(x, y, z)).parent(level)
  }

  fn build(cells: &[(CellId, i32)]) -> CellIndex {
    let mut index = CellIndex::new();
    for &(id, label) in cells {
      index.add(id, label);
    }
    index.build();
    index
  }

  // Every (cell, label) covering each range, checked against the raw input.
  fn check_ranges(index: &CellIndex, input: &[(CellId, i32)]) {
    let mut range = index.range_iter();
    let mut contents = index.contents_iter();
    range.begin();
    while !range.done() {
      assert!(range.start_id() < range.limit_id());
      contents.clear();
      contents.start_union(&range);
      let mut actual = Vec::new();
      while !contents.done() {
        actual.push((contents.cell_id(), contents.label()));
        contents.next();
      }
      let start = range.start_id();
      let mut expected: Vec<(CellId, i32)> =
        input.iter().copied().filter(|(id, _)| id.range_min() <= start && start <= id.range_max()).collect();
      actual.sort();
      expected.sort();
      assert_eq!(actual, expected);
      assert_eq!(range.is_empty(), expected.is_empty());
      range.next();
    }
  }

  #[test]
  fn test_empty_index() {
    let index = build(&[]);
    let mut range = index.range_iter();
    range.begin();
    assert!(range.is_empty());
    assert_eq!(range.start_id(), CellId::from_face(0).child_begin_at_level(MAX_LEVEL));
    range.next();
    assert!(range.done());
    assert!(index.non_empty_range_iter().done());
    assert!(index.intersecting_labels(&CellUnion::whole_sphere()).is_empty());
  }

  #[test]
  fn test_one_face_cell() {
    let cells = [(CellId::from_face(0), 0)];
    let index = build(&cells);
    check_ranges(&index, &cells);
    let it = index.non_empty_range_iter();
    assert_eq!(it.start_id(), CellId::from_face(0).range_min());
    assert_eq!(it.limit_id(), CellId::from_face(1).range_min());
  }

  #[test]
  fn test_nested_and_duplicate_cells() {
    let parent = id_at(1.0, 0.2, 0.3, 6);
    let child = parent.children()[2];
    let grandchild = child.children()[0];
    let cells = [(parent, 1), (child, 2), (grandchild, 3), (child, 2), (child, 4), (CellId::from_face(3), 5)];
    let index = build(&cells);
    assert_eq!(index.len(), cells.len());
    check_ranges(&index, &cells);
  }

  #[test]
  fn test_random_cells() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut cells = Vec::new();
    for label in 0..60 {
      let p = Point::from_coords(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
      cells.push((CellId::from_point(p).parent(rng.gen_range(0..8)), label % 17));
    }
    let index = build(&cells);
    check_ranges(&index, &cells);

    for _ in 0..20 {
      let p = Point::from_coords(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
      let target = CellUnion::from_cell_ids(vec![CellId::from_point(p).parent(rng.gen_range(0..10))]);
      let mut expected: Vec<i32> =
        cells.iter().filter(|(id, _)| target.intersects_cell_id(*id)).map(|&(_, label)| label).collect();
      expected.sort_unstable();
      expected.dedup();
      assert_eq!(index.intersecting_labels(&target), expected);
    }
  }

  #[test]
  fn test_visit_stops_early() {
    let cells = [(CellId::from_face(1), 7), (CellId::from_face(2), 8)];
    let index = build(&cells);
    let mut visited = 0;
    let finished = index.visit_intersecting_cells(&CellUnion::whole_sphere(), |_, _| {
      visited += 1;
      false
    });
    assert!(!finished);
    assert_eq!(visited, 1);
    assert_eq!(index.intersecting_labels(&CellUnion::whole_sphere()), vec![7, 8]);
  }

  #[test]
  fn test_non_empty_iteration() {
    let a = id_at(0.0, 1.0, 0.1, 10);
    let b = id_at(0.0, -0.1, 1.0, 12);
    let index = build(&[(a, 0), (b, 1)]);
    let mut it = index.non_empty_range_iter();
    assert_eq!(it.start_id(), a.range_min());
    assert!(!it.prev());
    assert_eq!(it.start_id(), a.range_min());
    it.next();
    assert_eq!(it.start_id(), b.range_min());
    assert_eq!(it.limit_id(), b.range_max().next());
    assert!(it.prev());
    assert_eq!(it.start_id(), a.range_min());
    it.seek(b.range_min().next());
    assert_eq!(it.start_id(), b.range_min());
    it.next();
    assert!(it.done());
    it.seek(a.range_max().next());
    assert_eq!(it.start_id(), b.range_min());
  }
}
