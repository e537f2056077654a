// src/query/edge_query.rs

//! Closest and furthest edge queries.
//!
//! Both run the same branch-and-bound search over the cells of the index. Cells wait in a
//! priority queue ordered by their best possible distance to the target. A cell that could
//! still beat the current limit is split into its children; index cells with few edges are
//! scanned directly.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

use tracing::trace;

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cell_union::CellUnion;
use crate::cellid::CellId;
use crate::edge::{min_update_distance_max_error, project};
use crate::math::s1::ChordAngle;
use crate::point::Point;
use crate::query::distance::{Distance, MaxDistance, MinDistance};
use crate::query::targets::DistanceTarget;
use crate::shape::{Edge, ShapeEdgeId};
use crate::shape_index::cell::{CellRelation, CellTable};
use crate::shape_index::{ShapeIndex, ShapeIndexIterator};

// Index cells with fewer edges are scanned immediately instead of queued.
const MIN_EDGES_TO_ENQUEUE: usize = 10;

/// Options shared by closest and furthest edge queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeQueryOptions {
  /// Maximum number of results; `usize::MAX` for no limit.
  pub max_results: usize,
  /// Only edges strictly better than this distance are returned. None for no limit.
  pub distance_limit: Option<ChordAngle>,
  /// Results may be up to this much worse than the true best, which speeds up the search.
  pub max_error: ChordAngle,
  /// Whether polygon interiors count as being at distance zero (or a straight angle for
  /// furthest queries). Such results have edge id -1.
  pub include_interiors: bool,
  /// Always scan every edge.
  pub use_brute_force: bool,
}

pub type ClosestEdgeQueryOptions = EdgeQueryOptions;
pub type FurthestEdgeQueryOptions = EdgeQueryOptions;

impl Default for EdgeQueryOptions {
  fn default() -> Self {
    EdgeQueryOptions {
      max_results: usize::MAX,
      distance_limit: None,
      max_error: ChordAngle::ZERO,
      include_interiors: true,
      use_brute_force: false,
    }
  }
}

impl EdgeQueryOptions {
  #[must_use]
  pub fn with_max_results(mut self, max_results: usize) -> Self {
    self.max_results = max_results.max(1);
    self
  }

  #[must_use]
  pub fn with_distance_limit(mut self, limit: ChordAngle) -> Self {
    self.distance_limit = Some(limit);
    self
  }

  #[must_use]
  pub fn with_max_error(mut self, max_error: ChordAngle) -> Self {
    self.max_error = max_error;
    self
  }

  #[must_use]
  pub fn with_include_interiors(mut self, include_interiors: bool) -> Self {
    self.include_interiors = include_interiors;
    self
  }

  #[must_use]
  pub fn with_use_brute_force(mut self, use_brute_force: bool) -> Self {
    self.use_brute_force = use_brute_force;
    self
  }
}

/// One edge found by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeQueryResult {
  /// Distance from the target to the edge.
  pub distance: ChordAngle,
  pub shape_id: i32,
  /// -1 when the result is a polygon interior rather than an edge.
  pub edge_id: i32,
}

impl EdgeQueryResult {
  fn none<D: Distance>() -> EdgeQueryResult {
    EdgeQueryResult { distance: D::infinity().chord_angle(), shape_id: -1, edge_id: -1 }
  }

  /// Whether the query found nothing.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.shape_id < 0
  }

  /// Whether the result is a polygon interior.
  #[must_use]
  pub fn is_interior(&self) -> bool {
    self.shape_id >= 0 && self.edge_id < 0
  }
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry<D> {
  distance: D,
  id: CellId,
  // Position in the cell table when this is an index cell.
  index_cell: Option<usize>,
}

impl<D: Distance> PartialEq for QueueEntry<D> {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl<D: Distance> Eq for QueueEntry<D> {}

impl<D: Distance> PartialOrd for QueueEntry<D> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<D: Distance> Ord for QueueEntry<D> {
  // The heap pops the greatest entry, which must be the best distance.
  fn cmp(&self, other: &Self) -> Ordering {
    if self.distance.less(other.distance) {
      Ordering::Greater
    } else if other.distance.less(self.distance) {
      Ordering::Less
    } else {
      other.id.cmp(&self.id)
    }
  }
}

/// Finds the edges of an index that are closest to a target.
pub type ClosestEdgeQuery<'a> = EdgeQuery<'a, MinDistance>;

/// Finds the edges of an index that are furthest from a target.
pub type FurthestEdgeQuery<'a> = EdgeQuery<'a, MaxDistance>;

/// An edge query over one index, reusable across targets.
///
/// The covering of the index computed for the first search is kept for later ones, so the
/// index must not change while the query exists (the borrow enforces this).
#[derive(Debug)]
pub struct EdgeQuery<'a, D: Distance> {
  index: &'a ShapeIndex,
  options: EdgeQueryOptions,
  // Top-level cells covering the index, and their table positions when they are index cells.
  index_covering: Vec<CellId>,
  index_cells: Vec<Option<usize>>,
  table: Option<Arc<CellTable>>,
  search: Search<D>,
}

// Per-search state.
#[derive(Debug)]
struct Search<D> {
  options: EdgeQueryOptions,
  distance_limit: D,
  use_conservative_cell_distance: bool,
  results: Vec<(D, ShapeEdgeId)>,
  tested_edges: HashSet<ShapeEdgeId>,
  queue: BinaryHeap<QueueEntry<D>>,
}

impl<D: Distance> Search<D> {
  fn new(options: EdgeQueryOptions) -> Search<D> {
    Search {
      options,
      distance_limit: options.distance_limit.map_or_else(D::infinity, D::from_chord_angle),
      use_conservative_cell_distance: false,
      results: Vec::new(),
      tested_edges: HashSet::new(),
      queue: BinaryHeap::new(),
    }
  }

  fn add_result(&mut self, distance: D, id: ShapeEdgeId) {
    let max_results = self.options.max_results;
    if max_results == 1 {
      // Only the best result is kept, so every later one must beat it.
      self.results.clear();
      self.results.push((distance, id));
      self.distance_limit = distance.sub(self.options.max_error);
    } else if max_results == usize::MAX {
      self.results.push((distance, id));
    } else {
      let pos = self.results.partition_point(|r| result_order(r, &(distance, id)) == Ordering::Less);
      if self.results.get(pos).is_some_and(|r| r.1 == id) {
        return;
      }
      self.results.insert(pos, (distance, id));
      if self.results.len() > max_results {
        self.results.pop();
      }
      if self.results.len() >= max_results {
        if let Some(&(worst, _)) = self.results.last() {
          self.distance_limit = worst.sub(self.options.max_error);
        }
      }
    }
  }
}

fn result_order<D: Distance>(a: &(D, ShapeEdgeId), b: &(D, ShapeEdgeId)) -> Ordering {
  if a.0.less(b.0) {
    Ordering::Less
  } else if b.0.less(a.0) {
    Ordering::Greater
  } else {
    a.1.cmp(&b.1)
  }
}

impl<'a, D: Distance> EdgeQuery<'a, D> {
  #[must_use]
  pub fn new(index: &'a ShapeIndex, options: EdgeQueryOptions) -> EdgeQuery<'a, D> {
    EdgeQuery {
      index,
      options,
      index_covering: Vec::new(),
      index_cells: Vec::new(),
      table: None,
      search: Search::new(options),
    }
  }

  #[inline]
  #[must_use]
  pub fn index(&self) -> &'a ShapeIndex {
    self.index
  }

  #[inline]
  #[must_use]
  pub fn options(&self) -> EdgeQueryOptions {
    self.options
  }

  #[inline]
  pub fn options_mut(&mut self) -> &mut EdgeQueryOptions {
    &mut self.options
  }

  /// The edges satisfying the options, best first. Ties are ordered by shape and edge id.
  pub fn find_edges<T>(&mut self, target: &mut T) -> Vec<EdgeQueryResult>
  where
    T: DistanceTarget<D> + ?Sized,
  {
    self.find_edges_with(target, self.options)
  }

  /// The single best edge, or an empty result if none is within the distance limit.
  pub fn find_edge<T>(&mut self, target: &mut T) -> EdgeQueryResult
  where
    T: DistanceTarget<D> + ?Sized,
  {
    self.find_edge_with(target, self.options.with_max_results(1))
  }

  /// Distance to the best edge; the worst sentinel (infinity for closest queries, negative for
  /// furthest) if there is none.
  pub fn get_distance<T>(&mut self, target: &mut T) -> ChordAngle
  where
    T: DistanceTarget<D> + ?Sized,
  {
    self.find_edge(target).distance
  }

  /// The edge of a result. Must not be called on empty or interior results.
  #[must_use]
  pub fn edge(&self, result: &EdgeQueryResult) -> Option<Edge> {
    let shape = self.index.shape(result.shape_id)?;
    let edge_id = usize::try_from(result.edge_id).ok()?;
    Some(shape.edge(edge_id))
  }

  pub(crate) fn find_edge_with<T>(&mut self, target: &mut T, options: EdgeQueryOptions) -> EdgeQueryResult
  where
    T: DistanceTarget<D> + ?Sized,
  {
    self
      .find_edges_with(target, options.with_max_results(1))
      .first()
      .copied()
      .unwrap_or_else(EdgeQueryResult::none::<D>)
  }

  fn find_edges_with<T>(&mut self, target: &mut T, options: EdgeQueryOptions) -> Vec<EdgeQueryResult>
  where
    T: DistanceTarget<D> + ?Sized,
  {
    self.search = Search::new(options);
    self.find_edges_internal(target);

    let mut results = std::mem::take(&mut self.search.results);
    results.sort_by(result_order);
    results.dedup_by(|a, b| a.1 == b.1);
    results.truncate(options.max_results);
    results
      .into_iter()
      .map(|(d, id)| EdgeQueryResult { distance: d.chord_angle(), shape_id: id.shape_id, edge_id: id.edge_id })
      .collect()
  }

  fn find_edges_internal<T>(&mut self, target: &mut T)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    if self.search.distance_limit == D::zero() {
      return;
    }

    let options = self.search.options;
    if options.include_interiors {
      let mut shape_ids = Vec::new();
      target.visit_containing_shapes(self.index, &mut |shape_id, _| {
        if !shape_ids.contains(&shape_id) {
          shape_ids.push(shape_id);
        }
        shape_ids.len() < options.max_results
      });
      for shape_id in shape_ids {
        self.search.add_result(D::zero(), ShapeEdgeId { shape_id, edge_id: -1 });
      }
      if self.search.distance_limit == D::zero() {
        return;
      }
    }

    // Cell distances must stay lower bounds when the target returns approximate distances.
    let target_uses_max_error = options.max_error > ChordAngle::ZERO && target.set_max_error(options.max_error);
    let limit = self.search.distance_limit;
    self.search.use_conservative_cell_distance = target_uses_max_error
      && (limit == D::infinity() || D::zero().less(limit.sub(options.max_error)));

    // Count edges only up to the point where brute force stops paying off.
    let brute_force_limit = target.max_brute_force_index_size();
    let mut num_edges = 0;
    for (_, shape) in self.index.shapes() {
      num_edges += shape.num_edges();
      if num_edges > brute_force_limit {
        break;
      }
    }
    let brute_force = options.use_brute_force || num_edges <= brute_force_limit;
    trace!(brute_force, num_edges, "edge query");
    if brute_force {
      self.find_edges_brute_force(target);
    } else {
      self.find_edges_optimized(target);
    }
  }

  fn find_edges_brute_force<T>(&mut self, target: &mut T)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    for (shape_id, shape) in self.index.shapes() {
      for edge_id in 0..shape.num_edges() {
        self.maybe_add_result(target, shape_id, edge_id as i32);
      }
    }
  }

  fn maybe_add_result<T>(&mut self, target: &mut T, shape_id: i32, edge_id: i32)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    let id = ShapeEdgeId { shape_id, edge_id };
    if !self.search.tested_edges.insert(id) {
      return;
    }
    let Some(shape) = self.index.shape(shape_id) else {
      return;
    };
    let edge = shape.edge(edge_id as usize);
    let mut dist = self.search.distance_limit;
    if target.update_distance_to_edge(&edge, &mut dist) {
      self.search.add_result(dist, id);
    }
  }

  fn find_edges_optimized<T>(&mut self, target: &mut T)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    let table = self.cell_table();
    let mut iter = ShapeIndexIterator::new(Arc::clone(&table));
    self.init_queue(target, &table, &mut iter);

    while let Some(entry) = self.search.queue.pop() {
      if !entry.distance.less(self.search.distance_limit) {
        self.search.queue.clear();
        break;
      }
      if let Some(pos) = entry.index_cell {
        self.process_edges(target, &table, pos);
        continue;
      }
      // Split the cell, enqueueing only children that contain index cells. Two seeks cover
      // all four children: one between children 0 and 1, one between 2 and 3.
      let id = entry.id;
      let ch = id.children();
      iter.seek(ch[1].range_min());
      if !iter.done() && iter.cell_id() <= ch[1].range_max() {
        self.process_or_enqueue_cell(target, &table, &iter, ch[1]);
      }
      if iter.prev() && iter.cell_id() >= id.range_min() {
        self.process_or_enqueue_cell(target, &table, &iter, ch[0]);
      }
      iter.seek(ch[3].range_min());
      if !iter.done() && iter.cell_id() <= id.range_max() {
        self.process_or_enqueue_cell(target, &table, &iter, ch[3]);
      }
      if iter.prev() && iter.cell_id() >= ch[2].range_min() {
        self.process_or_enqueue_cell(target, &table, &iter, ch[2]);
      }
    }
  }

  fn cell_table(&mut self) -> Arc<CellTable> {
    if let Some(table) = &self.table {
      return Arc::clone(table);
    }
    let table = self.index.cell_table();
    self.init_covering(&table);
    self.table = Some(Arc::clone(&table));
    table
  }

  // A few top-level cells covering the index: one per face it touches, or the children of
  // the smallest cell spanning it, each shrunk to fit the index cells within it.
  fn init_covering(&mut self, table: &Arc<CellTable>) {
    self.index_covering.clear();
    self.index_cells.clear();
    let mut next = ShapeIndexIterator::new(Arc::clone(table));
    let mut last = ShapeIndexIterator::new(Arc::clone(table));
    last.finish();
    if !last.prev() {
      return;
    }
    if next.cell_id() != last.cell_id() {
      let level = next.cell_id().common_ancestor_level(last.cell_id()).map_or(0, |l| l + 1);
      let last_id = last.cell_id().parent(level);
      let mut id = next.cell_id().parent(level);
      while id != last_id {
        if id.range_max() >= next.cell_id() {
          let first = next.clone();
          next.seek(id.range_max().next());
          let mut cell_last = next.clone();
          cell_last.prev();
          self.add_initial_range(&first, &cell_last);
        }
        id = id.next();
      }
    }
    self.add_initial_range(&next, &last);
  }

  fn add_initial_range(&mut self, first: &ShapeIndexIterator, last: &ShapeIndexIterator) {
    if first.cell_id() == last.cell_id() {
      self.index_covering.push(first.cell_id());
      self.index_cells.push(Some(first.position()));
    } else {
      let level = first.cell_id().common_ancestor_level(last.cell_id()).unwrap_or(0);
      self.index_covering.push(first.cell_id().parent(level));
      self.index_cells.push(None);
    }
  }

  fn init_queue<T>(&mut self, target: &mut T, table: &Arc<CellTable>, iter: &mut ShapeIndexIterator)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    let cap = target.cap_bound();
    if cap.is_empty() {
      return;
    }

    // When only the best edge is wanted, scanning the cell containing the cap center first
    // usually shrinks the search disc a lot. That cell is processed twice, which is cheap.
    if self.search.options.max_results == 1 && iter.locate_point(cap.center()) {
      self.process_edges(target, table, iter.position());
      if self.search.distance_limit == D::zero() {
        return;
      }
    }

    if self.search.distance_limit == D::infinity() {
      for i in 0..self.index_covering.len() {
        self.process_or_enqueue(target, table, self.index_covering[i], self.index_cells[i]);
      }
      return;
    }

    // Intersect a covering of the search disc with the index covering.
    let radius = cap.radius() + self.search.distance_limit.chord_angle_bound().to_angle();
    let search_cap = Cap::from_center_angle(cap.center(), radius);
    let initial_cells = CellUnion::from_intersection(
      &CellUnion::from_cell_ids_raw(self.index_covering.clone()),
      &CellUnion::from_cell_ids(search_cap.cell_union_bound()),
    );

    iter.begin();
    let (mut i, mut j) = (0, 0);
    while i < initial_cells.len() {
      let id_i = initial_cells[i];
      // The top-level cell containing this initial cell.
      while self.index_covering[j].range_max() < id_i {
        j += 1;
      }
      let id_j = self.index_covering[j];
      if id_i == id_j {
        self.process_or_enqueue(target, table, id_j, self.index_cells[j]);
        i += 1;
        j += 1;
        continue;
      }
      match iter.locate_cell_id(id_i) {
        CellRelation::Indexed => {
          // Enqueue the index cell and skip the initial cells it also contains.
          self.process_or_enqueue(target, table, iter.cell_id(), Some(iter.position()));
          let last_id = iter.cell_id().range_max();
          while i < initial_cells.len() && initial_cells[i] <= last_id {
            i += 1;
          }
        }
        CellRelation::Subdivided => {
          self.process_or_enqueue(target, table, id_i, None);
          i += 1;
        }
        CellRelation::Disjoint => i += 1,
      }
    }
  }

  fn process_or_enqueue_cell<T>(&mut self, target: &mut T, table: &CellTable, iter: &ShapeIndexIterator, id: CellId)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    let index_cell = (iter.cell_id() == id).then(|| iter.position());
    self.process_or_enqueue(target, table, id, index_cell);
  }

  fn process_or_enqueue<T>(&mut self, target: &mut T, table: &CellTable, id: CellId, index_cell: Option<usize>)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    if let Some(pos) = index_cell {
      let num_edges = table.cells[pos].num_edges();
      if num_edges == 0 {
        return;
      }
      if num_edges < MIN_EDGES_TO_ENQUEUE {
        self.process_edges(target, table, pos);
        return;
      }
    }
    let cell = Cell::from_cell_id(id);
    let mut dist = self.search.distance_limit;
    if !target.update_distance_to_cell(&cell, &mut dist) {
      return;
    }
    if self.search.use_conservative_cell_distance {
      dist = dist.sub(self.search.options.max_error);
    }
    self.search.queue.push(QueueEntry { distance: dist, id, index_cell });
  }

  fn process_edges<T>(&mut self, target: &mut T, table: &CellTable, pos: usize)
  where
    T: DistanceTarget<D> + ?Sized,
  {
    for clipped in table.cells[pos].shapes() {
      for &edge_id in clipped.edges() {
        self.maybe_add_result(target, clipped.shape_id(), edge_id);
      }
    }
  }
}

impl<'a> EdgeQuery<'a, MinDistance> {
  /// Whether the distance to the target is less than `limit`. Stops at the first edge found.
  pub fn is_distance_less<T>(&mut self, target: &mut T, limit: ChordAngle) -> bool
  where
    T: DistanceTarget<MinDistance> + ?Sized,
  {
    let options = self.options.with_distance_limit(limit).with_max_error(ChordAngle::STRAIGHT);
    !self.find_edge_with(target, options).is_empty()
  }

  /// Whether the distance to the target is at most `limit`.
  pub fn is_distance_less_or_equal<T>(&mut self, target: &mut T, limit: ChordAngle) -> bool
  where
    T: DistanceTarget<MinDistance> + ?Sized,
  {
    let options = self.options.with_distance_limit(limit.successor()).with_max_error(ChordAngle::STRAIGHT);
    !self.find_edge_with(target, options).is_empty()
  }

  /// Like [`EdgeQuery::is_distance_less_or_equal`], but also true when the distance exceeds
  /// `limit` by no more than the error of the distance computation.
  pub fn is_conservative_distance_less_or_equal<T>(&mut self, target: &mut T, limit: ChordAngle) -> bool
  where
    T: DistanceTarget<MinDistance> + ?Sized,
  {
    let conservative = limit.expanded(min_update_distance_max_error(limit)).successor();
    let options = self.options.with_distance_limit(conservative).with_max_error(ChordAngle::STRAIGHT);
    !self.find_edge_with(target, options).is_empty()
  }

  /// The point on the result edge closest to `point`; `point` itself for interior results.
  #[must_use]
  pub fn project(&self, point: Point, result: &EdgeQueryResult) -> Point {
    match self.edge(result) {
      Some(edge) => project(point, edge.v0, edge.v1),
      None => point,
    }
  }
}

impl<'a> EdgeQuery<'a, MaxDistance> {
  /// Whether the distance to the furthest edge is greater than `limit`.
  pub fn is_distance_greater<T>(&mut self, target: &mut T, limit: ChordAngle) -> bool
  where
    T: DistanceTarget<MaxDistance> + ?Sized,
  {
    let options = self.options.with_distance_limit(limit).with_max_error(ChordAngle::STRAIGHT);
    !self.find_edge_with(target, options).is_empty()
  }

  /// Whether the distance to the furthest edge is at least `limit`.
  pub fn is_distance_greater_or_equal<T>(&mut self, target: &mut T, limit: ChordAngle) -> bool
  where
    T: DistanceTarget<MaxDistance> + ?Sized,
  {
    let options = self.options.with_distance_limit(limit.predecessor()).with_max_error(ChordAngle::STRAIGHT);
    !self.find_edge_with(target, options).is_empty()
  }

  /// Like [`EdgeQuery::is_distance_greater_or_equal`], but also true when the distance falls
  /// short of `limit` by no more than the error of the distance computation.
  pub fn is_conservative_distance_greater_or_equal<T>(&mut self, target: &mut T, limit: ChordAngle) -> bool
  where
    T: DistanceTarget<MaxDistance> + ?Sized,
  {
    let conservative = limit.expanded(-min_update_distance_max_error(limit)).predecessor();
    let options = self.options.with_distance_limit(conservative).with_max_error(ChordAngle::STRAIGHT);
    !self.find_edge_with(target, options).is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::query::targets::{CellTarget, EdgeTarget, PointTarget};
  use crate::shape::{LaxPolygon, PointVector, Polyline};
  use rand::rngs::StdRng;
  use rand::{Rng, SeedableRng};

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  fn random_point(rng: &mut StdRng) -> Point {
    p(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
  }

  #[test]
  fn test_empty_index() {
    let index = ShapeIndex::new();
    let mut query = ClosestEdgeQuery::new(&index, EdgeQueryOptions::default());
    let result = query.find_edge(&mut PointTarget::new(p(1.0, 0.0, 0.0)));
    assert!(result.is_empty());
    assert_eq!(result.distance, ChordAngle::infinity());
    assert!(query.find_edges(&mut PointTarget::new(p(1.0, 0.0, 0.0))).is_empty());
  }

  #[test]
  fn test_closest_point() {
    let mut index = ShapeIndex::new();
    index.add(PointVector::new(vec![p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)]));
    let mut query = ClosestEdgeQuery::new(&index, EdgeQueryOptions::default());
    let result = query.find_edge(&mut PointTarget::new(p(1.0, 0.1, 0.0)));
    assert_eq!((result.shape_id, result.edge_id), (0, 0));
    let all = query.find_edges(&mut PointTarget::new(p(1.0, 0.1, 0.0)));
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].edge_id, 0);
    assert_eq!(all[1].edge_id, 1);
    assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));
  }

  #[test]
  fn test_furthest_point() {
    let mut index = ShapeIndex::new();
    index.add(PointVector::new(vec![p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(-1.0, 0.1, 0.0)]));
    let mut query = FurthestEdgeQuery::new(&index, EdgeQueryOptions::default());
    let result = query.find_edge(&mut PointTarget::new(p(1.0, 0.0, 0.0)));
    assert_eq!(result.edge_id, 2);
    assert!(query.is_distance_greater(&mut PointTarget::new(p(1.0, 0.0, 0.0)), ChordAngle::RIGHT));
    assert!(!query.is_distance_greater(&mut PointTarget::new(p(1.0, 0.0, 0.0)), ChordAngle::STRAIGHT));
  }

  #[test]
  fn test_distance_limit_and_max_results() {
    let mut index = ShapeIndex::new();
    let points: Vec<Point> = (0..20).map(|i| p(1.0, 0.01 * f64::from(i), 0.0)).collect();
    index.add(PointVector::new(points));
    let options = EdgeQueryOptions::default().with_max_results(5);
    let mut query = ClosestEdgeQuery::new(&index, options);
    let results = query.find_edges(&mut PointTarget::new(p(1.0, 0.0, 0.0)));
    assert_eq!(results.iter().map(|r| r.edge_id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

    let limit = p(1.0, 0.0, 0.0).chord_angle(p(1.0, 0.025, 0.0));
    query.options_mut().distance_limit = Some(limit);
    query.options_mut().max_results = usize::MAX;
    let results = query.find_edges(&mut PointTarget::new(p(1.0, 0.0, 0.0)));
    assert_eq!(results.len(), 3);
    assert!(query.is_distance_less(&mut PointTarget::new(p(1.0, 0.0, 0.0)), limit));
    assert!(!query.is_distance_less(&mut PointTarget::new(p(-1.0, 0.0, 0.0)), limit));
  }

  #[test]
  fn test_interiors() {
    let mut index = ShapeIndex::new();
    let square = vec![p(1.0, -0.2, -0.2), p(1.0, 0.2, -0.2), p(1.0, 0.2, 0.2), p(1.0, -0.2, 0.2)];
    index.add(LaxPolygon::from_loops(&[square]));
    let mut query = ClosestEdgeQuery::new(&index, EdgeQueryOptions::default());
    let inside = p(1.0, 0.0, 0.05);
    let result = query.find_edge(&mut PointTarget::new(inside));
    assert!(result.is_interior());
    assert_eq!(result.distance, ChordAngle::ZERO);
    assert_eq!(query.project(inside, &result), inside);

    query.options_mut().include_interiors = false;
    let result = query.find_edge(&mut PointTarget::new(inside));
    assert_eq!(result.edge_id, 2);
    assert!(result.distance > ChordAngle::ZERO);
    let projected = query.project(inside, &result);
    assert!(projected.distance(inside).radians() > 0.0);
  }

  #[test]
  fn test_full_and_empty_polygons() {
    let mut index = ShapeIndex::new();
    index.add(LaxPolygon::from_loops(&[]));
    let mut closest = ClosestEdgeQuery::new(&index, EdgeQueryOptions::default());
    assert!(closest.find_edge(&mut PointTarget::new(p(0.0, 0.0, 1.0))).is_empty());

    let mut full = ShapeIndex::new();
    full.add(LaxPolygon::from_loops(&[vec![]]));
    let target = p(0.3, -0.2, 1.0);
    let mut closest = ClosestEdgeQuery::new(&full, EdgeQueryOptions::default());
    assert_eq!(closest.get_distance(&mut PointTarget::new(target)), ChordAngle::ZERO);
    let mut furthest = FurthestEdgeQuery::new(&full, EdgeQueryOptions::default());
    assert_eq!(furthest.get_distance(&mut PointTarget::new(target)), ChordAngle::STRAIGHT);
  }

  #[test]
  fn test_optimized_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut index = ShapeIndex::new();
    for _ in 0..8 {
      // A random walk with short steps.
      let mut vertex = random_point(&mut rng);
      let mut vertices = Vec::new();
      for _ in 0..40 {
        vertices.push(vertex);
        vertex = (vertex + random_point(&mut rng) * 0.02).normalize();
      }
      index.add(Polyline::new(vertices));
    }
    let brute_options = EdgeQueryOptions::default().with_use_brute_force(true);
    let mut optimized = ClosestEdgeQuery::new(&index, EdgeQueryOptions::default());
    let mut brute = ClosestEdgeQuery::new(&index, brute_options);
    let mut far_optimized = FurthestEdgeQuery::new(&index, EdgeQueryOptions::default());
    let mut far_brute = FurthestEdgeQuery::new(&index, brute_options);
    for _ in 0..20 {
      let target = random_point(&mut rng);
      let a = optimized.get_distance(&mut PointTarget::new(target));
      let b = brute.get_distance(&mut PointTarget::new(target));
      assert!((a.length2() - b.length2()).abs() < 1e-15, "{a:?} vs {b:?}");
      let a = far_optimized.get_distance(&mut PointTarget::new(target));
      let b = far_brute.get_distance(&mut PointTarget::new(target));
      assert!((a.length2() - b.length2()).abs() < 1e-15, "{a:?} vs {b:?}");

      let edge_target = random_point(&mut rng);
      let a = optimized.get_distance(&mut EdgeTarget::new(target, edge_target));
      let b = brute.get_distance(&mut EdgeTarget::new(target, edge_target));
      assert!((a.length2() - b.length2()).abs() < 1e-15);

      let cell = Cell::from_cell_id(CellId::from_point(target).parent(8));
      let a = optimized.get_distance(&mut CellTarget::new(cell));
      let b = brute.get_distance(&mut CellTarget::new(cell));
      assert!((a.length2() - b.length2()).abs() < 1e-15);
    }
  }

  #[test]
  fn test_max_results_with_limit_update() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut index = ShapeIndex::new();
    let points: Vec<Point> = (0..200).map(|_| random_point(&mut rng)).collect();
    index.add(PointVector::new(points.clone()));
    let target = random_point(&mut rng);
    let mut query = ClosestEdgeQuery::new(&index, EdgeQueryOptions::default().with_max_results(10));
    let results = query.find_edges(&mut PointTarget::new(target));
    let mut expected: Vec<ChordAngle> = points.iter().map(|&q| q.chord_angle(target)).collect();
    expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(results.len(), 10);
    for (r, e) in results.iter().zip(&expected) {
      assert!((r.distance.length2() - e.length2()).abs() < 1e-15);
    }
  }
}
