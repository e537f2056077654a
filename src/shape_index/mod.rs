// src/shape_index/mod.rs

//! A spatial index of shapes, decomposed into cells of the hierarchy.
//!
//! Each index cell holds the clipped edges of every shape that intersects it, plus for each
//! polygonal shape whether the cell center lies in its interior. Cells are subdivided until
//! they hold few enough edges. Mutations only mark the index stale; the decomposition is
//! rebuilt on the next access.

mod builder;
pub mod cell;
pub mod cell_data;
pub mod iterator;
pub mod region;
mod tracker;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::shape::Shape;

pub use cell::{CellRelation, ClippedShape, ShapeIndexCell};
pub use cell_data::{EdgeAndIdChain, IndexCellData};
pub use iterator::ShapeIndexIterator;
pub use region::ShapeIndexRegion;

use cell::CellTable;

/// Default number of edges a cell may hold before it is subdivided.
pub const DEFAULT_MAX_EDGES_PER_CELL: usize = 10;

/// Tuning for how finely the index subdivides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeIndexOptions {
  /// Cells are split while they hold more than this many edges that could still be split.
  /// Edges too long relative to the cell are not counted.
  pub max_edges_per_cell: usize,
}

impl Default for ShapeIndexOptions {
  fn default() -> Self {
    ShapeIndexOptions { max_edges_per_cell: DEFAULT_MAX_EDGES_PER_CELL }
  }
}

impl ShapeIndexOptions {
  #[must_use]
  pub fn with_max_edges_per_cell(mut self, max_edges_per_cell: usize) -> Self {
    self.max_edges_per_cell = max_edges_per_cell;
    self
  }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexStatus {
  Stale = 0,
  Updating = 1,
  Fresh = 2,
}

impl IndexStatus {
  fn from_u8(v: u8) -> IndexStatus {
    match v {
      0 => IndexStatus::Stale,
      1 => IndexStatus::Updating,
      _ => IndexStatus::Fresh,
    }
  }
}

/// Indexes a collection of shapes for fast spatial queries.
///
/// Shape ids are assigned sequentially and never reused. Readers may share the index across
/// threads; the first reader after a mutation rebuilds the cells while holding the write lock,
/// and concurrent readers wait for it.
pub struct ShapeIndex {
  options: ShapeIndexOptions,
  shapes: Vec<Option<Arc<dyn Shape>>>,
  status: AtomicU8,
  cells: RwLock<Arc<CellTable>>,
}

impl ShapeIndex {
  #[must_use]
  pub fn new() -> ShapeIndex {
    ShapeIndex::with_options(ShapeIndexOptions::default())
  }

  #[must_use]
  pub fn with_options(options: ShapeIndexOptions) -> ShapeIndex {
    ShapeIndex {
      options,
      shapes: Vec::new(),
      status: AtomicU8::new(IndexStatus::Fresh as u8),
      cells: RwLock::new(Arc::new(CellTable::default())),
    }
  }

  #[inline]
  #[must_use]
  pub fn options(&self) -> ShapeIndexOptions {
    self.options
  }

  /// Number of shapes currently in the index.
  #[must_use]
  pub fn len(&self) -> usize {
    self.shapes.iter().filter(|s| s.is_some()).count()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// One more than the largest shape id ever assigned.
  #[inline]
  #[must_use]
  pub fn num_shape_ids(&self) -> usize {
    self.shapes.len()
  }

  /// Total number of edges over all shapes.
  #[must_use]
  pub fn num_edges(&self) -> usize {
    self.shapes.iter().flatten().map(|s| s.num_edges()).sum()
  }

  /// The shape with the given id, or None if it was removed or never existed.
  #[must_use]
  pub fn shape(&self, id: i32) -> Option<&dyn Shape> {
    let idx = usize::try_from(id).ok()?;
    self.shapes.get(idx)?.as_deref()
  }

  /// Iterates over `(id, shape)` for every live shape.
  pub fn shapes(&self) -> impl Iterator<Item = (i32, &dyn Shape)> + '_ {
    self.shapes.iter().enumerate().filter_map(|(i, s)| s.as_deref().map(|s| (i as i32, s)))
  }

  /// Adds a shape and returns its id.
  pub fn add<S: Shape + 'static>(&mut self, shape: S) -> i32 {
    self.add_arc(Arc::new(shape))
  }

  /// Adds a shared shape and returns its id.
  pub fn add_arc(&mut self, shape: Arc<dyn Shape>) -> i32 {
    let id = self.shapes.len() as i32;
    self.shapes.push(Some(shape));
    self.mark_stale();
    id
  }

  /// Removes a shape, returning it if it was present. Its id is not reused.
  pub fn remove(&mut self, id: i32) -> Option<Arc<dyn Shape>> {
    let idx = usize::try_from(id).ok()?;
    let removed = self.shapes.get_mut(idx)?.take();
    if removed.is_some() {
      self.mark_stale();
    }
    removed
  }

  /// Removes all shapes. Ids restart at zero.
  pub fn reset(&mut self) {
    self.shapes.clear();
    *self.cells.get_mut() = Arc::new(CellTable::default());
    self.status.store(IndexStatus::Fresh as u8, Ordering::Release);
  }

  /// Whether the cell decomposition reflects every mutation.
  #[must_use]
  pub fn is_fresh(&self) -> bool {
    IndexStatus::from_u8(self.status.load(Ordering::Acquire)) == IndexStatus::Fresh
  }

  /// Brings the cell decomposition up to date. Called implicitly by every query.
  pub fn build(&self) {
    self.cell_table();
  }

  /// Number of index cells, building the index if needed.
  #[must_use]
  pub fn cell_count(&self) -> usize {
    self.cell_table().len()
  }

  /// A cursor over the index cells, positioned at the first cell.
  #[must_use]
  pub fn iter(&self) -> ShapeIndexIterator {
    ShapeIndexIterator::new(self.cell_table())
  }

  fn mark_stale(&mut self) {
    self.status.store(IndexStatus::Stale as u8, Ordering::Release);
  }

  pub(crate) fn cell_table(&self) -> Arc<CellTable> {
    if self.is_fresh() {
      return Arc::clone(&*self.cells.read());
    }
    let mut cells = self.cells.write();
    // Another reader may have finished the build while this one waited for the lock.
    if !self.is_fresh() {
      self.status.store(IndexStatus::Updating as u8, Ordering::Release);
      let table = builder::build(&self.shapes, &self.options);
      debug!(
        shapes = self.len(),
        edges = self.num_edges(),
        cells = table.len(),
        "built shape index"
      );
      *cells = Arc::new(table);
      self.status.store(IndexStatus::Fresh as u8, Ordering::Release);
    }
    Arc::clone(&*cells)
  }
}

impl Default for ShapeIndex {
  fn default() -> Self {
    ShapeIndex::new()
  }
}

impl Clone for ShapeIndex {
  /// Shares the shapes; the clone builds its own cells.
  fn clone(&self) -> Self {
    ShapeIndex {
      options: self.options,
      shapes: self.shapes.clone(),
      status: AtomicU8::new(IndexStatus::Stale as u8),
      cells: RwLock::new(Arc::new(CellTable::default())),
    }
  }
}

impl fmt::Debug for ShapeIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ShapeIndex")
      .field("options", &self.options)
      .field("shapes", &self.len())
      .field("fresh", &self.is_fresh())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::point::Point;
  use crate::shape::edge_vector::EdgeVector;
  use crate::shape::{LaxPolygon, PointVector, Polyline};
  use std::collections::BTreeSet;

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  #[test]
  fn test_add_remove_marks_stale() {
    let mut index = ShapeIndex::new();
    assert!(index.is_fresh());
    assert_eq!(index.cell_count(), 0);
    let id = index.add(PointVector::new(vec![p(1.0, 0.0, 0.0)]));
    assert_eq!(id, 0);
    assert!(!index.is_fresh());
    assert_eq!(index.cell_count(), 1);
    assert!(index.is_fresh());
    let id2 = index.add(Polyline::new(vec![p(0.0, 1.0, 0.0), p(0.0, 1.0, 0.1)]));
    assert_eq!(id2, 1);
    assert_eq!(index.len(), 2);
    assert_eq!(index.num_edges(), 2);
    assert!(index.remove(0).is_some());
    assert!(index.remove(0).is_none());
    assert!(index.shape(0).is_none());
    assert!(index.shape(1).is_some());
    assert_eq!(index.len(), 1);
    assert_eq!(index.num_shape_ids(), 2);
    assert_eq!(index.add(PointVector::default()), 2, "ids are never reused");
  }

  #[test]
  fn test_reset() {
    let mut index = ShapeIndex::new();
    index.add(PointVector::new(vec![p(1.0, 0.0, 0.0)]));
    index.build();
    index.reset();
    assert!(index.is_empty());
    assert_eq!(index.cell_count(), 0);
    assert_eq!(index.add(PointVector::default()), 0);
  }

  #[test]
  fn test_full_polygon_covers_every_face() {
    let mut index = ShapeIndex::new();
    index.add(LaxPolygon::from_loops(&[vec![]]));
    assert_eq!(index.cell_count(), 6);
    let mut it = index.iter();
    while !it.done() {
      assert!(it.cell_id().is_face());
      let cell = it.index_cell();
      assert_eq!(cell.num_clipped(), 1);
      assert!(cell.shapes()[0].contains_center());
      it.next();
    }
  }

  #[test]
  fn test_edge_soup_edges_all_indexed() {
    let mut soup = EdgeVector::default();
    for i in 0..40 {
      let t = f64::from(i) * 0.37;
      soup.push(p(t.cos(), t.sin(), 0.3), p((t * 1.7).sin(), 0.4, (t * 1.3).cos()));
    }
    soup.push(p(0.0, 0.0, 1.0), p(0.0, 0.0, 1.0));
    let num_edges = soup.num_edges();
    let mut index = ShapeIndex::with_options(ShapeIndexOptions::default().with_max_edges_per_cell(3));
    let id = index.add(soup);

    let mut seen = BTreeSet::new();
    let mut it = index.iter();
    while !it.done() {
      if let Some(clipped) = it.index_cell().find_by_shape_id(id) {
        seen.extend(clipped.edges().iter().copied());
      }
      it.next();
    }
    assert_eq!(seen, (0..num_edges as i32).collect::<BTreeSet<_>>());
  }

  #[test]
  fn test_many_edges_subdivide() {
    let mut index = ShapeIndex::with_options(ShapeIndexOptions::default().with_max_edges_per_cell(1));
    let vertices: Vec<Point> = (0..50).map(|i| p(1.0, f64::from(i) * 0.01, 0.2)).collect();
    index.add(Polyline::new(vertices));
    assert!(index.cell_count() > 10);
    let clone = index.clone();
    assert!(!clone.is_fresh());
    assert_eq!(clone.cell_count(), index.cell_count());
  }
}
