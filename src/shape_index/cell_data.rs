// src/shape_index/cell_data.rs

//! Per-cell edge materialization.
//!
//! Loading a cell copies the edges of every clipped shape into one flat buffer, with a range
//! table per shape and per dimension, so repeated edge lookups avoid dynamic dispatch.

use std::ops::Range;
use std::sync::OnceLock;

use super::cell::{ClippedShape, ShapeIndexCell};
use super::ShapeIndex;
use crate::cell::Cell;
use crate::cellid::CellId;
use crate::edge::{vertex_crossing, Crossing, EdgeCrosser};
use crate::point::Point;
use crate::shape::{Dimension, Edge};

/// An edge with its id and chain position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAndIdChain {
  pub edge: Edge,
  pub id: i32,
  pub chain: i32,
  pub offset: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct ShapeRegion {
  shape_id: i32,
  range: Range<usize>,
}

/// The edges of one index cell, grouped by shape and dimension.
///
/// The loaded data borrows the index and cell it came from. Do not mutate the index while a
/// loaded cell is in use.
#[derive(Debug, Default)]
pub struct IndexCellData<'a> {
  index: Option<&'a ShapeIndex>,
  index_cell: Option<&'a ShapeIndexCell>,
  cell_id: CellId,
  cell: OnceLock<Cell>,
  center: OnceLock<Point>,
  dim_wanted: [bool; 3],
  edges: Vec<EdgeAndIdChain>,
  shape_regions: Vec<ShapeRegion>,
  dim_regions: [Range<usize>; 3],
}

impl<'a> IndexCellData<'a> {
  #[must_use]
  pub fn new() -> IndexCellData<'a> {
    IndexCellData { dim_wanted: [true; 3], ..IndexCellData::default() }
  }

  /// Restricts loading to the given dimensions. Takes effect on the next load.
  pub fn set_dim_wanted(&mut self, dim: Dimension, wanted: bool) {
    self.dim_wanted[dim as usize] = wanted;
  }

  /// Loads the edges of `cell`, the index cell with id `id`. Reloading the same cell is a no-op.
  pub fn load_cell(&mut self, index: &'a ShapeIndex, id: CellId, cell: &'a ShapeIndexCell) {
    if self.index_cell.is_some_and(|c| std::ptr::eq(c, cell)) && self.cell_id == id {
      return;
    }
    self.index = Some(index);
    self.index_cell = Some(cell);
    self.cell_id = id;
    self.cell = OnceLock::new();
    self.center = OnceLock::new();
    self.edges.clear();
    self.shape_regions.clear();
    self.dim_regions = Default::default();

    for (dim, wanted) in self.dim_wanted.iter().enumerate() {
      if !wanted {
        continue;
      }
      let dim_start = self.edges.len();
      for clipped in &cell.shapes {
        let Some(shape) = index.shape(clipped.shape_id) else {
          continue;
        };
        if shape.dimension() as usize != dim {
          continue;
        }
        let shape_start = self.edges.len();
        for &edge_id in &clipped.edges {
          let pos = shape.chain_position(edge_id as usize);
          self.edges.push(EdgeAndIdChain {
            edge: shape.edge(edge_id as usize),
            id: edge_id,
            chain: pos.chain_id as i32,
            offset: pos.offset as i32,
          });
        }
        self.shape_regions.push(ShapeRegion { shape_id: clipped.shape_id, range: shape_start..self.edges.len() });
      }
      self.dim_regions[dim] = dim_start..self.edges.len();
    }
  }

  #[inline]
  #[must_use]
  pub fn cell_id(&self) -> CellId {
    self.cell_id
  }

  /// The loaded index cell, if any.
  #[must_use]
  pub fn index_cell(&self) -> Option<&'a ShapeIndexCell> {
    self.index_cell
  }

  /// The geometric cell, computed on first use.
  pub fn cell(&self) -> &Cell {
    self.cell.get_or_init(|| Cell::from_cell_id(self.cell_id))
  }

  /// The cell center, computed on first use.
  pub fn center(&self) -> Point {
    *self.center.get_or_init(|| self.cell_id.to_point())
  }

  /// Edges of the given shape in this cell; empty if the shape has none here.
  #[must_use]
  pub fn shape_edges(&self, shape_id: i32) -> &[EdgeAndIdChain] {
    self
      .shape_regions
      .iter()
      .find(|r| r.shape_id == shape_id)
      .map_or(&[][..], |r| &self.edges[r.range.clone()])
  }

  /// Edges of every shape of dimension `dim`.
  #[must_use]
  pub fn dim_edges(&self, dim: Dimension) -> &[EdgeAndIdChain] {
    &self.edges[self.dim_regions[dim as usize].clone()]
  }

  /// Edges of every shape with dimension in `[dim0, dim1]`, which are contiguous.
  #[must_use]
  pub fn dim_range_edges(&self, dim0: Dimension, dim1: Dimension) -> &[EdgeAndIdChain] {
    // Loaded dimensions sit back to back in order, so the non-empty regions bound the slice.
    let mut loaded = self.dim_regions[dim0 as usize..=dim1 as usize].iter().filter(|r| !r.is_empty());
    let Some(first) = loaded.next() else {
      return &[];
    };
    let end = loaded.last().map_or(first.end, |r| r.end);
    &self.edges[first.start..end]
  }

  /// Whether the clipped shape contains `p`, counting crossings from the cell center.
  ///
  /// Uses the semi-open vertex model; shapes without an interior never contain points.
  #[must_use]
  pub fn shape_contains(&self, clipped: &ClippedShape, p: Point) -> bool {
    let Some(shape) = self.index.and_then(|index| index.shape(clipped.shape_id)) else {
      return false;
    };
    if shape.dimension() != Dimension::Polygon {
      return false;
    }
    let mut inside = clipped.contains_center;
    let center = self.center();
    let mut crosser = EdgeCrosser::new(center, p);
    for e in self.shape_edges(clipped.shape_id) {
      match crosser.crossing_sign(e.edge.v0, e.edge.v1) {
        Crossing::DoNotCross => {}
        Crossing::Cross => inside = !inside,
        Crossing::MaybeCross => inside ^= vertex_crossing(center, p, e.edge.v0, e.edge.v1),
      }
    }
    inside
  }
}
