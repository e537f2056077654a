// src/polygon/mod.rs

//! Polygons made of loops.
//!
//! Only single-loop polygons can be constructed; assembling a polygon from several loops
//! requires nesting them, which is not yet implemented.

pub mod encode;

use std::sync::OnceLock;

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cellid::CellId;
use crate::error::{Result, S2Error};
use crate::loops::Loop;
use crate::point::Point;
use crate::query::{ContainsPointQuery, VertexModel};
use crate::rect::Rect;
use crate::region::Region;
use crate::shape::{Chain, ChainPosition, Dimension, Edge, ReferencePoint, Shape, TYPE_TAG_POLYGON};
use crate::shape_index::{ShapeIndex, ShapeIndexRegion};

// Polygons with fewer vertices test containment by walking every loop.
const MAX_BRUTE_FORCE_VERTICES: usize = 32;

/// A region bounded by loops. Shells have even depth and holes odd depth; edges of holes are
/// reported in reverse so that the interior is always on the left.
pub struct Polygon {
  loops: Vec<Loop>,
  has_holes: bool,
  num_vertices: usize,
  // cumulative_edges[i] is the id of the first edge of loop i.
  cumulative_edges: Vec<usize>,
  num_edges: usize,
  bound: Rect,
  index: OnceLock<ShapeIndex>,
}

impl Polygon {
  /// The polygon with no loops, containing nothing.
  #[must_use]
  pub fn empty() -> Polygon {
    Polygon::from_parts(Vec::new())
  }

  /// The polygon containing everything: a single full loop.
  #[must_use]
  pub fn full() -> Polygon {
    Polygon::from_parts(vec![Loop::full()])
  }

  /// A polygon bounded by a single loop. An empty loop gives the empty polygon.
  #[must_use]
  pub fn from_loop(mut l: Loop) -> Polygon {
    if l.is_empty() {
      return Polygon::empty();
    }
    l.set_depth(0);
    Polygon::from_parts(vec![l])
  }

  /// A polygon from loops oriented with their interiors on the left.
  ///
  /// # Panics
  ///
  /// With more than one loop: nesting several loops into shells and holes is not yet
  /// implemented.
  #[must_use]
  pub fn from_loops(mut loops: Vec<Loop>) -> Polygon {
    assert!(loops.len() <= 1, "Polygon::from_loops with multiple loops is not yet implemented");
    match loops.pop() {
      Some(l) => Polygon::from_loop(l),
      None => Polygon::empty(),
    }
  }

  /// The polygon covering exactly one cell.
  #[must_use]
  pub fn from_cell(cell: &Cell) -> Polygon {
    Polygon::from_loop(Loop::from_cell(cell))
  }

  // Loops must already carry their depths.
  pub(crate) fn from_parts(loops: Vec<Loop>) -> Polygon {
    let mut cumulative_edges = Vec::with_capacity(loops.len());
    let mut num_edges = 0;
    let mut bound = Rect::empty();
    for l in &loops {
      cumulative_edges.push(num_edges);
      num_edges += l.num_edges();
      if l.depth() == 0 {
        bound = bound.union(&l.bound());
      }
    }
    Polygon {
      has_holes: loops.iter().any(Loop::is_hole),
      num_vertices: loops.iter().map(Loop::num_vertices).sum(),
      loops,
      cumulative_edges,
      num_edges,
      bound,
      index: OnceLock::new(),
    }
  }

  #[inline]
  #[must_use]
  pub fn num_loops(&self) -> usize {
    self.loops.len()
  }

  /// Loop `i`. Panics if out of range.
  #[inline]
  #[must_use]
  pub fn loop_at(&self, i: usize) -> &Loop {
    &self.loops[i]
  }

  #[inline]
  #[must_use]
  pub fn loops(&self) -> &[Loop] {
    &self.loops
  }

  #[inline]
  #[must_use]
  pub fn has_holes(&self) -> bool {
    self.has_holes
  }

  /// Total vertices over all loops.
  #[inline]
  #[must_use]
  pub fn num_vertices(&self) -> usize {
    self.num_vertices
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.loops.is_empty()
  }

  #[must_use]
  pub fn is_full(&self) -> bool {
    self.loops.len() == 1 && self.loops[0].is_full()
  }

  /// The index of this polygon's edges, built on first use.
  #[must_use]
  pub fn index(&self) -> &ShapeIndex {
    self.index.get_or_init(|| {
      let mut index = ShapeIndex::new();
      index.add(self.clone());
      index
    })
  }

  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    if !self.bound.contains_point(p) {
      return false;
    }
    if self.num_vertices < MAX_BRUTE_FORCE_VERTICES {
      return self.loops.iter().fold(false, |inside, l| inside ^ l.contains_point(p));
    }
    ContainsPointQuery::new(self.index(), VertexModel::SemiOpen).contains(p)
  }

  /// Whether the polygon contains the whole cell. Cells touching the boundary may be
  /// reported as not contained.
  #[must_use]
  pub fn contains_cell(&self, cell: &Cell) -> bool {
    if self.is_empty() || !self.bound.contains(&cell.rect_bound()) {
      return false;
    }
    ShapeIndexRegion::new(self.index()).contains_cell(cell)
  }

  /// Whether the polygon may intersect the cell.
  #[must_use]
  pub fn intersects_cell(&self, cell: &Cell) -> bool {
    if self.is_empty() || !self.bound.intersects(&cell.rect_bound()) {
      return false;
    }
    ShapeIndexRegion::new(self.index()).intersects_cell(cell)
  }

  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    self.bound.cap_bound()
  }

  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    self.bound
  }

  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    ShapeIndexRegion::new(self.index()).cell_union_bound()
  }

  /// Area in steradians: shells count positively and holes negatively.
  #[must_use]
  pub fn area(&self) -> f64 {
    self.loops.iter().map(|l| f64::from(l.sign()) * l.area()).sum()
  }

  /// Centroid scaled by area; not unit length.
  #[must_use]
  pub fn centroid(&self) -> Point {
    self.loops.iter().fold(Point::default(), |acc, l| acc + l.centroid() * f64::from(l.sign()))
  }

  /// Checks every loop and the loop structure.
  pub fn validate(&self) -> Result<()> {
    for (i, l) in self.loops.iter().enumerate() {
      if l.is_empty() {
        return Err(S2Error::InvalidPolygon(format!("loop {i}: empty loops are not allowed")));
      }
      if l.is_full() && self.loops.len() > 1 {
        return Err(S2Error::InvalidPolygon(format!("loop {i}: full loop appears in non-full polygon")));
      }
      l.validate().map_err(|e| S2Error::InvalidPolygon(format!("loop {i}: {e}")))?;
    }
    let mut last_depth = -1;
    for (i, l) in self.loops.iter().enumerate() {
      let depth = l.depth();
      if depth < 0 || depth > last_depth + 1 {
        return Err(S2Error::InvalidPolygon(format!("loop {i}: invalid loop depth ({depth})")));
      }
      last_depth = depth;
    }
    Ok(())
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.validate().is_ok()
  }

  // Which loop edge `e` belongs to, and its offset within the loop.
  fn loop_of_edge(&self, e: usize) -> (usize, usize) {
    let i = self.cumulative_edges.partition_point(|&start| start <= e) - 1;
    (i, e - self.cumulative_edges[i])
  }

  // Vertex `k` of loop `i` in edge order: reversed for holes.
  fn oriented_vertex(&self, i: usize, k: usize) -> Point {
    let l = &self.loops[i];
    let n = l.num_vertices();
    if l.is_hole() {
      l.vertex(n - 1 - k % n)
    } else {
      l.vertex(k)
    }
  }
}

impl Clone for Polygon {
  fn clone(&self) -> Self {
    Polygon {
      loops: self.loops.clone(),
      has_holes: self.has_holes,
      num_vertices: self.num_vertices,
      cumulative_edges: self.cumulative_edges.clone(),
      num_edges: self.num_edges,
      bound: self.bound,
      index: OnceLock::new(),
    }
  }
}

impl PartialEq for Polygon {
  fn eq(&self, other: &Self) -> bool {
    self.loops.len() == other.loops.len()
      && self.loops.iter().zip(&other.loops).all(|(a, b)| a == b && a.depth() == b.depth())
  }
}

impl std::fmt::Debug for Polygon {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Polygon").field("loops", &self.loops).finish_non_exhaustive()
  }
}

impl Shape for Polygon {
  fn num_edges(&self) -> usize {
    self.num_edges
  }

  fn edge(&self, e: usize) -> Edge {
    let (i, k) = self.loop_of_edge(e);
    Edge::new(self.oriented_vertex(i, k), self.oriented_vertex(i, k + 1))
  }

  fn reference_point(&self) -> ReferencePoint {
    ReferencePoint::origin(self.loops.iter().fold(false, |inside, l| inside ^ l.contains_origin()))
  }

  fn num_chains(&self) -> usize {
    self.loops.len()
  }

  fn chain(&self, chain_id: usize) -> Chain {
    Chain { start: self.cumulative_edges[chain_id], length: self.loops[chain_id].num_edges() }
  }

  fn chain_edge(&self, chain_id: usize, offset: usize) -> Edge {
    Edge::new(self.oriented_vertex(chain_id, offset), self.oriented_vertex(chain_id, offset + 1))
  }

  fn chain_position(&self, edge_id: usize) -> ChainPosition {
    let (chain_id, offset) = self.loop_of_edge(edge_id);
    ChainPosition { chain_id, offset }
  }

  fn dimension(&self) -> Dimension {
    Dimension::Polygon
  }

  fn type_tag(&self) -> u32 {
    TYPE_TAG_POLYGON
  }
}

impl Region for Polygon {
  fn cap_bound(&self) -> Cap {
    Polygon::cap_bound(self)
  }

  fn rect_bound(&self) -> Rect {
    Polygon::rect_bound(self)
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    Polygon::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    Polygon::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    Polygon::contains_point(self, p)
  }

  fn cell_union_bound(&self) -> Vec<CellId> {
    Polygon::cell_union_bound(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::{M_4PI, M_PI_2};
  use crate::math::s1::Angle;

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  fn octant() -> Polygon {
    Polygon::from_loop(Loop::new(vec![p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)]))
  }

  #[test]
  fn test_empty_and_full() {
    let empty = Polygon::empty();
    assert!(empty.is_empty() && Shape::is_empty(&empty));
    assert_eq!(empty.num_chains(), 0);
    assert!(!empty.contains_point(p(1.0, 0.0, 0.0)));
    assert_eq!(empty.area(), 0.0);

    let full = Polygon::full();
    assert!(full.is_full() && Shape::is_full(&full));
    assert_eq!(full.num_edges(), 0);
    assert_eq!(full.num_chains(), 1);
    assert!(full.contains_point(p(1.0, 0.0, 0.0)));
    assert_eq!(full.area(), M_4PI);
    assert!(full.contains_cell(&Cell::from_cell_id(CellId::from_face(3))));

    assert!(Polygon::from_loop(Loop::empty()).is_empty());
  }

  #[test]
  #[should_panic(expected = "not yet implemented")]
  fn test_multiple_loops_unimplemented() {
    let _ = Polygon::from_loops(vec![Loop::full(), Loop::full()]);
  }

  #[test]
  fn test_single_loop() {
    let poly = octant();
    assert_eq!(poly.num_loops(), 1);
    assert_eq!(poly.num_edges(), 3);
    assert!(!poly.has_holes());
    assert!((poly.area() - M_PI_2).abs() < 1e-14);
    assert!(poly.contains_point(p(1.0, 1.0, 1.0)));
    assert!(!poly.contains_point(p(1.0, -1.0, 1.0)));
    assert_eq!(poly.edge(2), Edge::new(p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0)));
    assert_eq!(poly.chain_position(1), ChainPosition { chain_id: 0, offset: 1 });
    assert!(poly.validate().is_ok());
  }

  #[test]
  fn test_cells() {
    let center = p(0.2, 0.3, 1.0);
    let poly = Polygon::from_loop(Loop::regular(center, Angle::from_degrees(3.0), 64));
    let inner = Cell::from_cell_id(CellId::from_point(center).parent(10));
    assert!(poly.contains_cell(&inner));
    assert!(poly.intersects_cell(&inner));
    let far = Cell::from_cell_id(CellId::from_point(-center).parent(10));
    assert!(!poly.contains_cell(&far));
    assert!(!poly.intersects_cell(&far));
    // A large cell straddles the boundary.
    let big = Cell::from_cell_id(CellId::from_point(center).parent(2));
    assert!(!poly.contains_cell(&big));
    assert!(poly.intersects_cell(&big));

    let covering = poly.cell_union_bound();
    assert!(covering.iter().any(|id| id.contains(inner.id())));
  }

  #[test]
  fn test_cell_polygon() {
    let cell = Cell::from_cell_id(CellId::from_face(1).child_begin_at_level(6));
    let poly = Polygon::from_cell(&cell);
    assert!(poly.contains_point(cell.center()));
    assert!((poly.area() - cell.exact_area()).abs() < 1e-15);
  }

  #[test]
  fn test_validate_reports_loop() {
    let a = Point::from_coords(1.0, 0.0, 0.0);
    let poly = Polygon::from_loop(Loop::new(vec![a, a, p(0.0, 1.0, 0.0)]));
    assert!(matches!(poly.validate(), Err(S2Error::InvalidPolygon(msg)) if msg.starts_with("loop 0")));
  }
}
