// src/query/targets.rs

//! Geometry that edge queries measure distances from.

use crate::cap::Cap;
use crate::cell::Cell;
use crate::edge::{
  update_edge_pair_max_distance, update_edge_pair_min_distance, update_max_distance, update_min_distance,
};
use crate::math::s1::ChordAngle;
use crate::point::Point;
use crate::query::contains_point::{ContainsPointQuery, VertexModel};
use crate::query::distance::{Distance, MaxDistance, MinDistance};
use crate::query::edge_query::{EdgeQuery, EdgeQueryOptions};
use crate::shape::Edge;
use crate::shape_index::{ShapeIndex, ShapeIndexRegion};

/// A target of an edge query under distance measure `D`.
///
/// Each `update_distance_to_*` lowers `dist` (in the sense of [`Distance::less`]) to the
/// distance from the target to the feature if that is better, and reports whether it did.
pub trait DistanceTarget<D: Distance> {
  /// A cap around the target such that features near it (in the sense of `D`) are near the
  /// cap. For furthest-distance targets this surrounds the antipode.
  fn cap_bound(&self) -> Cap;

  fn update_distance_to_point(&mut self, p: Point, dist: &mut D) -> bool;

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut D) -> bool;

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut D) -> bool;

  /// Lets the target trade accuracy for speed. Returns whether the target makes use of it.
  fn set_max_error(&mut self, _max_error: ChordAngle) -> bool {
    false
  }

  /// Index size in edges below which brute force beats the cell search for this target.
  fn max_brute_force_index_size(&self) -> usize;

  /// Calls `visitor(shape_id, point)` for the polygons of `index` whose interior is at zero
  /// distance from the target, stopping when it returns false. Returns false if stopped.
  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool;
}

fn visit_polygons_containing(
  index: &ShapeIndex,
  p: Point,
  reported: Point,
  visitor: &mut dyn FnMut(i32, Point) -> bool,
) -> bool {
  ContainsPointQuery::new(index, VertexModel::SemiOpen).visit_containing_shapes(p, |id| visitor(id, reported))
}

// Updates `dist` through its chord angle with an in-place chord angle update.
fn update_with<D: Distance>(dist: &mut D, f: impl FnOnce(&mut ChordAngle) -> bool) -> bool {
  let mut ca = dist.chord_angle();
  if f(&mut ca) {
    *dist = D::from_chord_angle(ca);
    return true;
  }
  false
}

/// A single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTarget {
  point: Point,
}

impl PointTarget {
  #[must_use]
  pub fn new(point: Point) -> PointTarget {
    PointTarget { point }
  }

  #[inline]
  #[must_use]
  pub fn point(&self) -> Point {
    self.point
  }
}

impl DistanceTarget<MinDistance> for PointTarget {
  fn cap_bound(&self) -> Cap {
    Cap::from_center_chord_angle(self.point, ChordAngle::ZERO)
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MinDistance) -> bool {
    dist.update(MinDistance(p.chord_angle(self.point)))
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MinDistance) -> bool {
    update_with(dist, |ca| update_min_distance(self.point, edge.v0, edge.v1, ca))
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MinDistance) -> bool {
    dist.update(MinDistance(cell.distance(self.point)))
  }

  fn max_brute_force_index_size(&self) -> usize {
    30
  }

  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    visit_polygons_containing(index, self.point, self.point, visitor)
  }
}

impl DistanceTarget<MaxDistance> for PointTarget {
  fn cap_bound(&self) -> Cap {
    Cap::from_center_chord_angle(-self.point, ChordAngle::ZERO)
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MaxDistance) -> bool {
    dist.update(MaxDistance(p.chord_angle(self.point)))
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MaxDistance) -> bool {
    update_with(dist, |ca| update_max_distance(self.point, edge.v0, edge.v1, ca))
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MaxDistance) -> bool {
    dist.update(MaxDistance(cell.max_distance(self.point)))
  }

  fn max_brute_force_index_size(&self) -> usize {
    30
  }

  // Polygons containing the antipode are at the maximum possible distance.
  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    visit_polygons_containing(index, -self.point, self.point, visitor)
  }
}

/// A single edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeTarget {
  edge: Edge,
}

impl EdgeTarget {
  #[must_use]
  pub fn new(v0: Point, v1: Point) -> EdgeTarget {
    EdgeTarget { edge: Edge::new(v0, v1) }
  }

  #[inline]
  #[must_use]
  pub fn edge(&self) -> Edge {
    self.edge
  }

  // The midpoint, tested for containment so that AB and BA behave the same.
  fn midpoint(&self) -> Point {
    (self.edge.v0 + self.edge.v1).normalize()
  }

  // Half the edge length, computed stably.
  fn half_length(&self) -> ChordAngle {
    let d2 = self.edge.v0.chord_angle(self.edge.v1).length2();
    let r2 = (0.5 * d2) / (1.0 + (1.0 - 0.25 * d2).sqrt());
    ChordAngle::from_squared_length(r2)
  }
}

impl DistanceTarget<MinDistance> for EdgeTarget {
  fn cap_bound(&self) -> Cap {
    Cap::from_center_chord_angle(self.midpoint(), self.half_length())
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MinDistance) -> bool {
    update_with(dist, |ca| update_min_distance(p, self.edge.v0, self.edge.v1, ca))
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MinDistance) -> bool {
    update_with(dist, |ca| update_edge_pair_min_distance(self.edge.v0, self.edge.v1, edge.v0, edge.v1, ca))
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MinDistance) -> bool {
    dist.update(MinDistance(cell.distance_to_edge(self.edge.v0, self.edge.v1)))
  }

  fn max_brute_force_index_size(&self) -> usize {
    30
  }

  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    let mid = self.midpoint();
    visit_polygons_containing(index, mid, mid, visitor)
  }
}

impl DistanceTarget<MaxDistance> for EdgeTarget {
  fn cap_bound(&self) -> Cap {
    Cap::from_center_chord_angle(-self.midpoint(), self.half_length())
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MaxDistance) -> bool {
    update_with(dist, |ca| update_max_distance(p, self.edge.v0, self.edge.v1, ca))
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MaxDistance) -> bool {
    update_with(dist, |ca| update_edge_pair_max_distance(self.edge.v0, self.edge.v1, edge.v0, edge.v1, ca))
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MaxDistance) -> bool {
    dist.update(MaxDistance(cell.max_distance_to_edge(self.edge.v0, self.edge.v1)))
  }

  fn max_brute_force_index_size(&self) -> usize {
    30
  }

  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    let mid = self.midpoint();
    visit_polygons_containing(index, -mid, mid, visitor)
  }
}

/// A cell, including its interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTarget {
  cell: Cell,
}

impl CellTarget {
  #[must_use]
  pub fn new(cell: Cell) -> CellTarget {
    CellTarget { cell }
  }

  #[inline]
  #[must_use]
  pub fn cell(&self) -> &Cell {
    &self.cell
  }
}

impl DistanceTarget<MinDistance> for CellTarget {
  fn cap_bound(&self) -> Cap {
    self.cell.cap_bound()
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MinDistance) -> bool {
    dist.update(MinDistance(self.cell.distance(p)))
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MinDistance) -> bool {
    dist.update(MinDistance(self.cell.distance_to_edge(edge.v0, edge.v1)))
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MinDistance) -> bool {
    dist.update(MinDistance(self.cell.distance_to_cell(cell)))
  }

  fn max_brute_force_index_size(&self) -> usize {
    30
  }

  // Polygons containing the cell center; testing index cells against the whole target would
  // need a more exact intersection test.
  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    let center = self.cell.center();
    visit_polygons_containing(index, center, center, visitor)
  }
}

impl DistanceTarget<MaxDistance> for CellTarget {
  fn cap_bound(&self) -> Cap {
    let cap = self.cell.cap_bound();
    Cap::from_center_chord_angle(-cap.center(), cap.chord_radius())
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MaxDistance) -> bool {
    dist.update(MaxDistance(self.cell.max_distance(p)))
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MaxDistance) -> bool {
    dist.update(MaxDistance(self.cell.max_distance_to_edge(edge.v0, edge.v1)))
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MaxDistance) -> bool {
    dist.update(MaxDistance(self.cell.max_distance_to_cell(cell)))
  }

  fn max_brute_force_index_size(&self) -> usize {
    30
  }

  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    let center = self.cell.center();
    visit_polygons_containing(index, -center, center, visitor)
  }
}

/// Every shape of another index, including polygon interiors.
///
/// Distances are computed by running a nested edge query against the target index.
#[derive(Debug)]
pub struct ShapeIndexTarget<'a, D: Distance> {
  index: &'a ShapeIndex,
  query: EdgeQuery<'a, D>,
}

impl<'a, D: Distance> ShapeIndexTarget<'a, D> {
  #[must_use]
  pub fn new(index: &'a ShapeIndex) -> ShapeIndexTarget<'a, D> {
    ShapeIndexTarget { index, query: EdgeQuery::new(index, EdgeQueryOptions::default()) }
  }

  /// Whether polygon interiors of the target index count as being at zero distance.
  pub fn set_include_interiors(&mut self, include_interiors: bool) {
    self.query.options_mut().include_interiors = include_interiors;
  }

  pub fn set_use_brute_force(&mut self, use_brute_force: bool) {
    self.query.options_mut().use_brute_force = use_brute_force;
  }

  #[inline]
  #[must_use]
  pub fn index(&self) -> &'a ShapeIndex {
    self.index
  }

  // Runs the nested query for the single best edge within `dist`.
  fn update_with_target<T>(&mut self, target: &mut T, dist: &mut D) -> bool
  where
    T: DistanceTarget<D>,
  {
    let options = self.query.options().with_max_results(1).with_distance_limit(dist.chord_angle());
    let result = self.query.find_edge_with(target, options);
    if result.is_empty() {
      return false;
    }
    *dist = D::from_chord_angle(result.distance);
    true
  }

  // Visits with one point per connected component of the target index: the first vertex of
  // every chain, or the reference point of shapes without edges.
  fn visit_chain_starts(
    &self,
    index: &ShapeIndex,
    visitor: &mut dyn FnMut(i32, Point) -> bool,
    visit_point: &dyn Fn(&ShapeIndex, Point, &mut dyn FnMut(i32, Point) -> bool) -> bool,
  ) -> bool {
    for (_, shape) in self.index.shapes() {
      let mut tested_point = false;
      for c in 0..shape.num_chains() {
        if shape.chain(c).length == 0 {
          continue;
        }
        tested_point = true;
        if !visit_point(index, shape.chain_edge(c, 0).v0, visitor) {
          return false;
        }
      }
      if !tested_point {
        // Full polygons have no edges.
        let reference = shape.reference_point();
        if reference.contained && !visit_point(index, reference.point, visitor) {
          return false;
        }
      }
    }
    true
  }
}

impl DistanceTarget<MinDistance> for ShapeIndexTarget<'_, MinDistance> {
  fn cap_bound(&self) -> Cap {
    ShapeIndexRegion::new(self.index).cap_bound()
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MinDistance) -> bool {
    self.update_with_target(&mut PointTarget::new(p), dist)
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MinDistance) -> bool {
    self.update_with_target(&mut EdgeTarget::new(edge.v0, edge.v1), dist)
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MinDistance) -> bool {
    self.update_with_target(&mut CellTarget::new(*cell), dist)
  }

  fn set_max_error(&mut self, max_error: ChordAngle) -> bool {
    self.query.options_mut().max_error = max_error;
    true
  }

  fn max_brute_force_index_size(&self) -> usize {
    25
  }

  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    self.visit_chain_starts(index, visitor, &|index, p, visitor| {
      DistanceTarget::<MinDistance>::visit_containing_shapes(&PointTarget::new(p), index, visitor)
    })
  }
}

impl DistanceTarget<MaxDistance> for ShapeIndexTarget<'_, MaxDistance> {
  fn cap_bound(&self) -> Cap {
    let cap = ShapeIndexRegion::new(self.index).cap_bound();
    if cap.is_empty() {
      return cap;
    }
    Cap::from_center_chord_angle(-cap.center(), cap.chord_radius())
  }

  fn update_distance_to_point(&mut self, p: Point, dist: &mut MaxDistance) -> bool {
    self.update_with_target(&mut PointTarget::new(p), dist)
  }

  fn update_distance_to_edge(&mut self, edge: &Edge, dist: &mut MaxDistance) -> bool {
    self.update_with_target(&mut EdgeTarget::new(edge.v0, edge.v1), dist)
  }

  fn update_distance_to_cell(&mut self, cell: &Cell, dist: &mut MaxDistance) -> bool {
    self.update_with_target(&mut CellTarget::new(*cell), dist)
  }

  fn set_max_error(&mut self, max_error: ChordAngle) -> bool {
    self.query.options_mut().max_error = max_error;
    true
  }

  fn max_brute_force_index_size(&self) -> usize {
    25
  }

  fn visit_containing_shapes(&self, index: &ShapeIndex, visitor: &mut dyn FnMut(i32, Point) -> bool) -> bool {
    self.visit_chain_starts(index, visitor, &|index, p, visitor| {
      DistanceTarget::<MaxDistance>::visit_containing_shapes(&PointTarget::new(p), index, visitor)
    })
  }
}
