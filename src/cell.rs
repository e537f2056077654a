// src/cell.rs

//! Cells materialized as spherical quadrilaterals.

use crate::cap::Cap;
use crate::cellid::{face_ij_orientation, ij_level_to_bound_uv, lookup::POS_TO_IJ, lookup::POS_TO_ORIENTATION, CellId};
use crate::constants::{DBL_EPSILON, M_PI, M_PI_2, M_PI_4};
use crate::coords::{face_uv_to_xyz, face_xyz_to_uv, face_xyz_to_uvw, u_axis, u_norm, v_axis, v_norm};
use crate::edge::{update_max_distance, update_min_distance, Crossing, EdgeCrosser};
use crate::latlng::{latitude, longitude, LatLng};
use crate::math::r1::Interval as R1Interval;
use crate::math::r2::{Point as R2Point, Rect as R2Rect};
use crate::math::s1::{ChordAngle, Interval as S1Interval};
use crate::measures::point_area;
use crate::metric::AVG_AREA;
use crate::point::Point;
use crate::rect::Rect;
use crate::region::Region;

/// Lowest latitude reached by the polar face cells, at their vertices.
fn pole_min_lat() -> f64 {
  (1.0f64 / 3.0).sqrt().asin() - 0.5 * DBL_EPSILON
}

/// A cell with its face, level, orientation and (u,v) bound precomputed.
///
/// Vertices and edges are numbered counterclockwise starting from the lower-left corner in
/// (u,v) space: edge `k` runs from vertex `k` to vertex `k + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
  face: u8,
  level: i32,
  orientation: u8,
  id: CellId,
  uv: R2Rect,
}

impl Cell {
  #[must_use]
  pub fn from_cell_id(id: CellId) -> Cell {
    let (face, i, j, orientation) = face_ij_orientation(id);
    let level = id.level();
    Cell { face, level, orientation, id, uv: ij_level_to_bound_uv(i, j, level) }
  }

  /// The leaf cell containing `p`.
  #[must_use]
  pub fn from_point(p: Point) -> Cell {
    Cell::from_cell_id(CellId::from_point(p))
  }

  #[must_use]
  pub fn from_lat_lng(ll: LatLng) -> Cell {
    Cell::from_cell_id(CellId::from_lat_lng(ll))
  }

  #[inline]
  #[must_use]
  pub fn id(&self) -> CellId {
    self.id
  }

  #[inline]
  #[must_use]
  pub fn face(&self) -> u8 {
    self.face
  }

  #[inline]
  #[must_use]
  pub fn level(&self) -> i32 {
    self.level
  }

  #[inline]
  #[must_use]
  pub fn orientation(&self) -> u8 {
    self.orientation
  }

  #[inline]
  #[must_use]
  pub fn is_leaf(&self) -> bool {
    self.level == crate::constants::MAX_LEVEL
  }

  /// Edge length in (i,j) coordinates.
  #[must_use]
  pub fn size_ij(&self) -> i32 {
    crate::cellid::size_ij(self.level)
  }

  #[inline]
  #[must_use]
  pub fn bound_uv(&self) -> R2Rect {
    self.uv
  }

  /// Vertex `k`, normalized.
  #[must_use]
  pub fn vertex(&self, k: usize) -> Point {
    self.vertex_raw(k).normalize()
  }

  /// Vertex `k`, not necessarily unit length.
  #[must_use]
  pub fn vertex_raw(&self, k: usize) -> Point {
    let uv = self.uv.vertex(k);
    Point(face_uv_to_xyz(self.face, uv.x, uv.y))
  }

  /// Inward-facing normal of edge `k`, normalized.
  #[must_use]
  pub fn edge(&self, k: usize) -> Point {
    self.edge_raw(k).normalize()
  }

  /// Inward-facing normal of the great circle through edge `k`, not necessarily unit length.
  #[must_use]
  pub fn edge_raw(&self, k: usize) -> Point {
    match k & 3 {
      0 => Point(v_norm(self.face, self.uv.y.lo, false)),
      1 => Point(u_norm(self.face, self.uv.x.hi, false)),
      2 => Point(v_norm(self.face, self.uv.y.hi, true)),
      _ => Point(u_norm(self.face, self.uv.x.lo, true)),
    }
  }

  /// Center of the cell on the sphere. Not the centroid, but close to it.
  #[must_use]
  pub fn center(&self) -> Point {
    Point(self.id.to_point_raw()).normalize()
  }

  /// The four children, or `None` for leaf cells.
  #[must_use]
  pub fn children(&self) -> Option<[Cell; 4]> {
    if self.id.is_leaf() {
      return None;
    }
    let uv_mid = self.id.center_uv();
    let mut cid = self.id.child_begin();
    let mut children = [*self; 4];
    for (pos, child) in children.iter_mut().enumerate() {
      child.level = self.level + 1;
      child.orientation = self.orientation ^ POS_TO_ORIENTATION[pos];
      child.id = cid;
      // Which half of each axis the child takes follows from its (i,j) within the parent.
      let ij = POS_TO_IJ[self.orientation as usize][pos];
      let i = ij >> 1;
      let j = ij & 1;
      if i == 1 {
        child.uv.x = R1Interval::new(uv_mid.x, self.uv.x.hi);
      } else {
        child.uv.x = R1Interval::new(self.uv.x.lo, uv_mid.x);
      }
      if j == 1 {
        child.uv.y = R1Interval::new(uv_mid.y, self.uv.y.hi);
      } else {
        child.uv.y = R1Interval::new(self.uv.y.lo, uv_mid.y);
      }
      cid = cid.next();
    }
    Some(children)
  }

  /// Average area of cells at this level, in steradians.
  #[must_use]
  pub fn average_area(&self) -> f64 {
    AVG_AREA.value(self.level)
  }

  /// Area accurate to within 3% for all cells; faster than `exact_area`.
  #[must_use]
  pub fn approx_area(&self) -> f64 {
    if self.level < 2 {
      return self.average_area();
    }
    // Projected area from the diagonals, then corrected for curvature as if the cell were a cap.
    let flat_area =
      0.5 * (self.vertex(2) - self.vertex(0)).cross(self.vertex(3) - self.vertex(1)).norm();
    flat_area * 2.0 / (1.0 + (1.0 - (flat_area / M_PI).min(1.0)).sqrt())
  }

  /// Area of the spherical quadrilateral, in steradians.
  #[must_use]
  pub fn exact_area(&self) -> f64 {
    let v0 = self.vertex(0);
    let v1 = self.vertex(1);
    let v2 = self.vertex(2);
    let v3 = self.vertex(3);
    point_area(v0, v1, v2) + point_area(v0, v2, v3)
  }

  #[must_use]
  pub fn contains_cell(&self, other: &Cell) -> bool {
    self.id.contains(other.id)
  }

  #[must_use]
  pub fn intersects_cell(&self, other: &Cell) -> bool {
    self.id.intersects(other.id)
  }

  /// Whether `p` is in the cell. Points on the boundary belong to every cell sharing it, and
  /// `Cell::from_point(p).contains_point(p)` always holds.
  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    // Points on the opposite face or adjacent faces project outside the face square, except on
    // the shared boundary, which is wanted.
    let Some((u, v)) = face_xyz_to_uv(self.face, p.0) else {
      return false;
    };
    // Allow for the error of converting (u,v) to (s,t).
    self.uv.expanded_by_margin(DBL_EPSILON).contains_point(R2Point::new(u, v))
  }

  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    // The (u,v) center is close to the true center and cheaper.
    let c = self.uv.center();
    let mut cap = Cap::from_point(Point(face_uv_to_xyz(self.face, c.x, c.y)).normalize());
    for k in 0..4 {
      cap = cap.add_point(self.vertex(k));
    }
    cap
  }

  fn latitude_at(&self, i: usize, j: usize) -> f64 {
    let p = self.uv.vertex_ij(i, j);
    latitude(Point(face_uv_to_xyz(self.face, p.x, p.y))).radians()
  }

  fn longitude_at(&self, i: usize, j: usize) -> f64 {
    let p = self.uv.vertex_ij(i, j);
    longitude(Point(face_uv_to_xyz(self.face, p.x, p.y))).radians()
  }

  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    if self.level > 0 {
      // Below level 0 the extremes are at the vertices: one diagonal pair fixes the latitude
      // range and the other the longitude range. Pick the corner of largest |latitude|.
      let u = self.uv.x.lo + self.uv.x.hi;
      let v = self.uv.y.lo + self.uv.y.hi;
      let i = if u_axis(self.face).z == 0.0 { usize::from(u < 0.0) } else { usize::from(u > 0.0) };
      let j = if v_axis(self.face).z == 0.0 { usize::from(v < 0.0) } else { usize::from(v > 0.0) };
      let lat = R1Interval::from_point(self.latitude_at(i, j)).add_point(self.latitude_at(1 - i, 1 - j));
      let lng = S1Interval::empty()
        .add_point(self.longitude_at(i, 1 - j))
        .add_point(self.longitude_at(1 - i, j));
      // Cover the error of normalizing the vertices and converting to lat/lng.
      return Rect::new(lat, lng).expanded(LatLng::new(2.0 * DBL_EPSILON, 2.0 * DBL_EPSILON)).polar_closure();
    }

    // Face cells reach +/-45 degrees at their edge midpoints and the polar faces reach
    // +/-35.26 degrees at their vertices.
    let bound = match self.face {
      0 => Rect::new(R1Interval::new(-M_PI_4, M_PI_4), S1Interval::new(-M_PI_4, M_PI_4)),
      1 => Rect::new(R1Interval::new(-M_PI_4, M_PI_4), S1Interval::new(M_PI_4, 3.0 * M_PI_4)),
      2 => Rect::new(R1Interval::new(pole_min_lat(), M_PI_2), S1Interval::full()),
      3 => Rect::new(R1Interval::new(-M_PI_4, M_PI_4), S1Interval::new(3.0 * M_PI_4, -3.0 * M_PI_4)),
      4 => Rect::new(R1Interval::new(-M_PI_4, M_PI_4), S1Interval::new(-3.0 * M_PI_4, -M_PI_4)),
      _ => Rect::new(R1Interval::new(-M_PI_2, -pole_min_lat()), S1Interval::full()),
    };
    // Longitude comes from a single atan2 and needs no margin.
    bound.expanded(LatLng::new(DBL_EPSILON, 0.0))
  }

  /// Covering by this cell alone.
  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    vec![self.id]
  }

  // Whether the closest point of the u-edge at v = lo/hi to `p` lies between its endpoints.
  fn u_edge_is_closest(&self, p: Point, v_hi: bool) -> bool {
    let u0 = self.uv.x.lo;
    let u1 = self.uv.x.hi;
    let v = if v_hi { self.uv.y.hi } else { self.uv.y.lo };
    // Normals of the planes perpendicular to the edge through each endpoint.
    let dir0 = Point::from(crate::math::r3::Vector::new(v * v + 1.0, -u0 * v, -u0));
    let dir1 = Point::from(crate::math::r3::Vector::new(v * v + 1.0, -u1 * v, -u1));
    p.dot(dir0) > 0.0 && p.dot(dir1) < 0.0
  }

  fn v_edge_is_closest(&self, p: Point, u_hi: bool) -> bool {
    let v0 = self.uv.y.lo;
    let v1 = self.uv.y.hi;
    let u = if u_hi { self.uv.x.hi } else { self.uv.x.lo };
    let dir0 = Point::from(crate::math::r3::Vector::new(-u * v0, u * u + 1.0, -v0));
    let dir1 = Point::from(crate::math::r3::Vector::new(-u * v1, u * u + 1.0, -v1));
    p.dot(dir0) > 0.0 && p.dot(dir1) < 0.0
  }

  fn vertex_chord_dist(&self, p: Point, x_hi: bool, y_hi: bool) -> ChordAngle {
    let x = if x_hi { self.uv.x.hi } else { self.uv.x.lo };
    let y = if y_hi { self.uv.y.hi } else { self.uv.y.lo };
    p.chord_angle(Point::from_coords(x, y, 1.0))
  }

  fn distance_internal(&self, target_xyz: Point, to_interior: bool) -> ChordAngle {
    // Everything happens in the (u,v,w) frame of the cell's face.
    let target = face_xyz_to_uvw(self.face, target_xyz);

    // Dot products with the edge normals facing up or right. dirIJ is for axis I, endpoint J.
    let dir00 = target.x() - target.z() * self.uv.x.lo;
    let dir01 = target.x() - target.z() * self.uv.x.hi;
    let dir10 = target.y() - target.z() * self.uv.y.lo;
    let dir11 = target.y() - target.z() * self.uv.y.hi;
    let mut inside = true;
    if dir00 < 0.0 {
      inside = false;
      if self.v_edge_is_closest(target, false) {
        return edge_distance(-dir00, self.uv.x.lo);
      }
    }
    if dir01 > 0.0 {
      inside = false;
      if self.v_edge_is_closest(target, true) {
        return edge_distance(dir01, self.uv.x.hi);
      }
    }
    if dir10 < 0.0 {
      inside = false;
      if self.u_edge_is_closest(target, false) {
        return edge_distance(-dir10, self.uv.y.lo);
      }
    }
    if dir11 > 0.0 {
      inside = false;
      if self.u_edge_is_closest(target, true) {
        return edge_distance(dir11, self.uv.y.hi);
      }
    }
    if inside {
      if to_interior {
        return ChordAngle::ZERO;
      }
      // Projected cells are arbitrary quadrilaterals, so take the nearest of the four edges.
      return edge_distance(-dir00, self.uv.x.lo)
        .min(edge_distance(dir01, self.uv.x.hi))
        .min(edge_distance(-dir10, self.uv.y.lo))
        .min(edge_distance(dir11, self.uv.y.hi));
    }
    // Otherwise the closest point is a vertex.
    self
      .vertex_chord_dist(target, false, false)
      .min(self.vertex_chord_dist(target, true, false))
      .min(self.vertex_chord_dist(target, false, true))
      .min(self.vertex_chord_dist(target, true, true))
  }

  /// Distance from `target` to the cell, zero if the cell contains it.
  #[must_use]
  pub fn distance(&self, target: Point) -> ChordAngle {
    self.distance_internal(target, true)
  }

  /// Distance from `target` to the cell boundary.
  #[must_use]
  pub fn boundary_distance(&self, target: Point) -> ChordAngle {
    self.distance_internal(target, false)
  }

  /// Maximum distance from `target` to any point of the cell.
  #[must_use]
  pub fn max_distance(&self, target: Point) -> ChordAngle {
    let target_uvw = face_xyz_to_uvw(self.face, target);
    let max_dist = self
      .vertex_chord_dist(target_uvw, false, false)
      .max(self.vertex_chord_dist(target_uvw, true, false))
      .max(self.vertex_chord_dist(target_uvw, false, true))
      .max(self.vertex_chord_dist(target_uvw, true, true));
    if max_dist <= ChordAngle::RIGHT {
      return max_dist;
    }
    // Otherwise it is 180 degrees minus the distance to the antipode.
    ChordAngle::STRAIGHT - self.distance(-target)
  }

  /// Minimum distance from the edge AB to the cell.
  #[must_use]
  pub fn distance_to_edge(&self, a: Point, b: Point) -> ChordAngle {
    let mut min_dist = self.distance(a).min(self.distance(b));
    if min_dist.is_zero() {
      return min_dist;
    }
    let mut crosser = EdgeCrosser::new_chain(a, b, self.vertex(3));
    for i in 0..4 {
      if crosser.chain_crossing_sign(self.vertex(i)) != Crossing::DoNotCross {
        return ChordAngle::ZERO;
      }
    }
    // The remaining candidates are a cell vertex against the interior of AB.
    for i in 0..4 {
      update_min_distance(self.vertex(i), a, b, &mut min_dist);
    }
    min_dist
  }

  /// Maximum distance from the edge AB to the cell.
  #[must_use]
  pub fn max_distance_to_edge(&self, a: Point, b: Point) -> ChordAngle {
    let max_dist = self.max_distance(a).max(self.max_distance(b));
    if max_dist <= ChordAngle::RIGHT {
      return max_dist;
    }
    ChordAngle::STRAIGHT - self.distance_to_edge(-a, -b)
  }

  /// Minimum distance between the two cells. Cells sharing a boundary point are at distance 0.
  #[must_use]
  pub fn distance_to_cell(&self, target: &Cell) -> ChordAngle {
    if self.face == target.face && self.uv.intersects(&target.uv) {
      return ChordAngle::ZERO;
    }
    // The minimum is attained between a vertex of one cell and an edge of the other.
    let va: [Point; 4] = std::array::from_fn(|i| self.vertex(i));
    let vb: [Point; 4] = std::array::from_fn(|i| target.vertex(i));
    let mut min_dist = ChordAngle::infinity();
    for i in 0..4 {
      for j in 0..4 {
        update_min_distance(va[i], vb[j], vb[(j + 1) & 3], &mut min_dist);
        update_min_distance(vb[i], va[j], va[(j + 1) & 3], &mut min_dist);
      }
    }
    min_dist
  }

  /// Maximum distance between the two cells.
  #[must_use]
  pub fn max_distance_to_cell(&self, target: &Cell) -> ChordAngle {
    // The antipodal (u,v) rect is the transpose of the target's, read on the opposite face.
    let antipodal_uv = R2Rect::new(target.uv.y, target.uv.x);
    if self.face == (target.face + 3) % 6 && self.uv.intersects(&antipodal_uv) {
      return ChordAngle::STRAIGHT;
    }
    let va: [Point; 4] = std::array::from_fn(|i| self.vertex(i));
    let vb: [Point; 4] = std::array::from_fn(|i| target.vertex(i));
    let mut max_dist = ChordAngle::negative();
    for i in 0..4 {
      for j in 0..4 {
        update_max_distance(va[i], vb[j], vb[(j + 1) & 3], &mut max_dist);
        update_max_distance(vb[i], va[j], va[(j + 1) & 3], &mut max_dist);
      }
    }
    max_dist
  }
}

// Distance from a point to an edge given the dot product with the edge normal and the edge's
// (u or v) coordinate. XR^2 = XQ^2 + QR^2 where Q is the projection onto the edge's plane.
fn edge_distance(dir_ij: f64, uv: f64) -> ChordAngle {
  let pq2 = (dir_ij * dir_ij) / (1.0 + uv * uv);
  let qr = 1.0 - (1.0 - pq2).sqrt();
  ChordAngle::from_squared_length(pq2 + qr * qr)
}

impl Region for Cell {
  fn cap_bound(&self) -> Cap {
    Cell::cap_bound(self)
  }

  fn rect_bound(&self) -> Rect {
    Cell::rect_bound(self)
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    Cell::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    Cell::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    Cell::contains_point(self, p)
  }

  fn cell_union_bound(&self) -> Vec<CellId> {
    Cell::cell_union_bound(self)
  }
}
