// src/cap.rs

//! Spherical caps: discs on the sphere bounded by a circle.

use crate::cell::Cell;
use crate::cellid::CellId;
use crate::constants::{DBL_EPSILON, M_2PI, M_PI, M_PI_2, NUM_FACES};
use crate::latlng::{latitude, longitude};
use crate::math::r1::Interval as R1Interval;
use crate::math::s1::{remainder, Angle, ChordAngle, Interval as S1Interval};
use crate::metric::MIN_WIDTH;
use crate::point::Point;
use crate::rect::Rect;
use crate::region::Region;
use std::fmt;

/// A disc-shaped region: all points within `radius` of `center`.
///
/// The radius is stored as a chord angle, so containment tests need no trigonometry.
/// An empty cap has a negative radius and a full cap a radius of 180 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cap {
  center: Point,
  radius: ChordAngle,
}

impl Cap {
  /// A cap containing only `p`.
  #[must_use]
  pub fn from_point(p: Point) -> Cap {
    Cap { center: p, radius: ChordAngle::ZERO }
  }

  /// A cap with the given center and angular radius. Radii above 180 degrees are clamped.
  #[must_use]
  pub fn from_center_angle(center: Point, angle: Angle) -> Cap {
    Cap { center, radius: ChordAngle::from_angle(Angle(angle.radians().min(M_PI))) }
  }

  #[must_use]
  pub fn from_center_chord_angle(center: Point, radius: ChordAngle) -> Cap {
    Cap { center, radius }
  }

  /// A cap with the given height `h = 1 - cos(radius)`. Negative heights yield an empty cap.
  #[must_use]
  pub fn from_center_height(center: Point, height: f64) -> Cap {
    Cap::from_center_chord_angle(center, ChordAngle::from_squared_length(2.0 * height))
  }

  /// A cap with the given surface area in steradians.
  #[must_use]
  pub fn from_center_area(center: Point, area: f64) -> Cap {
    Cap::from_center_height(center, area / M_2PI)
  }

  #[must_use]
  pub fn empty() -> Cap {
    Cap { center: Point::from_coords(1.0, 0.0, 0.0), radius: ChordAngle::negative() }
  }

  #[must_use]
  pub fn full() -> Cap {
    Cap { center: Point::from_coords(1.0, 0.0, 0.0), radius: ChordAngle::STRAIGHT }
  }

  #[inline]
  #[must_use]
  pub fn center(&self) -> Point {
    self.center
  }

  #[inline]
  #[must_use]
  pub fn chord_radius(&self) -> ChordAngle {
    self.radius
  }

  #[must_use]
  pub fn radius(&self) -> Angle {
    self.radius.to_angle()
  }

  /// Height of the cap along its axis: `1 - cos(radius)`.
  #[must_use]
  pub fn height(&self) -> f64 {
    0.5 * self.radius.length2()
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.center.is_unit() && self.radius <= ChordAngle::STRAIGHT
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.radius.is_negative()
  }

  #[must_use]
  pub fn is_full(&self) -> bool {
    self.radius == ChordAngle::STRAIGHT
  }

  #[must_use]
  pub fn area(&self) -> f64 {
    M_2PI * self.height().max(0.0)
  }

  /// The closure of the set of points not in this cap.
  #[must_use]
  pub fn complement(&self) -> Cap {
    if self.is_full() {
      return Cap::empty();
    }
    if self.is_empty() {
      return Cap::full();
    }
    Cap { center: -self.center, radius: ChordAngle::from_squared_length(4.0 - self.radius.length2()) }
  }

  #[must_use]
  pub fn contains(&self, other: &Cap) -> bool {
    if self.is_full() || other.is_empty() {
      return true;
    }
    self.radius >= self.center.chord_angle(other.center) + other.radius
  }

  #[must_use]
  pub fn intersects(&self, other: &Cap) -> bool {
    if self.is_empty() || other.is_empty() {
      return false;
    }
    self.radius + other.radius >= self.center.chord_angle(other.center)
  }

  #[must_use]
  pub fn interior_intersects(&self, other: &Cap) -> bool {
    if self.radius.length2() <= 0.0 || other.is_empty() {
      return false;
    }
    self.radius + other.radius > self.center.chord_angle(other.center)
  }

  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    self.center.chord_angle(p) <= self.radius
  }

  #[must_use]
  pub fn interior_contains_point(&self, p: Point) -> bool {
    self.is_full() || self.center.chord_angle(p) < self.radius
  }

  /// Smallest cap containing this cap and `p`.
  #[must_use]
  pub fn add_point(&self, p: Point) -> Cap {
    if self.is_empty() {
      return Cap::from_point(p);
    }
    Cap { center: self.center, radius: self.radius.max(self.center.chord_angle(p)) }
  }

  /// Smallest cap with this center containing both caps.
  #[must_use]
  pub fn add_cap(&self, other: &Cap) -> Cap {
    if self.is_empty() {
      return *other;
    }
    if other.is_empty() {
      return *self;
    }
    // Round up so that `other` is really contained.
    let dist = self.center.chord_angle(other.center) + other.radius;
    let expanded = dist.expanded(DBL_EPSILON * dist.length2());
    Cap { center: self.center, radius: self.radius.max(expanded) }
  }

  /// This cap grown by `distance`. Empty caps stay empty.
  #[must_use]
  pub fn expanded(&self, distance: Angle) -> Cap {
    if self.is_empty() {
      return Cap::empty();
    }
    Cap { center: self.center, radius: self.radius + ChordAngle::from_angle(distance) }
  }

  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    *self
  }

  /// Latitude-longitude bound of the cap.
  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    if self.is_empty() {
      return Rect::empty();
    }
    let cap_angle = self.radius().radians();
    let center_lat = latitude(self.center).radians();
    let mut all_longitudes = false;
    let mut lat = R1Interval::new(center_lat - cap_angle, center_lat + cap_angle);
    let mut lng = S1Interval::full();

    if lat.lo <= -M_PI_2 {
      lat.lo = -M_PI_2;
      all_longitudes = true;
    }
    if lat.hi >= M_PI_2 {
      lat.hi = M_PI_2;
      all_longitudes = true;
    }
    if !all_longitudes {
      // In the right spherical triangle (pole, center, tangent point) the law of sines gives
      // sin(dlng) = sin(radius) / cos(lat).
      let sin_a = self.radius.sin();
      let sin_c = center_lat.cos();
      if sin_a <= sin_c {
        let angle_a = (sin_a / sin_c).asin();
        let center_lng = longitude(self.center).radians();
        lng = S1Interval::new(remainder(center_lng - angle_a, M_2PI), remainder(center_lng + angle_a, M_2PI));
      }
    }
    Rect::new(lat, lng)
  }

  #[must_use]
  pub fn contains_cell(&self, cell: &Cell) -> bool {
    let mut vertices = [Point::default(); 4];
    for (k, v) in vertices.iter_mut().enumerate() {
      *v = cell.vertex(k);
      if !self.contains_point(*v) {
        return false;
      }
    }
    // All vertices are inside; the cell is contained unless the complement reaches in.
    !self.complement().intersects_cell_edges(cell, &vertices)
  }

  #[must_use]
  pub fn intersects_cell(&self, cell: &Cell) -> bool {
    let mut vertices = [Point::default(); 4];
    for (k, v) in vertices.iter_mut().enumerate() {
      *v = cell.vertex(k);
      if self.contains_point(*v) {
        return true;
      }
    }
    self.intersects_cell_edges(cell, &vertices)
  }

  // Whether the cap intersects the cell anywhere except its vertices, which the caller has
  // already tested.
  fn intersects_cell_edges(&self, cell: &Cell, vertices: &[Point; 4]) -> bool {
    // A hemisphere or larger cap has a convex complement; with no vertex inside, nothing is.
    if self.radius >= ChordAngle::RIGHT || self.is_empty() {
      return false;
    }
    if cell.contains_point(self.center) {
      return true;
    }
    // The only remaining way in is through the interior of an edge.
    let sin2_angle = self.radius.sin2();
    for k in 0..4 {
      let edge = cell.edge_raw(k).0;
      let dot = self.center.0.dot(edge);
      if dot > 0.0 {
        // The center is on the inside of this edge; the opposite edge is the one to check.
        continue;
      }
      if dot * dot > sin2_angle * edge.norm2() {
        return false;
      }
      let dir = edge.cross(self.center.0);
      if dir.dot(vertices[k].0) < 0.0 && dir.dot(vertices[(k + 1) & 3].0) > 0.0 {
        return true;
      }
    }
    false
  }

  /// A small set of cells covering the cap: the 4 cells around the cell vertex nearest the
  /// center, or all 6 faces for very large caps.
  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    // The largest level at which the cap contains at most one cell vertex.
    let level = MIN_WIDTH.max_level(self.radius().radians()) - 1;
    if level < 0 {
      return (0..NUM_FACES).map(CellId::from_face).collect();
    }
    CellId::from_point(self.center).vertex_neighbors(level)
  }

  #[must_use]
  pub fn approx_eq(&self, other: &Cap) -> bool {
    const EPSILON: f64 = 1e-14;
    let r2 = self.radius.length2();
    let or2 = other.radius.length2();
    (self.center.approx_eq_within(other.center, Angle(EPSILON)) && (r2 - or2).abs() <= EPSILON)
      || (self.is_empty() && or2 <= EPSILON)
      || (other.is_empty() && r2 <= EPSILON)
      || (self.is_full() && or2 >= 2.0 - EPSILON)
      || (other.is_full() && r2 >= 2.0 - EPSILON)
  }
}

impl Region for Cap {
  fn cap_bound(&self) -> Cap {
    *self
  }

  fn rect_bound(&self) -> Rect {
    Cap::rect_bound(self)
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    Cap::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    Cap::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    Cap::contains_point(self, p)
  }

  fn cell_union_bound(&self) -> Vec<CellId> {
    Cap::cell_union_bound(self)
  }
}

impl fmt::Display for Cap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[Center={:?}, Radius={:.7}]", self.center.0, self.radius().degrees())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::latlng::LatLng;

  fn p(x: f64, y: f64, z: f64) -> Point {
    Point::from_coords(x, y, z)
  }

  #[test]
  fn test_basic_caps() {
    let empty = Cap::empty();
    let full = Cap::full();
    assert!(empty.is_valid() && empty.is_empty() && !empty.is_full());
    assert!(full.is_valid() && full.is_full() && !full.is_empty());
    assert_eq!(empty.area(), 0.0);
    assert!((full.area() - 4.0 * M_PI).abs() < 1e-15);
    assert!(empty.complement().is_full());
    assert!(full.complement().is_empty());

    let xaxis = Cap::from_point(p(1.0, 0.0, 0.0));
    assert!(xaxis.contains_point(p(1.0, 0.0, 0.0)));
    assert!(!xaxis.contains_point(p(1.0, 1e-6, 0.0)));
    assert_eq!(xaxis.radius().radians(), 0.0);
  }

  #[test]
  fn test_hemisphere() {
    let hemi = Cap::from_center_height(p(1.0, 0.0, 1.0), 1.0);
    assert!((hemi.complement().center().0 - (-hemi.center()).0).norm() < 1e-15);
    assert!((hemi.complement().height() - 1.0).abs() < 1e-15);
    assert!(hemi.contains_point(p(1.0, 0.0, -(1.0 - 1e-10))));
    assert!(!hemi.contains_point(p(1.0, 0.0, -(1.0 + 1e-10))));
    assert!(hemi.contains_point(p(1.0, 0.0, 1.0)));
  }

  #[test]
  fn test_add_point_and_cap() {
    let c = Cap::empty().add_point(p(1.0, 0.0, 0.0));
    assert_eq!(c.chord_radius(), ChordAngle::ZERO);
    let c = c.add_point(p(0.0, 1.0, 0.0));
    assert!((c.radius().degrees() - 90.0).abs() < 1e-12);
    let other = Cap::from_center_angle(p(0.0, 0.0, 1.0), Angle::from_degrees(10.0));
    let u = c.add_cap(&other);
    assert!(u.contains(&other));
    assert!(u.contains(&c));
  }

  #[test]
  fn test_rect_bound() {
    // Cap around the north pole covers all longitudes.
    let polar = Cap::from_center_angle(p(0.0, 0.0, 1.0), Angle::from_degrees(10.0));
    let r = polar.rect_bound();
    assert!(r.lng.is_full());
    assert!((r.lat.hi - M_PI_2).abs() < 1e-15);
    assert!((r.lat.lo - Angle::from_degrees(80.0).radians()).abs() < 1e-13);

    // Cap on the equator spans +/- its radius in longitude.
    let eq = Cap::from_center_angle(LatLng::from_degrees(0.0, 50.0).to_point(), Angle::from_degrees(20.0));
    let r = eq.rect_bound();
    assert!((r.lng.lo - Angle::from_degrees(30.0).radians()).abs() < 1e-13);
    assert!((r.lng.hi - Angle::from_degrees(70.0).radians()).abs() < 1e-13);
  }

  #[test]
  fn test_cells() {
    let face0 = Cell::from_cell_id(CellId::from_face(0));
    let tiny = Cap::from_center_angle(p(1.0, 0.0, 0.0), Angle::from_degrees(0.1));
    assert!(tiny.intersects_cell(&face0));
    assert!(!tiny.contains_cell(&face0));
    let big = Cap::from_center_angle(p(1.0, 0.0, 0.0), Angle::from_degrees(80.0));
    assert!(big.contains_cell(&face0));
    let opposite = Cap::from_center_angle(p(-1.0, 0.0, 0.0), Angle::from_degrees(10.0));
    assert!(!opposite.intersects_cell(&face0));
    assert!(Cap::full().contains_cell(&face0));
    assert!(!Cap::empty().intersects_cell(&face0));
  }

  #[test]
  fn test_cell_union_bound() {
    let tiny = Cap::from_center_angle(p(1.0, 0.2, 0.3), Angle::from_degrees(0.01));
    let cover = tiny.cell_union_bound();
    assert!(!cover.is_empty() && cover.len() <= 4);
    let c = CellId::from_point(tiny.center());
    assert!(cover.iter().any(|id| id.contains(c)));
    assert_eq!(Cap::full().cell_union_bound().len(), 6);
  }
}
