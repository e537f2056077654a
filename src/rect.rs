// src/rect.rs

//! Latitude-longitude rectangles.

use crate::cap::Cap;
use crate::cell::Cell;
use crate::cellid::CellId;
use crate::constants::{M_2PI, M_PI, M_PI_2};
use crate::edge::{crossing_sign, Crossing};
use crate::latlng::LatLng;
use crate::math::r1::Interval as R1Interval;
use crate::math::s1::{remainder, Angle, Interval as S1Interval};
use crate::point::Point;
use crate::region::Region;
use std::fmt;

/// Valid latitudes, `[-π/2, π/2]`.
const VALID_LAT: R1Interval = R1Interval::new(-M_PI_2, M_PI_2);

/// A closed rectangle in latitude-longitude space (radians).
///
/// The longitude interval may wrap through ±180 degrees. The poles are single points, so a
/// rectangle touching a pole should use [`Rect::polar_closure`] to include every longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  pub lat: R1Interval,
  pub lng: S1Interval,
}

impl Rect {
  #[inline]
  #[must_use]
  pub fn new(lat: R1Interval, lng: S1Interval) -> Rect {
    Rect { lat, lng }
  }

  #[must_use]
  pub fn empty() -> Rect {
    Rect { lat: R1Interval::empty(), lng: S1Interval::empty() }
  }

  #[must_use]
  pub fn full() -> Rect {
    Rect { lat: VALID_LAT, lng: S1Interval::full() }
  }

  #[must_use]
  pub fn from_lat_lng(ll: LatLng) -> Rect {
    Rect { lat: R1Interval::from_point(ll.lat), lng: S1Interval::new(ll.lng, ll.lng) }
  }

  /// Smallest rectangle containing both points.
  #[must_use]
  pub fn from_point_pair(a: LatLng, b: LatLng) -> Rect {
    Rect { lat: R1Interval::from_point_pair(a.lat, b.lat), lng: S1Interval::from_point_pair(a.lng, b.lng) }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    let lng_valid = self.lng.lo.abs() <= M_PI
      && self.lng.hi.abs() <= M_PI
      && !(self.lng.lo == -M_PI && self.lng.hi != M_PI)
      && !(self.lng.hi == -M_PI && self.lng.lo != M_PI);
    self.lat.lo.abs() <= M_PI_2
      && self.lat.hi.abs() <= M_PI_2
      && lng_valid
      && self.lat.is_empty() == self.lng.is_empty()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.lat.is_empty()
  }

  #[must_use]
  pub fn is_full(&self) -> bool {
    self.lat == VALID_LAT && self.lng.is_full()
  }

  #[must_use]
  pub fn is_point(&self) -> bool {
    self.lat.lo == self.lat.hi && self.lng.lo == self.lng.hi
  }

  #[must_use]
  pub fn lo(&self) -> LatLng {
    LatLng::new(self.lat.lo, self.lng.lo)
  }

  #[must_use]
  pub fn hi(&self) -> LatLng {
    LatLng::new(self.lat.hi, self.lng.hi)
  }

  #[must_use]
  pub fn center(&self) -> LatLng {
    LatLng::new(self.lat.center(), self.lng.center())
  }

  #[must_use]
  pub fn size(&self) -> LatLng {
    LatLng::new(self.lat.length(), self.lng.length())
  }

  /// Vertex `k` in CCW order: lower left, lower right, upper right, upper left.
  #[must_use]
  pub fn vertex(&self, k: usize) -> LatLng {
    match k & 3 {
      0 => LatLng::new(self.lat.lo, self.lng.lo),
      1 => LatLng::new(self.lat.lo, self.lng.hi),
      2 => LatLng::new(self.lat.hi, self.lng.hi),
      _ => LatLng::new(self.lat.hi, self.lng.lo),
    }
  }

  /// Surface area in steradians.
  #[must_use]
  pub fn area(&self) -> f64 {
    if self.is_empty() {
      return 0.0;
    }
    let cap_diff = (self.lat.hi.sin() - self.lat.lo.sin()).abs();
    self.lng.length() * cap_diff
  }

  #[must_use]
  pub fn add_point(&self, ll: LatLng) -> Rect {
    if !ll.is_valid() {
      return *self;
    }
    Rect { lat: self.lat.add_point(ll.lat), lng: self.lng.add_point(ll.lng) }
  }

  /// Rectangle grown by `margin` on each side, clamped to valid latitudes.
  #[must_use]
  pub fn expanded(&self, margin: LatLng) -> Rect {
    let lat = self.lat.expanded(margin.lat);
    let lng = self.lng.expanded(margin.lng);
    if lat.is_empty() || lng.is_empty() {
      return Rect::empty();
    }
    Rect { lat: lat.intersection(&VALID_LAT), lng }
  }

  /// Expands the longitude range to full if the rectangle touches a pole.
  #[must_use]
  pub fn polar_closure(&self) -> Rect {
    if self.lat.lo == -M_PI_2 || self.lat.hi == M_PI_2 {
      return Rect { lat: self.lat, lng: S1Interval::full() };
    }
    *self
  }

  #[must_use]
  pub fn union(&self, other: &Rect) -> Rect {
    Rect { lat: self.lat.union(&other.lat), lng: self.lng.union(&other.lng) }
  }

  #[must_use]
  pub fn contains(&self, other: &Rect) -> bool {
    self.lat.contains_interval(&other.lat) && self.lng.contains_interval(&other.lng)
  }

  #[must_use]
  pub fn intersects(&self, other: &Rect) -> bool {
    self.lat.intersects(&other.lat) && self.lng.intersects(&other.lng)
  }

  #[must_use]
  pub fn contains_lat_lng(&self, ll: LatLng) -> bool {
    ll.is_valid() && self.lat.contains(ll.lat) && self.lng.contains(ll.lng)
  }

  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    self.contains_lat_lng(LatLng::from_point(p))
  }

  /// Bounding cap: the smaller of a cap around the center and a cap around the nearer pole.
  #[must_use]
  pub fn cap_bound(&self) -> Cap {
    if self.is_empty() {
      return Cap::empty();
    }
    let (pole_z, pole_angle) = if self.lat.hi + self.lat.lo < 0.0 {
      (-1.0, M_PI_2 + self.lat.hi)
    } else {
      (1.0, M_PI_2 - self.lat.lo)
    };
    let pole_cap = Cap::from_center_angle(Point::from_coords(0.0, 0.0, pole_z), Angle(pole_angle));

    // For rectangles up to 180 degrees wide the widest extent is at a vertex; wider ones always
    // use the polar cap.
    let lng_span = self.lng.hi - self.lng.lo;
    if remainder(lng_span, M_2PI) >= 0.0 && lng_span < M_2PI {
      let mid_cap = Cap::from_point(self.center().to_point())
        .add_point(self.lo().to_point())
        .add_point(self.hi().to_point());
      if mid_cap.height() < pole_cap.height() {
        return mid_cap;
      }
    }
    pole_cap
  }

  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    *self
  }

  #[must_use]
  pub fn contains_cell(&self, cell: &Cell) -> bool {
    // The cell bound is conservative, so this may report false for contained cells near the
    // rectangle boundary.
    self.contains(&cell.rect_bound())
  }

  #[must_use]
  pub fn intersects_cell(&self, cell: &Cell) -> bool {
    if self.is_empty() {
      return false;
    }
    // One region containing a point of the other settles it; otherwise the boundaries must cross.
    if self.contains_point(Point(cell.id().to_point_raw())) {
      return true;
    }
    if cell.contains_point(self.center().to_point()) {
      return true;
    }
    if !self.intersects(&cell.rect_bound()) {
      return false;
    }

    let mut vertices = [Point::default(); 4];
    let mut latlngs = [LatLng::default(); 4];
    for i in 0..4 {
      vertices[i] = cell.vertex(i);
      latlngs[i] = LatLng::from_point(vertices[i]);
      if self.contains_lat_lng(latlngs[i]) {
        return true;
      }
      if cell.contains_point(self.vertex(i).to_point()) {
        return true;
      }
    }

    // Lines of constant longitude are geodesics; lines of constant latitude are not.
    for i in 0..4 {
      let edge_lng = S1Interval::new(latlngs[i].lng, latlngs[(i + 1) & 3].lng);
      if !self.lng.intersects(&edge_lng) {
        continue;
      }
      let a = vertices[i];
      let b = vertices[(i + 1) & 3];
      if edge_lng.contains(self.lng.lo) && intersects_lng_edge(a, b, self.lat, self.lng.lo) {
        return true;
      }
      if edge_lng.contains(self.lng.hi) && intersects_lng_edge(a, b, self.lat, self.lng.hi) {
        return true;
      }
      if intersects_lat_edge(a, b, self.lat.lo, self.lng) || intersects_lat_edge(a, b, self.lat.hi, self.lng) {
        return true;
      }
    }
    false
  }

  /// Covering of the rectangle's bounding cap.
  #[must_use]
  pub fn cell_union_bound(&self) -> Vec<CellId> {
    self.cap_bound().cell_union_bound()
  }

  #[must_use]
  pub fn approx_eq(&self, other: &Rect) -> bool {
    const EPSILON: f64 = 1e-15;
    (self.lat.lo - other.lat.lo).abs() < EPSILON
      && (self.lat.hi - other.lat.hi).abs() < EPSILON
      && (self.lng.lo - other.lng.lo).abs() < EPSILON
      && (self.lng.hi - other.lng.hi).abs() < EPSILON
  }
}

// Whether edge AB crosses the line of longitude `lng` within latitudes `lat`.
fn intersects_lng_edge(a: Point, b: Point, lat: R1Interval, lng: f64) -> bool {
  crossing_sign(a, b, LatLng::new(lat.lo, lng).to_point(), LatLng::new(lat.hi, lng).to_point())
    == Crossing::Cross
}

// Whether edge AB crosses the line of latitude `lat` within longitudes `lng`. A line of constant
// latitude can meet a great circle in zero, one, or two points.
fn intersects_lat_edge(a: Point, b: Point, lat: f64, lng: S1Interval) -> bool {
  // Normal of AB pointing vaguely north.
  let mut z = a.point_cross(b).normalize();
  if z.z() < 0.0 {
    z = -z;
  }
  // Frame (x, y, z) where x is the direction of maximum latitude on the great circle.
  let y = z.point_cross(Point::from_coords(0.0, 0.0, 1.0)).normalize();
  let x = y.cross(z);

  let sin_lat = lat.sin();
  if sin_lat.abs() >= x.z() {
    return false;
  }
  let cos_theta = sin_lat / x.z();
  let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
  let theta = sin_theta.atan2(cos_theta);

  let ab_theta = S1Interval::from_point_pair(a.dot(y).atan2(a.dot(x)), b.dot(y).atan2(b.dot(x)));
  if ab_theta.contains(theta) {
    let isect = x * cos_theta + y * sin_theta;
    if lng.contains(isect.y().atan2(isect.x())) {
      return true;
    }
  }
  if ab_theta.contains(-theta) {
    let isect = x * cos_theta - y * sin_theta;
    if lng.contains(isect.y().atan2(isect.x())) {
      return true;
    }
  }
  false
}

impl Region for Rect {
  fn cap_bound(&self) -> Cap {
    Rect::cap_bound(self)
  }

  fn rect_bound(&self) -> Rect {
    *self
  }

  fn contains_cell(&self, cell: &Cell) -> bool {
    Rect::contains_cell(self, cell)
  }

  fn intersects_cell(&self, cell: &Cell) -> bool {
    Rect::intersects_cell(self, cell)
  }

  fn contains_point(&self, p: Point) -> bool {
    Rect::contains_point(self, p)
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[Lo{}, Hi{}]", self.lo(), self.hi())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rect_deg(lat_lo: f64, lng_lo: f64, lat_hi: f64, lng_hi: f64) -> Rect {
    Rect::new(
      R1Interval::new(lat_lo.to_radians(), lat_hi.to_radians()),
      S1Interval::new(lng_lo.to_radians(), lng_hi.to_radians()),
    )
  }

  #[test]
  fn test_empty_and_full() {
    assert!(Rect::empty().is_valid() && Rect::empty().is_empty());
    assert!(Rect::full().is_valid() && Rect::full().is_full());
    assert!((Rect::full().area() - 4.0 * M_PI).abs() < 1e-14);
    assert_eq!(Rect::empty().area(), 0.0);
  }

  #[test]
  fn test_add_point_and_contains() {
    let r = Rect::empty()
      .add_point(LatLng::from_degrees(0.0, 0.0))
      .add_point(LatLng::from_degrees(10.0, 20.0));
    assert!(r.contains_lat_lng(LatLng::from_degrees(5.0, 10.0)));
    assert!(!r.contains_lat_lng(LatLng::from_degrees(11.0, 10.0)));
    assert!(r.contains_point(LatLng::from_degrees(5.0, 5.0).to_point()));
    // Wrapping longitude interval.
    let w = rect_deg(-10.0, 170.0, 10.0, -170.0);
    assert!(w.contains_lat_lng(LatLng::from_degrees(0.0, 180.0)));
    assert!(!w.contains_lat_lng(LatLng::from_degrees(0.0, 0.0)));
  }

  #[test]
  fn test_polar_closure_and_expanded() {
    let r = rect_deg(80.0, 10.0, 90.0, 20.0);
    assert!(r.polar_closure().lng.is_full());
    let e = rect_deg(0.0, 0.0, 10.0, 10.0).expanded(LatLng::from_degrees(85.0, 1.0));
    assert_eq!(e.lat.hi, M_PI_2);
    assert!((e.lat.lo + 85f64.to_radians()).abs() < 1e-15);
  }

  #[test]
  fn test_cap_bound_contains_vertices() {
    let rects = [rect_deg(-45.0, -45.0, 45.0, 45.0), rect_deg(70.0, 0.0, 80.0, 170.0), rect_deg(-80.0, -20.0, -70.0, 10.0)];
    for r in rects {
      let cap = r.cap_bound().expanded(Angle(1e-12));
      for k in 0..4 {
        assert!(cap.contains_point(r.vertex(k).to_point()), "{r} vertex {k}");
      }
    }
  }

  #[test]
  fn test_cells() {
    let r = rect_deg(-10.0, -10.0, 10.0, 10.0);
    let center = Cell::from_cell_id(CellId::from_point(Point::from_coords(1.0, 0.0, 0.0)).parent(10));
    assert!(r.contains_cell(&center));
    assert!(r.intersects_cell(&center));
    let face0 = Cell::from_cell_id(CellId::from_face(0));
    assert!(!r.contains_cell(&face0));
    assert!(r.intersects_cell(&face0));
    let face3 = Cell::from_cell_id(CellId::from_face(3));
    assert!(!r.intersects_cell(&face3));
    // A thin band crossing a face edge without containing any cell vertex or center.
    let band = rect_deg(-1.0, 40.0, 1.0, 50.0);
    assert!(band.intersects_cell(&face0));
  }
}
