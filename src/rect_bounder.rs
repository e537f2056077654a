// src/rect_bounder.rs

//! Latitude-longitude bounds of polylines and loops.

use crate::constants::{DBL_EPSILON, M_PI, M_PI_2};
use crate::latlng::LatLng;
use crate::math::r1::Interval as R1Interval;
use crate::math::r3::Vector;
use crate::math::s1::Interval as S1Interval;
use crate::point::Point;
use crate::rect::Rect;

/// Accumulates a bound for a chain of edges fed one vertex at a time.
///
/// The bound includes the whole geodesic between consecutive vertices, which can reach a
/// higher latitude than either endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RectBounder {
  a: Point,
  a_ll: LatLng,
  bound: Rect,
}

impl Default for RectBounder {
  fn default() -> Self {
    RectBounder::new()
  }
}

impl RectBounder {
  #[must_use]
  pub fn new() -> RectBounder {
    RectBounder { a: Point::default(), a_ll: LatLng::default(), bound: Rect::empty() }
  }

  /// Extends the bound with the edge from the previous point to `b`.
  pub fn add_point(&mut self, b: Point) {
    let b_ll = LatLng::from_point(b);
    if self.bound.is_empty() {
      self.a = b;
      self.a_ll = b_ll;
      self.bound = Rect::from_lat_lng(b_ll);
      return;
    }

    // Normal of the edge, computed stably. When it is tiny the endpoints are nearly equal or
    // nearly antipodal.
    let n = (self.a.0 - b.0).cross(self.a.0 + b.0);
    let n_norm = n.norm();
    if n_norm < 1.913_46e-15 {
      if self.a.dot(b) < 0.0 {
        self.bound = Rect::full();
      } else {
        self.bound = self.bound.union(&Rect::from_point_pair(self.a_ll, b_ll));
      }
      self.a = b;
      self.a_ll = b_ll;
      return;
    }

    // The longitude span is the shorter way around unless the edge is nearly a half circle.
    let mut lng_ab = S1Interval::empty().add_point(self.a_ll.lng).add_point(b_ll.lng);
    if lng_ab.length() >= M_PI - 2.0 * DBL_EPSILON {
      lng_ab = S1Interval::full();
    }

    // The latitude extremes are at the endpoints unless the edge crosses the plane through
    // the normal and the z-axis, where the maximum (or minimum) latitude of the great circle
    // lies.
    let mut lat_ab = R1Interval::from_point(self.a_ll.lat).add_point(b_ll.lat);
    let m = n.cross(Vector::new(0.0, 0.0, 1.0));
    let m_a = m.dot(self.a.0);
    let m_b = m.dot(b.0);
    let m_error = 6.066_38e-16 * n_norm + 6.831_74e-31;
    if m_a * m_b < 0.0 || m_a.abs() <= m_error || m_b.abs() <= m_error {
      let max_lat = ((n.x * n.x + n.y * n.y).sqrt().atan2(n.z.abs()) + 3.0 * DBL_EPSILON).min(M_PI_2);
      // Bound the extra latitude by the chord length so nearly degenerate edges stay tight.
      let lat_budget = 2.0 * (0.5 * (self.a.0 - b.0).norm() * max_lat.sin()).asin();
      let max_delta = 0.5 * (lat_budget - lat_ab.length()) + DBL_EPSILON;
      if m_a <= m_error && m_b >= -m_error {
        lat_ab.hi = max_lat.min(lat_ab.hi + max_delta);
      }
      if m_b <= m_error && m_a >= -m_error {
        lat_ab.lo = (-max_lat).max(lat_ab.lo - max_delta);
      }
    }
    self.a = b;
    self.a_ll = b_ll;
    self.bound = self.bound.union(&Rect::new(lat_ab, lng_ab));
  }

  /// The accumulated bound, padded for the error of the latitude computation.
  #[must_use]
  pub fn rect_bound(&self) -> Rect {
    self.bound.expanded(LatLng::new(2.0 * DBL_EPSILON, 0.0)).polar_closure()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_edge_bulges_past_endpoints() {
    // Both endpoints are at 45 degrees north, but the edge between them passes near the pole.
    let a = LatLng::from_degrees(45.0, 0.0).to_point();
    let b = LatLng::from_degrees(45.0, 170.0).to_point();
    let mut bounder = RectBounder::new();
    bounder.add_point(a);
    bounder.add_point(b);
    let bound = bounder.rect_bound();
    assert!(bound.lat.hi > 80f64.to_radians());
    assert!(bound.lat.lo <= 45f64.to_radians());
    assert!(bound.contains_point(a) && bound.contains_point(b));
  }

  #[test]
  fn test_equator_edge_is_flat() {
    let mut bounder = RectBounder::new();
    bounder.add_point(LatLng::from_degrees(0.0, 10.0).to_point());
    bounder.add_point(LatLng::from_degrees(0.0, 20.0).to_point());
    let bound = bounder.rect_bound();
    assert!(bound.lat.hi < 1e-14 && bound.lat.lo > -1e-14);
    assert!((bound.lng.lo - 10f64.to_radians()).abs() < 1e-15);
  }

  #[test]
  fn test_antipodal_points_give_full() {
    let mut bounder = RectBounder::new();
    let p = Point::from_coords(1.0, 0.0, 0.0);
    bounder.add_point(p);
    bounder.add_point(-p);
    assert!(bounder.rect_bound().is_full());
  }
}
