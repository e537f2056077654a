// src/latlng.rs

//! Latitude/longitude coordinates and their conversion to points.

use crate::constants::{M_2PI, M_PI, M_PI_2};
use crate::math::s1::Angle;
use crate::point::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.007_180_918_475;

/// Latitude/longitude coordinates in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatLng {
  /// Latitude in radians.
  pub lat: f64,
  /// Longitude in radians.
  pub lng: f64,
}

impl LatLng {
  #[inline]
  #[must_use]
  pub const fn new(lat: f64, lng: f64) -> Self {
    Self { lat, lng }
  }

  #[inline]
  #[must_use]
  pub fn from_degrees(lat: f64, lng: f64) -> Self {
    Self { lat: lat.to_radians(), lng: lng.to_radians() }
  }

  /// Latitude and longitude of a point. The point need not be unit length.
  #[must_use]
  pub fn from_point(p: Point) -> Self {
    Self { lat: latitude(p).radians(), lng: longitude(p).radians() }
  }

  /// Unit point for these coordinates.
  #[must_use]
  pub fn to_point(self) -> Point {
    let phi = self.lat;
    let theta = self.lng;
    let cosphi = phi.cos();
    Point::from_coords(theta.cos() * cosphi, theta.sin() * cosphi, phi.sin())
  }

  /// Latitude within `[-π/2, π/2]` and longitude within `[-π, π]`.
  #[must_use]
  pub fn is_valid(self) -> bool {
    self.lat.abs() <= M_PI_2 && self.lng.abs() <= M_PI
  }

  /// Clamps latitude and wraps longitude into range.
  #[must_use]
  pub fn normalized(self) -> Self {
    let lat = self.lat.clamp(-M_PI_2, M_PI_2);
    let mut lng = crate::math::s1::remainder(self.lng, M_2PI);
    if lng == -M_PI {
      lng = M_PI;
    }
    Self { lat, lng }
  }

  /// Great circle distance using the haversine formula.
  #[must_use]
  pub fn distance(self, o: LatLng) -> Angle {
    let sin_lat_half = ((o.lat - self.lat) * 0.5).sin();
    let sin_lng_half = ((o.lng - self.lng) * 0.5).sin();
    let a = sin_lat_half * sin_lat_half + self.lat.cos() * o.lat.cos() * sin_lng_half * sin_lng_half;
    let a = a.clamp(0.0, 1.0);
    Angle(2.0 * a.sqrt().atan2((1.0 - a).sqrt()))
  }
}

impl fmt::Display for LatLng {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{:.7}, {:.7}]", self.lat.to_degrees(), self.lng.to_degrees())
  }
}

/// Latitude of a point.
#[must_use]
pub fn latitude(p: Point) -> Angle {
  Angle(p.z().atan2(p.x().hypot(p.y())))
}

/// Longitude of a point.
#[must_use]
pub fn longitude(p: Point) -> Angle {
  Angle(p.y().atan2(p.x()))
}

/// The great circle distance in kilometers between two coordinates on the Earth.
#[must_use]
pub fn great_circle_distance_km(a: LatLng, b: LatLng) -> f64 {
  a.distance(b).radians() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_round_trip_point() {
    for (lat, lng) in [(0.0, 0.0), (45.0, 90.0), (-89.9, -179.0), (37.7749, -122.4194)] {
      let ll = LatLng::from_degrees(lat, lng);
      let back = LatLng::from_point(ll.to_point());
      assert!((back.lat - ll.lat).abs() < 1e-14, "lat mismatch for {}", ll);
      assert!((back.lng - ll.lng).abs() < 1e-14, "lng mismatch for {}", ll);
    }
  }

  #[test]
  fn test_normalized() {
    let ll = LatLng::from_degrees(100.0, 190.0).normalized();
    assert!(ll.is_valid());
    assert!((ll.lat - M_PI_2).abs() < 1e-15);
    assert!((ll.lng.to_degrees() + 170.0).abs() < 1e-12);
  }

  #[test]
  fn test_distance() {
    let a = LatLng::from_degrees(0.0, 0.0);
    let b = LatLng::from_degrees(0.0, 90.0);
    assert!((a.distance(b).radians() - M_PI_2).abs() < 1e-15);
    assert!((great_circle_distance_km(a, b) - EARTH_RADIUS_KM * M_PI_2).abs() < 1e-9);
  }
}
