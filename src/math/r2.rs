// src/math/r2.rs

//! Points and axis-aligned rectangles in ℝ².

use super::r1::Interval;
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in ℝ².
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  #[inline]
  #[must_use]
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// Counterclockwise orthogonal vector with the same norm.
  #[inline]
  #[must_use]
  pub fn ortho(self) -> Point {
    Point::new(-self.y, self.x)
  }

  #[inline]
  #[must_use]
  pub fn dot(self, o: Point) -> f64 {
    self.x * o.x + self.y * o.y
  }

  #[inline]
  #[must_use]
  pub fn cross(self, o: Point) -> f64 {
    self.x * o.y - self.y * o.x
  }

  #[inline]
  #[must_use]
  pub fn norm(self) -> f64 {
    self.x.hypot(self.y)
  }

  #[must_use]
  pub fn normalize(self) -> Point {
    if self.x == 0.0 && self.y == 0.0 {
      return self;
    }
    self * (1.0 / self.norm())
  }
}

impl Add for Point {
  type Output = Point;
  fn add(self, o: Point) -> Point {
    Point::new(self.x + o.x, self.y + o.y)
  }
}

impl Sub for Point {
  type Output = Point;
  fn sub(self, o: Point) -> Point {
    Point::new(self.x - o.x, self.y - o.y)
  }
}

impl Mul<f64> for Point {
  type Output = Point;
  fn mul(self, m: f64) -> Point {
    Point::new(self.x * m, self.y * m)
  }
}

/// A closed axis-aligned rectangle built from two intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  pub x: Interval,
  pub y: Interval,
}

impl Default for Rect {
  fn default() -> Self {
    Self::empty()
  }
}

impl Rect {
  #[inline]
  #[must_use]
  pub const fn new(x: Interval, y: Interval) -> Self {
    Self { x, y }
  }

  #[inline]
  #[must_use]
  pub const fn empty() -> Self {
    Self { x: Interval::empty(), y: Interval::empty() }
  }

  /// Smallest rectangle containing all of `points`.
  #[must_use]
  pub fn from_points(points: &[Point]) -> Rect {
    points.iter().fold(Rect::empty(), |r, p| r.add_point(*p))
  }

  #[must_use]
  pub fn from_center_size(center: Point, size: Point) -> Rect {
    Rect::new(
      Interval::new(center.x - 0.5 * size.x, center.x + 0.5 * size.x),
      Interval::new(center.y - 0.5 * size.y, center.y + 0.5 * size.y),
    )
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.x.is_empty()
  }

  #[inline]
  #[must_use]
  pub fn lo(&self) -> Point {
    Point::new(self.x.lo, self.y.lo)
  }

  #[inline]
  #[must_use]
  pub fn hi(&self) -> Point {
    Point::new(self.x.hi, self.y.hi)
  }

  #[must_use]
  pub fn center(&self) -> Point {
    Point::new(self.x.center(), self.y.center())
  }

  #[must_use]
  pub fn size(&self) -> Point {
    Point::new(self.x.length(), self.y.length())
  }

  /// Vertex `k` in CCW order starting from the lower-left corner.
  #[must_use]
  pub fn vertex(&self, k: usize) -> Point {
    match k & 3 {
      0 => Point::new(self.x.lo, self.y.lo),
      1 => Point::new(self.x.hi, self.y.lo),
      2 => Point::new(self.x.hi, self.y.hi),
      _ => Point::new(self.x.lo, self.y.hi),
    }
  }

  /// Vertex selected by `i` (0 for lo x, 1 for hi x) and `j` (likewise in y).
  #[must_use]
  pub fn vertex_ij(&self, i: usize, j: usize) -> Point {
    let x = if i == 0 { self.x.lo } else { self.x.hi };
    let y = if j == 0 { self.y.lo } else { self.y.hi };
    Point::new(x, y)
  }

  #[must_use]
  pub fn contains_point(&self, p: Point) -> bool {
    self.x.contains(p.x) && self.y.contains(p.y)
  }

  #[must_use]
  pub fn interior_contains_point(&self, p: Point) -> bool {
    self.x.interior_contains(p.x) && self.y.interior_contains(p.y)
  }

  #[must_use]
  pub fn contains(&self, o: &Rect) -> bool {
    self.x.contains_interval(&o.x) && self.y.contains_interval(&o.y)
  }

  #[must_use]
  pub fn intersects(&self, o: &Rect) -> bool {
    self.x.intersects(&o.x) && self.y.intersects(&o.y)
  }

  #[must_use]
  pub fn add_point(&self, p: Point) -> Rect {
    Rect::new(self.x.add_point(p.x), self.y.add_point(p.y))
  }

  #[must_use]
  pub fn add_rect(&self, o: &Rect) -> Rect {
    Rect::new(self.x.union(&o.x), self.y.union(&o.y))
  }

  #[must_use]
  pub fn intersection(&self, o: &Rect) -> Rect {
    let x = self.x.intersection(&o.x);
    let y = self.y.intersection(&o.y);
    if x.is_empty() || y.is_empty() {
      return Rect::empty();
    }
    Rect::new(x, y)
  }

  /// Rectangle grown by `margin` on all sides; empty if it shrinks past zero.
  #[must_use]
  pub fn expanded_by_margin(&self, margin: f64) -> Rect {
    let x = self.x.expanded(margin);
    let y = self.y.expanded(margin);
    if x.is_empty() || y.is_empty() {
      return Rect::empty();
    }
    Rect::new(x, y)
  }

  #[must_use]
  pub fn clamp_point(&self, p: Point) -> Point {
    Point::new(self.x.clamp_point(p.x), self.y.clamp_point(p.y))
  }
}
