// src/math/r1.rs

//! Closed intervals on the real line.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed interval `[lo, hi]` on ℝ. Any interval with `lo > hi` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
  pub lo: f64,
  pub hi: f64,
}

impl Interval {
  #[inline]
  #[must_use]
  pub const fn new(lo: f64, hi: f64) -> Self {
    Self { lo, hi }
  }

  /// The canonical empty interval.
  #[inline]
  #[must_use]
  pub const fn empty() -> Self {
    Self { lo: 1.0, hi: 0.0 }
  }

  #[inline]
  #[must_use]
  pub const fn from_point(p: f64) -> Self {
    Self { lo: p, hi: p }
  }

  /// Interval containing both points, in either order.
  #[must_use]
  pub fn from_point_pair(a: f64, b: f64) -> Self {
    if a <= b {
      Self::new(a, b)
    } else {
      Self::new(b, a)
    }
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.lo > self.hi
  }

  #[inline]
  #[must_use]
  pub fn center(&self) -> f64 {
    0.5 * (self.lo + self.hi)
  }

  /// Length of the interval. Negative for empty intervals.
  #[inline]
  #[must_use]
  pub fn length(&self) -> f64 {
    self.hi - self.lo
  }

  #[inline]
  #[must_use]
  pub fn contains(&self, p: f64) -> bool {
    self.lo <= p && p <= self.hi
  }

  #[inline]
  #[must_use]
  pub fn interior_contains(&self, p: f64) -> bool {
    self.lo < p && p < self.hi
  }

  #[must_use]
  pub fn contains_interval(&self, oi: &Interval) -> bool {
    if oi.is_empty() {
      return true;
    }
    self.lo <= oi.lo && oi.hi <= self.hi
  }

  #[must_use]
  pub fn intersects(&self, oi: &Interval) -> bool {
    if self.lo <= oi.lo {
      oi.lo <= self.hi && oi.lo <= oi.hi
    } else {
      self.lo <= oi.hi && self.lo <= self.hi
    }
  }

  #[must_use]
  pub fn interior_intersects(&self, oi: &Interval) -> bool {
    oi.lo < self.hi && self.lo < oi.hi && self.lo < self.hi && oi.lo <= oi.hi
  }

  #[must_use]
  pub fn intersection(&self, oi: &Interval) -> Interval {
    Interval::new(self.lo.max(oi.lo), self.hi.min(oi.hi))
  }

  #[must_use]
  pub fn union(&self, oi: &Interval) -> Interval {
    if self.is_empty() {
      return *oi;
    }
    if oi.is_empty() {
      return *self;
    }
    Interval::new(self.lo.min(oi.lo), self.hi.max(oi.hi))
  }

  /// Smallest interval containing this one and `p`.
  #[must_use]
  pub fn add_point(&self, p: f64) -> Interval {
    if self.is_empty() {
      Interval::from_point(p)
    } else if p < self.lo {
      Interval::new(p, self.hi)
    } else if p > self.hi {
      Interval::new(self.lo, p)
    } else {
      *self
    }
  }

  /// Closest point in the interval to `p`. The interval must be non-empty.
  #[must_use]
  pub fn clamp_point(&self, p: f64) -> f64 {
    self.lo.max(self.hi.min(p))
  }

  /// Interval grown on each side by `margin`. Negative margins shrink it.
  #[must_use]
  pub fn expanded(&self, margin: f64) -> Interval {
    if self.is_empty() {
      return *self;
    }
    Interval::new(self.lo - margin, self.hi + margin)
  }

  #[must_use]
  pub fn approx_eq(&self, other: &Interval, max_error: f64) -> bool {
    if self.is_empty() {
      return other.length() <= 2.0 * max_error;
    }
    if other.is_empty() {
      return self.length() <= 2.0 * max_error;
    }
    (other.lo - self.lo).abs() <= max_error && (other.hi - self.hi).abs() <= max_error
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_and_contains() {
    let e = Interval::empty();
    assert!(e.is_empty());
    let unit = Interval::new(0.0, 1.0);
    assert!(unit.contains(0.0) && unit.contains(1.0));
    assert!(!unit.interior_contains(0.0));
    assert!(unit.contains_interval(&e), "every interval contains the empty interval");
  }

  #[test]
  fn test_union_intersection() {
    let a = Interval::new(0.0, 2.0);
    let b = Interval::new(1.0, 3.0);
    assert_eq!(a.union(&b), Interval::new(0.0, 3.0));
    assert_eq!(a.intersection(&b), Interval::new(1.0, 2.0));
    assert!(a.intersects(&b));
    assert!(!a.interior_intersects(&Interval::new(2.0, 3.0)));
    assert_eq!(Interval::empty().add_point(5.0), Interval::from_point(5.0));
  }

  #[test]
  fn test_expanded_and_clamp() {
    let a = Interval::new(0.0, 1.0).expanded(0.5);
    assert_eq!(a, Interval::new(-0.5, 1.5));
    assert!(Interval::new(0.0, 1.0).expanded(-0.6).is_empty());
    assert_eq!(Interval::new(0.0, 1.0).clamp_point(7.0), 1.0);
  }
}
