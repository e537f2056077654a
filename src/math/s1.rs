// src/math/s1.rs

//! One-dimensional spherical quantities: angles, chord angles and circular intervals.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

/// Machine epsilon of f64 (2^-52).
pub const DBL_EPSILON: f64 = f64::EPSILON;
/// Rounding error of a single f64 operation (2^-53).
pub const DBL_ERROR: f64 = f64::EPSILON / 2.0;

/// An angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Angle(pub f64);

impl Angle {
  #[inline]
  #[must_use]
  pub const fn from_radians(r: f64) -> Self {
    Self(r)
  }

  #[inline]
  #[must_use]
  pub fn from_degrees(d: f64) -> Self {
    Self(d.to_radians())
  }

  #[inline]
  #[must_use]
  pub const fn radians(self) -> f64 {
    self.0
  }

  #[inline]
  #[must_use]
  pub fn degrees(self) -> f64 {
    self.0.to_degrees()
  }

  #[must_use]
  pub fn abs(self) -> Angle {
    Angle(self.0.abs())
  }

  /// Equivalent angle in `(-π, π]`.
  #[must_use]
  pub fn normalized(self) -> Angle {
    let mut rad = self.0 % (2.0 * PI);
    if rad <= -PI {
      rad += 2.0 * PI;
    } else if rad > PI {
      rad -= 2.0 * PI;
    }
    Angle(rad)
  }

  #[must_use]
  pub fn infinity() -> Angle {
    Angle(f64::INFINITY)
  }
}

impl Add for Angle {
  type Output = Angle;
  fn add(self, o: Angle) -> Angle {
    Angle(self.0 + o.0)
  }
}

impl Sub for Angle {
  type Output = Angle;
  fn sub(self, o: Angle) -> Angle {
    Angle(self.0 - o.0)
  }
}

impl Mul<f64> for Angle {
  type Output = Angle;
  fn mul(self, m: f64) -> Angle {
    Angle(self.0 * m)
  }
}

impl Neg for Angle {
  type Output = Angle;
  fn neg(self) -> Angle {
    Angle(-self.0)
  }
}

/// Maximum value of a chord angle: two points at opposite ends of a diameter.
pub const MAX_LENGTH2: f64 = 4.0;

/// The angle between two points on the unit sphere, stored as the squared chord length.
///
/// Comparisons are exact and cheap, which makes this the distance type of every query.
/// Values are in `[0, 4]` except the `negative` and `infinity` sentinels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChordAngle(pub f64);

impl ChordAngle {
  pub const ZERO: ChordAngle = ChordAngle(0.0);
  pub const RIGHT: ChordAngle = ChordAngle(2.0);
  pub const STRAIGHT: ChordAngle = ChordAngle(MAX_LENGTH2);

  /// Smaller than every valid chord angle.
  #[must_use]
  pub const fn negative() -> ChordAngle {
    ChordAngle(-1.0)
  }

  /// Larger than every valid chord angle.
  #[must_use]
  pub const fn infinity() -> ChordAngle {
    ChordAngle(f64::INFINITY)
  }

  #[must_use]
  pub fn from_angle(a: Angle) -> ChordAngle {
    if a.0 < 0.0 {
      return ChordAngle::negative();
    }
    if a.0.is_infinite() {
      return ChordAngle::infinity();
    }
    let l = 2.0 * (0.5 * a.0.min(PI)).sin();
    ChordAngle(l * l)
  }

  /// Chord angle from a squared chord length, clamped to `[0, 4]`.
  #[must_use]
  pub fn from_squared_length(length2: f64) -> ChordAngle {
    ChordAngle(length2.min(MAX_LENGTH2))
  }

  #[inline]
  #[must_use]
  pub const fn length2(self) -> f64 {
    self.0
  }

  #[must_use]
  pub fn to_angle(self) -> Angle {
    if self.0 < 0.0 {
      return Angle(-1.0);
    }
    if self.is_infinity() {
      return Angle::infinity();
    }
    Angle(2.0 * (0.5 * self.0.sqrt()).asin())
  }

  #[must_use]
  pub fn is_zero(self) -> bool {
    self.0 == 0.0
  }

  #[must_use]
  pub fn is_negative(self) -> bool {
    self.0 < 0.0
  }

  #[must_use]
  pub fn is_infinity(self) -> bool {
    self.0.is_infinite()
  }

  #[must_use]
  pub fn is_special(self) -> bool {
    self.is_negative() || self.is_infinity()
  }

  #[must_use]
  pub fn is_valid(self) -> bool {
    (self.0 >= 0.0 && self.0 <= MAX_LENGTH2) || self.is_special()
  }

  /// Smallest representable chord angle larger than this one.
  #[must_use]
  pub fn successor(self) -> ChordAngle {
    if self.0 >= MAX_LENGTH2 {
      return ChordAngle::infinity();
    }
    if self.0 < 0.0 {
      return ChordAngle::ZERO;
    }
    ChordAngle(next_after(self.0, 10.0))
  }

  /// Largest representable chord angle smaller than this one.
  #[must_use]
  pub fn predecessor(self) -> ChordAngle {
    if self.0 <= 0.0 {
      return ChordAngle::negative();
    }
    if self.0 > MAX_LENGTH2 {
      return ChordAngle::STRAIGHT;
    }
    ChordAngle(next_after(self.0, -10.0))
  }

  /// Maximum error in `length2` for a chord angle computed with `Point::chord_angle`.
  #[must_use]
  pub fn max_point_error(self) -> f64 {
    4.5 * DBL_EPSILON * self.0 + 16.0 * DBL_EPSILON * DBL_EPSILON
  }

  /// Maximum error in `length2` for a chord angle constructed from an `Angle`.
  #[must_use]
  pub fn max_angle_error(self) -> f64 {
    DBL_EPSILON * self.0
  }

  /// Chord angle adjusted by `e` in `length2`, clamped to `[0, 4]`. Special values are unchanged.
  #[must_use]
  pub fn expanded(self, e: f64) -> ChordAngle {
    if self.is_special() {
      return self;
    }
    ChordAngle((self.0 + e).clamp(0.0, MAX_LENGTH2))
  }

  #[must_use]
  pub fn sin2(self) -> f64 {
    self.0 * (1.0 - 0.25 * self.0)
  }

  #[must_use]
  pub fn sin(self) -> f64 {
    self.sin2().sqrt()
  }

  #[must_use]
  pub fn cos(self) -> f64 {
    1.0 - 0.5 * self.0
  }
}

impl ChordAngle {
  #[inline]
  #[must_use]
  pub fn min(self, o: ChordAngle) -> ChordAngle {
    if o.0 < self.0 {
      o
    } else {
      self
    }
  }

  #[inline]
  #[must_use]
  pub fn max(self, o: ChordAngle) -> ChordAngle {
    if o.0 > self.0 {
      o
    } else {
      self
    }
  }
}

impl Add for ChordAngle {
  type Output = ChordAngle;

  /// Sum of two chord angles, saturating at a straight angle.
  fn add(self, other: ChordAngle) -> ChordAngle {
    if other.0 == 0.0 {
      return self;
    }
    if self.0 + other.0 >= MAX_LENGTH2 {
      return ChordAngle::STRAIGHT;
    }
    let x = self.0 * (1.0 - 0.25 * other.0);
    let y = other.0 * (1.0 - 0.25 * self.0);
    ChordAngle((x + y + 2.0 * (x * y).sqrt()).min(MAX_LENGTH2))
  }
}

impl Sub for ChordAngle {
  type Output = ChordAngle;

  /// Difference of two chord angles, saturating at zero.
  fn sub(self, other: ChordAngle) -> ChordAngle {
    if other.0 == 0.0 {
      return self;
    }
    if self.0 <= other.0 {
      return ChordAngle::ZERO;
    }
    let x = self.0 * (1.0 - 0.25 * other.0);
    let y = other.0 * (1.0 - 0.25 * self.0);
    ChordAngle((x + y - 2.0 * (x * y).sqrt()).max(0.0))
  }
}

fn next_after(x: f64, toward: f64) -> f64 {
  if x == toward || x.is_nan() {
    return x;
  }
  if x == 0.0 {
    return if toward > 0.0 { f64::from_bits(1) } else { -f64::from_bits(1) };
  }
  let bits = x.to_bits();
  let up = (toward > x) == (x > 0.0);
  f64::from_bits(if up { bits + 1 } else { bits - 1 })
}

/// A closed interval on the unit circle, used for longitudes.
///
/// Points are in `[-π, π]`. An interval with `lo > hi` wraps through ±π ("inverted").
/// The full interval is `[-π, π]` and the empty interval is `[π, -π]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
  pub lo: f64,
  pub hi: f64,
}

impl Interval {
  /// Interval from endpoints; an endpoint of -π is treated as π unless both are -π.
  #[must_use]
  pub fn new(lo: f64, hi: f64) -> Self {
    let mut i = Self { lo, hi };
    if lo == -PI && hi != PI {
      i.lo = PI;
    }
    if hi == -PI && lo != PI {
      i.hi = PI;
    }
    i
  }

  #[must_use]
  pub const fn empty() -> Self {
    Self { lo: PI, hi: -PI }
  }

  #[must_use]
  pub const fn full() -> Self {
    Self { lo: -PI, hi: PI }
  }

  #[must_use]
  pub fn is_full(&self) -> bool {
    self.lo == -PI && self.hi == PI
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.lo == PI && self.hi == -PI
  }

  #[must_use]
  pub fn is_inverted(&self) -> bool {
    self.lo > self.hi
  }

  /// Smallest interval containing both points.
  #[must_use]
  pub fn from_point_pair(mut a: f64, mut b: f64) -> Self {
    if a == -PI {
      a = PI;
    }
    if b == -PI {
      b = PI;
    }
    if positive_distance(a, b) <= PI {
      Self { lo: a, hi: b }
    } else {
      Self { lo: b, hi: a }
    }
  }

  #[must_use]
  pub fn length(&self) -> f64 {
    let mut l = self.hi - self.lo;
    if l >= 0.0 {
      return l;
    }
    l += 2.0 * PI;
    if l > 0.0 {
      l
    } else {
      -1.0
    }
  }

  #[must_use]
  pub fn center(&self) -> f64 {
    let c = 0.5 * (self.lo + self.hi);
    if !self.is_inverted() {
      return c;
    }
    if c <= 0.0 {
      c + PI
    } else {
      c - PI
    }
  }

  fn fast_contains(&self, p: f64) -> bool {
    if self.is_inverted() {
      (p >= self.lo || p <= self.hi) && !self.is_empty()
    } else {
      p >= self.lo && p <= self.hi
    }
  }

  #[must_use]
  pub fn contains(&self, mut p: f64) -> bool {
    if p == -PI {
      p = PI;
    }
    self.fast_contains(p)
  }

  #[must_use]
  pub fn contains_interval(&self, oi: &Interval) -> bool {
    if self.is_inverted() {
      if oi.is_inverted() {
        return oi.lo >= self.lo && oi.hi <= self.hi;
      }
      return (oi.lo >= self.lo || oi.hi <= self.hi) && !self.is_empty();
    }
    if oi.is_inverted() {
      return self.is_full() || oi.is_empty();
    }
    oi.lo >= self.lo && oi.hi <= self.hi
  }

  #[must_use]
  pub fn intersects(&self, oi: &Interval) -> bool {
    if self.is_empty() || oi.is_empty() {
      return false;
    }
    if self.is_inverted() {
      return oi.is_inverted() || oi.lo <= self.hi || oi.hi >= self.lo;
    }
    if oi.is_inverted() {
      return oi.lo <= self.hi || oi.hi >= self.lo;
    }
    oi.lo <= self.hi && oi.hi >= self.lo
  }

  #[must_use]
  pub fn union(&self, oi: &Interval) -> Interval {
    if oi.is_empty() {
      return *self;
    }
    if self.fast_contains(oi.lo) {
      if self.fast_contains(oi.hi) {
        if self.contains_interval(oi) {
          return *self;
        }
        return Interval::full();
      }
      return Interval { lo: self.lo, hi: oi.hi };
    }
    if self.fast_contains(oi.hi) {
      return Interval { lo: oi.lo, hi: self.hi };
    }
    if self.is_empty() || oi.fast_contains(self.lo) {
      return *oi;
    }
    let dlo = positive_distance(oi.hi, self.lo);
    let dhi = positive_distance(self.hi, oi.lo);
    if dlo < dhi {
      Interval { lo: oi.lo, hi: self.hi }
    } else {
      Interval { lo: self.lo, hi: oi.hi }
    }
  }

  #[must_use]
  pub fn add_point(&self, mut p: f64) -> Interval {
    if p.abs() > PI {
      return *self;
    }
    if p == -PI {
      p = PI;
    }
    if self.fast_contains(p) {
      return *self;
    }
    if self.is_empty() {
      return Interval { lo: p, hi: p };
    }
    if positive_distance(p, self.lo) < positive_distance(self.hi, p) {
      Interval { lo: p, hi: self.hi }
    } else {
      Interval { lo: self.lo, hi: p }
    }
  }

  /// Interval grown by `margin` radians on each side.
  #[must_use]
  pub fn expanded(&self, margin: f64) -> Interval {
    if margin >= 0.0 {
      if self.is_empty() {
        return *self;
      }
      if self.length() + 2.0 * margin + 2.0 * DBL_EPSILON >= 2.0 * PI {
        return Interval::full();
      }
    } else {
      if self.is_full() {
        return *self;
      }
      if self.length() + 2.0 * margin - 2.0 * DBL_EPSILON <= 0.0 {
        return Interval::empty();
      }
    }
    let lo = remainder(self.lo - margin, 2.0 * PI);
    let hi = remainder(self.hi + margin, 2.0 * PI);
    Interval::new(if lo <= -PI { PI } else { lo }, hi)
  }
}

/// Distance from `a` to `b` going counterclockwise, in `[0, 2π)`.
fn positive_distance(a: f64, b: f64) -> f64 {
  let d = b - a;
  if d >= 0.0 {
    return d;
  }
  (b + PI) - (a - PI)
}

/// IEEE remainder: `x - n*y` with `n` the integer nearest `x/y`.
pub(crate) fn remainder(x: f64, y: f64) -> f64 {
  x - (x / y).round() * y
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_chord_angle_conversions() {
    let right = ChordAngle::from_angle(Angle(PI / 2.0));
    assert!((right.length2() - 2.0).abs() < 1e-15);
    assert!((ChordAngle::STRAIGHT.to_angle().radians() - PI).abs() < 1e-15);
    assert!(ChordAngle::negative() < ChordAngle::ZERO);
    assert!(ChordAngle::infinity() > ChordAngle::STRAIGHT);
    assert_eq!(ChordAngle::from_angle(Angle::infinity()), ChordAngle::infinity());
  }

  #[test]
  fn test_chord_angle_successor_predecessor() {
    assert_eq!(ChordAngle::negative().successor(), ChordAngle::ZERO);
    assert_eq!(ChordAngle::STRAIGHT.successor(), ChordAngle::infinity());
    assert_eq!(ChordAngle::ZERO.predecessor(), ChordAngle::negative());
    let a = ChordAngle(1.0);
    assert!(a.successor() > a && a.successor().predecessor() == a);
  }

  #[test]
  fn test_chord_angle_arithmetic() {
    let right = ChordAngle::RIGHT;
    assert_eq!(right + right, ChordAngle::STRAIGHT);
    assert!((right - right).is_zero());
    let quarter = ChordAngle::from_angle(Angle(PI / 4.0));
    assert!(((quarter + quarter).length2() - 2.0).abs() < 1e-14);
  }

  #[test]
  fn test_circular_interval() {
    let i = Interval::from_point_pair(3.0, -3.0);
    assert!(i.is_inverted());
    assert!(i.contains(PI) && !i.contains(0.0));
    assert!(Interval::full().contains_interval(&i));
    let u = Interval::new(0.0, 1.0).union(&Interval::new(2.0, 3.0));
    assert_eq!(u, Interval::new(0.0, 3.0));
    assert_eq!(Interval::empty().add_point(-PI), Interval { lo: PI, hi: PI });
    assert!(Interval::new(0.0, 1.0).expanded(4.0).is_full());
  }

  #[test]
  fn test_angle_normalized() {
    assert!((Angle(2.5 * PI).normalized().radians() - PI / 2.0).abs() < 1e-12);
    assert!((Angle(-PI / 2.0).normalized().radians() + PI / 2.0).abs() < 1e-15);
  }
}
