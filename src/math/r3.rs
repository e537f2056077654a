// src/math/r3.rs

//! Vectors in ℝ³, in both `f64` and exact arithmetic.

use super::exact::ExactFloat;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A vector in ℝ³.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

/// Axis of a vector component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
  X,
  Y,
  Z,
}

impl Vector {
  #[inline]
  #[must_use]
  pub const fn new(x: f64, y: f64, z: f64) -> Self {
    Self { x, y, z }
  }

  #[inline]
  #[must_use]
  pub fn dot(self, o: Vector) -> f64 {
    self.x * o.x + self.y * o.y + self.z * o.z
  }

  #[inline]
  #[must_use]
  pub fn cross(self, o: Vector) -> Vector {
    Vector::new(
      self.y * o.z - self.z * o.y,
      self.z * o.x - self.x * o.z,
      self.x * o.y - self.y * o.x,
    )
  }

  #[inline]
  #[must_use]
  pub fn norm2(self) -> f64 {
    self.dot(self)
  }

  #[inline]
  #[must_use]
  pub fn norm(self) -> f64 {
    self.norm2().sqrt()
  }

  /// Unit vector in the same direction. The zero vector is returned unchanged.
  #[must_use]
  pub fn normalize(self) -> Vector {
    let n2 = self.norm2();
    if n2 == 0.0 {
      return self;
    }
    self * (1.0 / n2.sqrt())
  }

  /// Whether the vector is unit length within a small tolerance.
  #[must_use]
  pub fn is_unit(self) -> bool {
    const EPSILON: f64 = 5e-14;
    (self.norm2() - 1.0).abs() <= EPSILON
  }

  #[must_use]
  pub fn abs(self) -> Vector {
    Vector::new(self.x.abs(), self.y.abs(), self.z.abs())
  }

  #[must_use]
  pub fn mul_components(self, o: Vector) -> Vector {
    Vector::new(self.x * o.x, self.y * o.y, self.z * o.z)
  }

  #[must_use]
  pub fn distance(self, o: Vector) -> f64 {
    (self - o).norm()
  }

  /// Angle between the two vectors in radians, in `[0, π]`.
  #[must_use]
  pub fn angle(self, o: Vector) -> f64 {
    self.cross(o).norm().atan2(self.dot(o))
  }

  #[must_use]
  pub fn approx_eq(self, o: Vector) -> bool {
    const EPSILON: f64 = 1e-16;
    (self.x - o.x).abs() < EPSILON && (self.y - o.y).abs() < EPSILON && (self.z - o.z).abs() < EPSILON
  }

  /// Axis of the component with the largest absolute value.
  #[must_use]
  pub fn largest_component(self) -> Axis {
    let t = self.abs();
    if t.x > t.y {
      if t.x > t.z {
        Axis::X
      } else {
        Axis::Z
      }
    } else if t.y > t.z {
      Axis::Y
    } else {
      Axis::Z
    }
  }

  /// Axis of the component with the smallest absolute value.
  #[must_use]
  pub fn smallest_component(self) -> Axis {
    let t = self.abs();
    if t.x < t.y {
      if t.x < t.z {
        Axis::X
      } else {
        Axis::Z
      }
    } else if t.y < t.z {
      Axis::Y
    } else {
      Axis::Z
    }
  }

  #[must_use]
  pub fn component(self, axis: Axis) -> f64 {
    match axis {
      Axis::X => self.x,
      Axis::Y => self.y,
      Axis::Z => self.z,
    }
  }

  /// A unit vector orthogonal to this one.
  #[must_use]
  pub fn ortho(self) -> Vector {
    let ov = match self.largest_component() {
      Axis::X => Vector::new(0.0, 0.0, 1.0),
      Axis::Y => Vector::new(1.0, 0.0, 0.0),
      Axis::Z => Vector::new(0.0, 1.0, 0.0),
    };
    self.cross(ov).normalize()
  }
}

impl Add for Vector {
  type Output = Vector;
  #[inline]
  fn add(self, o: Vector) -> Vector {
    Vector::new(self.x + o.x, self.y + o.y, self.z + o.z)
  }
}

impl Sub for Vector {
  type Output = Vector;
  #[inline]
  fn sub(self, o: Vector) -> Vector {
    Vector::new(self.x - o.x, self.y - o.y, self.z - o.z)
  }
}

impl Mul<f64> for Vector {
  type Output = Vector;
  #[inline]
  fn mul(self, m: f64) -> Vector {
    Vector::new(self.x * m, self.y * m, self.z * m)
  }
}

impl Neg for Vector {
  type Output = Vector;
  #[inline]
  fn neg(self) -> Vector {
    Vector::new(-self.x, -self.y, -self.z)
  }
}

/// A vector in ℝ³ whose components are exact binary floats.
#[derive(Debug, Clone, PartialEq)]
pub struct PreciseVector {
  pub x: ExactFloat,
  pub y: ExactFloat,
  pub z: ExactFloat,
}

impl PreciseVector {
  #[must_use]
  pub fn from_vector(v: Vector) -> Self {
    Self {
      x: ExactFloat::from_f64(v.x),
      y: ExactFloat::from_f64(v.y),
      z: ExactFloat::from_f64(v.z),
    }
  }

  /// Nearest `f64` vector, normalized.
  #[must_use]
  pub fn to_vector(&self) -> Vector {
    Vector::new(self.x.to_f64(), self.y.to_f64(), self.z.to_f64()).normalize()
  }

  #[must_use]
  pub fn dot(&self, o: &PreciseVector) -> ExactFloat {
    &(&(&self.x * &o.x) + &(&self.y * &o.y)) + &(&self.z * &o.z)
  }

  #[must_use]
  pub fn cross(&self, o: &PreciseVector) -> PreciseVector {
    PreciseVector {
      x: &(&self.y * &o.z) - &(&self.z * &o.y),
      y: &(&self.z * &o.x) - &(&self.x * &o.z),
      z: &(&self.x * &o.y) - &(&self.y * &o.x),
    }
  }

  #[must_use]
  pub fn norm2(&self) -> ExactFloat {
    self.dot(self)
  }

  #[must_use]
  pub fn is_zero(&self) -> bool {
    self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
  }
}

impl<'a> Sub<&'a PreciseVector> for &'a PreciseVector {
  type Output = PreciseVector;
  fn sub(self, o: &PreciseVector) -> PreciseVector {
    PreciseVector { x: &self.x - &o.x, y: &self.y - &o.y, z: &self.z - &o.z }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cross_and_dot() {
    let x = Vector::new(1.0, 0.0, 0.0);
    let y = Vector::new(0.0, 1.0, 0.0);
    assert_eq!(x.cross(y), Vector::new(0.0, 0.0, 1.0));
    assert_eq!(x.dot(y), 0.0);
    assert!((x.angle(y) - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
  }

  #[test]
  fn test_ortho_is_orthogonal_unit() {
    for v in [Vector::new(1.0, 2.0, 3.0), Vector::new(0.0, 0.0, -1.0), Vector::new(1e-20, 1.0, 0.0)] {
      let o = v.ortho();
      assert!(o.is_unit(), "ortho of {:?} is not unit", v);
      assert!(v.normalize().dot(o).abs() < 1e-15);
    }
  }

  #[test]
  fn test_components() {
    let v = Vector::new(-3.0, 2.0, 1.0);
    assert_eq!(v.largest_component(), Axis::X);
    assert_eq!(v.smallest_component(), Axis::Z);
    assert_eq!(v.component(Axis::Y), 2.0);
  }

  #[test]
  fn test_precise_cross_matches_f64() {
    let a = Vector::new(1.0, 2.0, 3.0);
    let b = Vector::new(-2.0, 0.5, 4.0);
    let exact = PreciseVector::from_vector(a).cross(&PreciseVector::from_vector(b));
    assert_eq!(exact.to_vector(), a.cross(b).normalize());
  }
}
