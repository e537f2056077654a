// src/math/exact.rs

//! Exact binary floating point values for robust predicates.
//!
//! An `ExactFloat` is `mantissa * 2^exp` with an arbitrary precision mantissa, so sums,
//! differences and products of `f64` values are represented without rounding.

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactFloat {
  mantissa: BigInt,
  exp: i64,
}

impl ExactFloat {
  #[must_use]
  pub fn zero() -> Self {
    Self { mantissa: BigInt::zero(), exp: 0 }
  }

  /// Exact conversion of a finite `f64`.
  #[must_use]
  pub fn from_f64(x: f64) -> Self {
    if x == 0.0 || !x.is_finite() {
      return Self::zero();
    }
    let bits = x.to_bits();
    let negative = bits >> 63 != 0;
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let frac = bits & 0x000f_ffff_ffff_ffff;
    let (mant, exp) = if biased == 0 {
      (frac, -1074)
    } else {
      (frac | 0x0010_0000_0000_0000, biased - 1075)
    };
    let mut mantissa = BigInt::from(mant);
    if negative {
      mantissa = -mantissa;
    }
    Self { mantissa, exp }.canonical()
  }

  // Strips trailing zero bits so that equal values compare equal.
  fn canonical(mut self) -> Self {
    match self.mantissa.trailing_zeros() {
      Some(tz) if tz > 0 => {
        self.mantissa >>= tz as usize;
        self.exp += tz as i64;
      }
      None => self.exp = 0,
      _ => {}
    }
    self
  }

  #[must_use]
  pub fn is_zero(&self) -> bool {
    self.mantissa.is_zero()
  }

  /// -1, 0 or +1.
  #[must_use]
  pub fn sign(&self) -> i32 {
    match self.mantissa.sign() {
      Sign::Minus => -1,
      Sign::NoSign => 0,
      Sign::Plus => 1,
    }
  }

  #[must_use]
  pub fn abs(&self) -> Self {
    Self { mantissa: self.mantissa.magnitude().clone().into(), exp: self.exp }
  }

  /// Nearest `f64` value (rounded toward zero in the low bits).
  #[must_use]
  pub fn to_f64(&self) -> f64 {
    if self.is_zero() {
      return 0.0;
    }
    let bits = self.mantissa.bits() as i64;
    let (m, e) = if bits > 60 {
      let shift = bits - 60;
      (&self.mantissa >> (shift as usize), self.exp + shift)
    } else {
      (self.mantissa.clone(), self.exp)
    };
    ldexp(m.to_f64().unwrap_or(0.0), e)
  }

  fn align(a: &Self, b: &Self) -> (BigInt, BigInt, i64) {
    match a.exp.cmp(&b.exp) {
      Ordering::Equal => (a.mantissa.clone(), b.mantissa.clone(), a.exp),
      Ordering::Greater => (&a.mantissa << ((a.exp - b.exp) as usize), b.mantissa.clone(), b.exp),
      Ordering::Less => (a.mantissa.clone(), &b.mantissa << ((b.exp - a.exp) as usize), a.exp),
    }
  }
}

fn ldexp(mut x: f64, mut e: i64) -> f64 {
  while e > 1000 {
    x *= 2f64.powi(1000);
    e -= 1000;
  }
  while e < -1000 {
    x *= 2f64.powi(-1000);
    e += 1000;
  }
  x * 2f64.powi(e as i32)
}

impl PartialOrd for ExactFloat {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for ExactFloat {
  fn cmp(&self, other: &Self) -> Ordering {
    (self - other).sign().cmp(&0)
  }
}

impl<'a> Add<&'a ExactFloat> for &'a ExactFloat {
  type Output = ExactFloat;
  fn add(self, o: &ExactFloat) -> ExactFloat {
    let (a, b, exp) = ExactFloat::align(self, o);
    ExactFloat { mantissa: a + b, exp }.canonical()
  }
}

impl<'a> Sub<&'a ExactFloat> for &'a ExactFloat {
  type Output = ExactFloat;
  fn sub(self, o: &ExactFloat) -> ExactFloat {
    let (a, b, exp) = ExactFloat::align(self, o);
    ExactFloat { mantissa: a - b, exp }.canonical()
  }
}

impl<'a> Mul<&'a ExactFloat> for &'a ExactFloat {
  type Output = ExactFloat;
  fn mul(self, o: &ExactFloat) -> ExactFloat {
    ExactFloat { mantissa: &self.mantissa * &o.mantissa, exp: self.exp + o.exp }.canonical()
  }
}

impl Neg for &ExactFloat {
  type Output = ExactFloat;
  fn neg(self) -> ExactFloat {
    ExactFloat { mantissa: -&self.mantissa, exp: self.exp }
  }
}
