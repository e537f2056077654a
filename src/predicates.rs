// src/predicates.rs

//! Robust geometric predicates.
//!
//! Each predicate first tries plain `f64` arithmetic with a rigorous error bound. When the
//! result falls inside the bound it retries with a more stable formula, then with exact
//! arithmetic, and finally breaks exact ties by symbolic perturbation. The results are
//! therefore consistent: `sign(a, b, c) == -sign(c, b, a)` for all distinct points, and
//! sorting points around a center always yields a strict total order.

use crate::constants::{DBL_EPSILON, DBL_ERROR, M_SQRT2, M_SQRT3};
use crate::math::exact::ExactFloat;
use crate::math::r3::{PreciseVector, Vector};
use crate::math::s1::ChordAngle;
use crate::point::Point;
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::cmp::Ordering;
use std::ops::Neg;

/// Maximum error in computing `(a x b) . c` for unit-length vectors.
const MAX_DETERMINANT_ERROR: f64 = 1.8274 * DBL_EPSILON;

/// Scale factor for the error bound of the stable determinant.
const DET_ERROR_MULTIPLIER: f64 = 3.2321 * DBL_EPSILON;

/// Orientation of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
pub enum Direction {
  Clockwise = -1,
  Indeterminate = 0,
  CounterClockwise = 1,
}

impl Neg for Direction {
  type Output = Direction;
  fn neg(self) -> Direction {
    match self {
      Direction::Clockwise => Direction::CounterClockwise,
      Direction::Indeterminate => Direction::Indeterminate,
      Direction::CounterClockwise => Direction::Clockwise,
    }
  }
}

impl Direction {
  fn from_sign(s: i32) -> Direction {
    match s.cmp(&0) {
      Ordering::Less => Direction::Clockwise,
      Ordering::Equal => Direction::Indeterminate,
      Ordering::Greater => Direction::CounterClockwise,
    }
  }
}

/// Whether `a`, `b`, `c` are in strictly counterclockwise order, using plain `f64`.
///
/// Computed as `(c x a) . b` so that ABC and CBA are never both reported as CCW.
/// Not robust for nearly collinear points; use `robust_sign` there.
#[inline]
#[must_use]
pub fn sign(a: Point, b: Point, c: Point) -> bool {
  c.0.cross(a.0).dot(b.0) > 0.0
}

/// Exact orientation of three points.
///
/// Returns `Indeterminate` only if two of the points are identical. Otherwise the result
/// is consistent under all permutations: rotating the arguments preserves the result and
/// swapping two of them negates it.
#[must_use]
pub fn robust_sign(a: Point, b: Point, c: Point) -> Direction {
  let s = triage_sign(a, b, c);
  if s != Direction::Indeterminate {
    return s;
  }
  expensive_sign(a, b, c)
}

/// Orientation of `a`, `b`, `c` if the `f64` determinant is unambiguous.
#[must_use]
pub fn triage_sign(a: Point, b: Point, c: Point) -> Direction {
  let det = a.0.cross(b.0).dot(c.0);
  if det > MAX_DETERMINANT_ERROR {
    Direction::CounterClockwise
  } else if det < -MAX_DETERMINANT_ERROR {
    Direction::Clockwise
  } else {
    Direction::Indeterminate
  }
}

/// Orientation from a more accurate `f64` determinant built on the two shortest edges.
#[must_use]
pub fn stable_sign(a: Point, b: Point, c: Point) -> Direction {
  let ab = b.0 - a.0;
  let ab2 = ab.norm2();
  let bc = c.0 - b.0;
  let bc2 = bc.norm2();
  let ca = a.0 - c.0;
  let ca2 = ca.norm2();

  // Permute so that the longest edge is excluded, minimizing the cross product.
  let (e1, e2, op) = if ab2 >= bc2 && ab2 >= ca2 {
    (ca, bc, c.0)
  } else if bc2 >= ca2 {
    (ab, ca, a.0)
  } else {
    (bc, ab, b.0)
  };

  let det = -e1.cross(e2).dot(op);
  let max_err = DET_ERROR_MULTIPLIER * (e1.norm2() * e2.norm2()).sqrt();
  if det > max_err {
    Direction::CounterClockwise
  } else if det < -max_err {
    Direction::Clockwise
  } else {
    Direction::Indeterminate
  }
}

/// Orientation for points whose cheap determinant was ambiguous.
#[must_use]
pub fn expensive_sign(a: Point, b: Point, c: Point) -> Direction {
  if a == b || b == c || c == a {
    return Direction::Indeterminate;
  }
  let s = stable_sign(a, b, c);
  if s != Direction::Indeterminate {
    return s;
  }
  exact_sign(a, b, c, true)
}

/// Lexicographic order of vectors by (x, y, z).
fn cmp_vectors(a: Vector, b: Vector) -> Ordering {
  a.x
    .partial_cmp(&b.x)
    .unwrap_or(Ordering::Equal)
    .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
    .then(a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal))
}

/// Orientation with exact arithmetic, optionally breaking ties by symbolic perturbation.
#[must_use]
pub fn exact_sign(a: Point, b: Point, c: Point, perturb: bool) -> Direction {
  // Sort lexicographically; every swap negates the determinant.
  let (mut pa, mut pb, mut pc) = (a.0, b.0, c.0);
  let mut perm_sign = Direction::CounterClockwise;
  if cmp_vectors(pa, pb) == Ordering::Greater {
    std::mem::swap(&mut pa, &mut pb);
    perm_sign = -perm_sign;
  }
  if cmp_vectors(pb, pc) == Ordering::Greater {
    std::mem::swap(&mut pb, &mut pc);
    perm_sign = -perm_sign;
  }
  if cmp_vectors(pa, pb) == Ordering::Greater {
    std::mem::swap(&mut pa, &mut pb);
    perm_sign = -perm_sign;
  }

  let xa = PreciseVector::from_vector(pa);
  let xb = PreciseVector::from_vector(pb);
  let xc = PreciseVector::from_vector(pc);
  let xb_cross_xc = xb.cross(&xc);
  let det = xa.dot(&xb_cross_xc);

  let mut det_sign = Direction::from_sign(det.sign());
  if det_sign == Direction::Indeterminate && perturb {
    det_sign = symbolically_perturbed_sign(&xa, &xb, &xc, &xb_cross_xc);
  }
  if perm_sign == Direction::Clockwise {
    -det_sign
  } else {
    det_sign
  }
}

/// Sign of the determinant of lexicographically sorted points `a < b < c` after each point
/// is perturbed by an infinitesimal amount, larger for smaller points.
///
/// Never returns `Indeterminate` for distinct points.
#[must_use]
pub fn symbolically_perturbed_sign(
  a: &PreciseVector,
  b: &PreciseVector,
  c: &PreciseVector,
  b_cross_c: &PreciseVector,
) -> Direction {
  // Terms of the perturbed determinant in decreasing order of magnitude; the first nonzero
  // one decides.
  let checks = [
    b_cross_c.z.sign(),
    b_cross_c.y.sign(),
    b_cross_c.x.sign(),
  ];
  if let Some(&s) = checks.iter().find(|&&s| s != 0) {
    return Direction::from_sign(s);
  }
  let s = (&(&c.x * &a.y) - &(&c.y * &a.x)).sign();
  if s != 0 {
    return Direction::from_sign(s);
  }
  if c.x.sign() != 0 {
    return Direction::from_sign(c.x.sign());
  }
  if c.y.sign() != 0 {
    return Direction::from_sign(-c.y.sign());
  }
  let s = (&(&c.z * &a.x) - &(&c.x * &a.z)).sign();
  if s != 0 {
    return Direction::from_sign(s);
  }
  if c.z.sign() != 0 {
    return Direction::from_sign(c.z.sign());
  }
  // At this point c is the zero vector.
  let s = (&(&a.x * &b.y) - &(&a.y * &b.x)).sign();
  if s != 0 {
    return Direction::from_sign(s);
  }
  if b.x.sign() != 0 {
    return Direction::from_sign(-b.x.sign());
  }
  if b.y.sign() != 0 {
    return Direction::from_sign(b.y.sign());
  }
  if a.x.sign() != 0 {
    return Direction::from_sign(a.x.sign());
  }
  Direction::CounterClockwise
}

/// Whether the edges OA, OB, OC are encountered in that order while sweeping
/// counterclockwise around O. Equal edges count as in order.
#[must_use]
pub fn ordered_ccw(a: Point, b: Point, c: Point, o: Point) -> bool {
  let mut sum = 0;
  if robust_sign(b, o, a) != Direction::Clockwise {
    sum += 1;
  }
  if robust_sign(c, o, b) != Direction::Clockwise {
    sum += 1;
  }
  if robust_sign(a, o, c) == Direction::CounterClockwise {
    sum += 1;
  }
  sum >= 2
}

fn cos_distance(x: Point, y: Point) -> (f64, f64) {
  let cos = x.dot(y);
  (cos, 9.5 * DBL_ERROR * cos.abs() + 1.5 * DBL_ERROR)
}

fn sin2_distance(x: Point, y: Point) -> (f64, f64) {
  // (x-y) x (x+y) cancels most of the error from x and y not being unit length.
  let n = (x.0 - y.0).cross(x.0 + y.0);
  let sin2 = 0.25 * n.norm2();
  let err = (21.0 + 4.0 * M_SQRT3) * DBL_ERROR * sin2
    + 32.0 * M_SQRT3 * DBL_ERROR * DBL_ERROR * sin2.sqrt()
    + 768.0 * DBL_ERROR * DBL_ERROR * DBL_ERROR * DBL_ERROR;
  (sin2, err)
}

fn triage_compare_cos_distances(x: Point, a: Point, b: Point) -> i32 {
  let (cos_ax, cos_ax_err) = cos_distance(a, x);
  let (cos_bx, cos_bx_err) = cos_distance(b, x);
  let diff = cos_ax - cos_bx;
  let err = cos_ax_err + cos_bx_err;
  if diff > err {
    -1
  } else if diff < -err {
    1
  } else {
    0
  }
}

fn triage_compare_sin2_distances(x: Point, a: Point, b: Point) -> i32 {
  let (sin2_ax, sin2_ax_err) = sin2_distance(a, x);
  let (sin2_bx, sin2_bx_err) = sin2_distance(b, x);
  let diff = sin2_ax - sin2_bx;
  let err = sin2_ax_err + sin2_bx_err;
  if diff > err {
    1
  } else if diff < -err {
    -1
  } else {
    0
  }
}

fn exact_compare_distances(x: &PreciseVector, a: &PreciseVector, b: &PreciseVector) -> i32 {
  // Compares x.a/|a| with x.b/|b| without square roots.
  let cos_ax = x.dot(a);
  let cos_bx = x.dot(b);
  let a_sign = cos_ax.sign();
  let b_sign = cos_bx.sign();
  if a_sign != b_sign {
    return if a_sign > b_sign { -1 } else { 1 };
  }
  let cos_ax2 = &cos_ax * &cos_ax;
  let cos_bx2 = &cos_bx * &cos_bx;
  let cmp = &(&cos_bx2 * &a.norm2()) - &(&cos_ax2 * &b.norm2());
  a_sign * cmp.sign()
}

// Each point sits on an infinitesimal pedestal, taller for lexicographically smaller points.
fn symbolic_compare_distances(a: Point, b: Point) -> i32 {
  match cmp_vectors(a.0, b.0) {
    Ordering::Less => 1,
    Ordering::Greater => -1,
    Ordering::Equal => 0,
  }
}

/// Compares the distances XA and XB exactly: -1 if XA < XB, 1 if XA > XB.
///
/// Returns 0 only if `a == b`; distinct points at equal distance are ordered by symbolic
/// perturbation.
#[must_use]
pub fn compare_distances(x: Point, a: Point, b: Point) -> i32 {
  let mut s = triage_compare_cos_distances(x, a, b);
  if s != 0 {
    return s;
  }
  if a == b {
    return 0;
  }
  // cos is better conditioned near 90 degrees and sin^2 near 0 or 180.
  let cos_ax = a.dot(x);
  if cos_ax > 1.0 / M_SQRT2 {
    s = triage_compare_sin2_distances(x, a, b);
  } else if cos_ax < -1.0 / M_SQRT2 {
    s = -triage_compare_sin2_distances(x, a, b);
  }
  if s != 0 {
    return s;
  }
  s = exact_compare_distances(
    &PreciseVector::from_vector(x.0),
    &PreciseVector::from_vector(a.0),
    &PreciseVector::from_vector(b.0),
  );
  if s != 0 {
    return s;
  }
  symbolic_compare_distances(a, b)
}

fn triage_compare_cos_distance(x: Point, y: Point, r2: f64) -> i32 {
  let (cos_xy, cos_xy_err) = cos_distance(x, y);
  let cos_r = 1.0 - 0.5 * r2;
  let cos_r_err = 2.0 * DBL_ERROR * cos_r;
  let diff = cos_xy - cos_r;
  let err = cos_xy_err + cos_r_err;
  if diff > err {
    -1
  } else if diff < -err {
    1
  } else {
    0
  }
}

fn triage_compare_sin2_distance(x: Point, y: Point, r2: f64) -> i32 {
  let (sin2_xy, sin2_xy_err) = sin2_distance(x, y);
  let sin2_r = r2 * (1.0 - 0.25 * r2);
  let sin2_r_err = 3.0 * DBL_ERROR * sin2_r;
  let diff = sin2_xy - sin2_r;
  let err = sin2_xy_err + sin2_r_err;
  if diff > err {
    1
  } else if diff < -err {
    -1
  } else {
    0
  }
}

fn exact_compare_distance(x: &PreciseVector, y: &PreciseVector, r2: f64) -> i32 {
  let cos_xy = x.dot(y);
  let cos_r = &ExactFloat::from_f64(1.0) - &(&ExactFloat::from_f64(0.5) * &ExactFloat::from_f64(r2));
  let xy_sign = cos_xy.sign();
  let r_sign = cos_r.sign();
  if xy_sign != r_sign {
    return if xy_sign > r_sign { -1 } else { 1 };
  }
  let lhs = &(&cos_r * &cos_r) * &(&x.norm2() * &y.norm2());
  let rhs = &cos_xy * &cos_xy;
  xy_sign * (&lhs - &rhs).sign()
}

/// Compares the distance XY against `r`: -1 if closer, 0 if equal, 1 if farther.
#[must_use]
pub fn compare_distance(x: Point, y: Point, r: ChordAngle) -> i32 {
  let s = triage_compare_cos_distance(x, y, r.length2());
  if s != 0 {
    return s;
  }
  // sin^2 is only valid below 90 degrees; near 180 the chord angle itself is imprecise.
  let ca45 = 2.0 - M_SQRT2;
  if r.length2() < ca45 {
    let s = triage_compare_sin2_distance(x, y, r.length2());
    if s != 0 {
      return s;
    }
  }
  exact_compare_distance(&PreciseVector::from_vector(x.0), &PreciseVector::from_vector(y.0), r.length2())
}
