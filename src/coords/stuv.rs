// src/coords/stuv.rs

//! Conversions between the cube-face coordinate systems.
//!
//! * (face, u, v): gnomonic projection onto a cube face, u and v in [-1, 1].
//! * (face, s, t): the quadratic transform of (u, v) into [0, 1], equalizing cell areas.
//! * (face, i, j): leaf cell coordinates, integers in [0, 2^30).
//! * (face, si, ti): discrete coordinates of cell centers and vertices, in [0, 2^31].

use crate::constants::{MAX_LEVEL, MAX_SIZE, MAX_SI_TI};
use crate::math::r3::{Axis, Vector};
use crate::point::Point;

/// Converts an s or t value to the corresponding u or v value.
#[inline]
#[must_use]
pub fn st_to_uv(s: f64) -> f64 {
  if s >= 0.5 {
    (1.0 / 3.0) * (4.0 * s * s - 1.0)
  } else {
    (1.0 / 3.0) * (1.0 - 4.0 * (1.0 - s) * (1.0 - s))
  }
}

/// Inverse of `st_to_uv`.
#[inline]
#[must_use]
pub fn uv_to_st(u: f64) -> f64 {
  if u >= 0.0 {
    0.5 * (1.0 + 3.0 * u).sqrt()
  } else {
    1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
  }
}

/// Lower edge of the leaf cell with coordinate `i`, in s or t.
#[inline]
#[must_use]
pub fn ij_to_st_min(i: i32) -> f64 {
  f64::from(i) / f64::from(MAX_SIZE)
}

/// Leaf cell coordinate containing `s`, clamped to the valid range.
#[inline]
#[must_use]
pub fn st_to_ij(s: f64) -> i32 {
  ((f64::from(MAX_SIZE) * s).floor() as i32).clamp(0, MAX_SIZE - 1)
}

#[inline]
#[must_use]
pub fn siti_to_st(si: u32) -> f64 {
  if si > MAX_SI_TI {
    return 1.0;
  }
  f64::from(si) / f64::from(MAX_SI_TI)
}

#[inline]
#[must_use]
pub fn st_to_siti(s: f64) -> u32 {
  (s * f64::from(MAX_SI_TI)).round() as u32
}

/// Face whose axis has the largest component of `r`.
#[must_use]
pub fn face(r: Vector) -> u8 {
  let (axis, value) = match r.largest_component() {
    Axis::X => (0, r.x),
    Axis::Y => (1, r.y),
    Axis::Z => (2, r.z),
  };
  if value < 0.0 {
    axis + 3
  } else {
    axis
  }
}

/// (u, v) of `r` on `face`, assuming `r` projects onto that face.
#[must_use]
pub fn valid_face_xyz_to_uv(face: u8, r: Vector) -> (f64, f64) {
  match face {
    0 => (r.y / r.x, r.z / r.x),
    1 => (-r.x / r.y, r.z / r.y),
    2 => (-r.x / r.z, -r.y / r.z),
    3 => (r.z / r.x, r.y / r.x),
    4 => (r.z / r.y, -r.x / r.y),
    _ => (-r.y / r.z, -r.x / r.z),
  }
}

/// Face and (u, v) of a vector.
#[must_use]
pub fn xyz_to_face_uv(r: Vector) -> (u8, f64, f64) {
  let f = face(r);
  let (u, v) = valid_face_xyz_to_uv(f, r);
  (f, u, v)
}

/// (u, v) of `r` on `face`, or `None` if `r` lies in the opposite hemisphere.
#[must_use]
pub fn face_xyz_to_uv(face: u8, r: Vector) -> Option<(f64, f64)> {
  let positive = match face {
    0 => r.x > 0.0,
    1 => r.y > 0.0,
    2 => r.z > 0.0,
    3 => r.x < 0.0,
    4 => r.y < 0.0,
    _ => r.z < 0.0,
  };
  positive.then(|| valid_face_xyz_to_uv(face, r))
}

/// Unnormalized vector for (face, u, v).
#[must_use]
pub fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> Vector {
  match face {
    0 => Vector::new(1.0, u, v),
    1 => Vector::new(-u, 1.0, v),
    2 => Vector::new(-u, -v, 1.0),
    3 => Vector::new(-1.0, -v, -u),
    4 => Vector::new(v, -1.0, -u),
    _ => Vector::new(v, u, -1.0),
  }
}

/// Coordinates of `p` in the (u, v, w) frame of `face`, where w is the face normal.
#[must_use]
pub fn face_xyz_to_uvw(face: u8, p: Point) -> Point {
  let v = p.0;
  Point(match face {
    0 => Vector::new(v.y, v.z, v.x),
    1 => Vector::new(-v.x, v.z, v.y),
    2 => Vector::new(-v.x, -v.y, v.z),
    3 => Vector::new(-v.z, -v.y, -v.x),
    4 => Vector::new(-v.z, v.x, -v.y),
    _ => Vector::new(v.y, v.x, -v.z),
  })
}

#[must_use]
pub fn face_siti_to_xyz(face: u8, si: u32, ti: u32) -> Point {
  let u = st_to_uv(siti_to_st(si));
  let v = st_to_uv(siti_to_st(ti));
  Point(face_uv_to_xyz(face, u, v))
}

/// Face, si, ti of a point and the level of the cell it is the exact center of (-1 if none).
#[must_use]
pub fn xyz_to_face_siti(p: Point) -> (u8, u32, u32, i32) {
  let (face, u, v) = xyz_to_face_uv(p.0);
  let si = st_to_siti(uv_to_st(u));
  let ti = st_to_siti(uv_to_st(v));

  // si and ti of 0 or MAX_SI_TI are cell vertices, never centers.
  let level = MAX_LEVEL - (si | MAX_SI_TI).trailing_zeros() as i32;
  if level < 0 || level != MAX_LEVEL - (ti | MAX_SI_TI).trailing_zeros() as i32 {
    return (face, si, ti, -1);
  }
  if p.0 == face_siti_to_xyz(face, si, ti).0.normalize() {
    return (face, si, ti, level);
  }
  (face, si, ti, -1)
}

/// Right-handed normal of the plane through the origin containing the line u = `u`.
#[must_use]
pub fn u_norm(face: u8, u: f64, invert: bool) -> Vector {
  let n = match face {
    0 => Vector::new(u, -1.0, 0.0),
    1 => Vector::new(1.0, u, 0.0),
    2 => Vector::new(1.0, 0.0, u),
    3 => Vector::new(-u, 0.0, 1.0),
    4 => Vector::new(0.0, -u, 1.0),
    _ => Vector::new(0.0, -1.0, -u),
  };
  if invert {
    -n
  } else {
    n
  }
}

/// Right-handed normal of the plane through the origin containing the line v = `v`.
#[must_use]
pub fn v_norm(face: u8, v: f64, invert: bool) -> Vector {
  let n = match face {
    0 => Vector::new(-v, 0.0, 1.0),
    1 => Vector::new(0.0, -v, 1.0),
    2 => Vector::new(0.0, -1.0, -v),
    3 => Vector::new(v, -1.0, 0.0),
    4 => Vector::new(1.0, v, 0.0),
    _ => Vector::new(1.0, 0.0, v),
  };
  if invert {
    -n
  } else {
    n
  }
}

#[must_use]
pub fn unit_norm(face: u8) -> Vector {
  face_uv_to_xyz(face, 0.0, 0.0)
}

#[must_use]
pub fn u_axis(face: u8) -> Vector {
  match face {
    0 => Vector::new(0.0, 1.0, 0.0),
    1 | 2 => Vector::new(-1.0, 0.0, 0.0),
    3 | 4 => Vector::new(0.0, 0.0, -1.0),
    _ => Vector::new(0.0, 1.0, 0.0),
  }
}

#[must_use]
pub fn v_axis(face: u8) -> Vector {
  match face {
    0 | 1 => Vector::new(0.0, 0.0, 1.0),
    2 | 3 => Vector::new(0.0, -1.0, 0.0),
    _ => Vector::new(1.0, 0.0, 0.0),
  }
}
