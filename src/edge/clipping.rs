// src/edge/clipping.rs

//! Clipping of geodesic edges to cube faces and of planar (u,v) edges to rectangles.

use crate::constants::{DBL_EPSILON, FACE_CLIP_ERROR_UV_COORD};
use crate::coords::stuv::face;
use crate::coords::{face_uv_to_xyz, face_xyz_to_uvw, valid_face_xyz_to_uv, xyz_to_face_uv};
use crate::math::r1::Interval;
use crate::math::r2::{Point as R2Point, Rect as R2Rect};
use crate::math::r3::Vector;
use crate::point::Point;

/// Maximum angle between a clipped face exit point and the true great circle, in radians.
const FACE_CLIP_ERROR_RADIANS: f64 = 3.0 * DBL_EPSILON;

/// Adjacent face across each (axis, direction) of each face's (u, v, w) frame.
const FACE_UVW_FACES: [[[u8; 2]; 3]; 6] = [
  [[4, 1], [5, 2], [3, 0]],
  [[0, 3], [5, 2], [4, 1]],
  [[0, 3], [1, 4], [5, 2]],
  [[2, 5], [1, 4], [0, 3]],
  [[2, 5], [3, 0], [1, 4]],
  [[4, 1], [3, 0], [2, 5]],
];

#[inline]
fn uvw_face(face: u8, axis: usize, direction: usize) -> u8 {
  FACE_UVW_FACES[face as usize][axis][direction]
}

/// The part of an edge that lies on a single cube face, in that face's (u,v) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceSegment {
  pub face: u8,
  pub a: R2Point,
  pub b: R2Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitAxis {
  U,
  V,
}

// A vector in the (u,v,w) frame of some face, typically the normal of an edge.
#[derive(Debug, Clone, Copy)]
struct Uvw(Vector);

impl Uvw {
  // Whether the plane with this normal passes through the face. Only the (-1,-1,1) and
  // (1,1,1) vertices matter; the others follow by symmetry.
  fn intersects_face(self) -> bool {
    let u = self.0.x.abs();
    let v = self.0.y.abs();
    let w = self.0.z.abs();
    v >= w - u && u >= w - v
  }

  fn intersects_opposite_edges(self) -> bool {
    let u = self.0.x.abs();
    let v = self.0.y.abs();
    let w = self.0.z.abs();
    if (u - v).abs() != w {
      return (u - v).abs() >= w;
    }
    // Exact comparison in the tied case.
    if u >= v {
      u - w >= v
    } else {
      v - w >= u
    }
  }

  fn exit_axis(self) -> ExitAxis {
    if self.intersects_opposite_edges() {
      if self.0.x.abs() >= self.0.y.abs() {
        return ExitAxis::V;
      }
      return ExitAxis::U;
    }
    // Through adjacent edges: the v edge iff an even number of components are negative.
    let parity = u8::from(self.0.x.is_sign_negative())
      ^ u8::from(self.0.y.is_sign_negative())
      ^ u8::from(self.0.z.is_sign_negative());
    if parity == 0 {
      ExitAxis::V
    } else {
      ExitAxis::U
    }
  }

  fn exit_point(self, axis: ExitAxis) -> R2Point {
    let n = self.0;
    match axis {
      ExitAxis::U => {
        let u = if n.y > 0.0 { 1.0 } else { -1.0 };
        R2Point::new(u, (-u * n.x - n.z) / n.y)
      }
      ExitAxis::V => {
        let v = if n.x < 0.0 { 1.0 } else { -1.0 };
        R2Point::new((-v * n.y - n.z) / n.x, v)
      }
    }
  }
}

// u + v == w exactly, without the rounding that a single comparison would hide.
fn sum_equal(u: f64, v: f64, w: f64) -> bool {
  u + v == w && u == w - v && v == w - u
}

/// Clips AB to face `face`. Returns the (u,v) endpoints of the clipped edge, or `None` if AB
/// misses the face.
#[must_use]
pub fn clip_to_face(a: Point, b: Point, face: u8) -> Option<(R2Point, R2Point)> {
  clip_to_padded_face(a, b, face, 0.0)
}

/// Like [`clip_to_face`], with the face expanded by `padding` in (u,v) space. The result is
/// within [`FACE_CLIP_ERROR_UV_COORD`] of the exact clipped edge.
#[must_use]
pub fn clip_to_padded_face(a: Point, b: Point, f: u8, padding: f64) -> Option<(R2Point, R2Point)> {
  if face(a.0) == f && face(b.0) == f {
    let (au, av) = valid_face_xyz_to_uv(f, a.0);
    let (bu, bv) = valid_face_xyz_to_uv(f, b.0);
    return Some((R2Point::new(au, av), R2Point::new(bu, bv)));
  }

  // The cross product must be taken in xyz: point_cross is not rotation invariant for
  // (anti)parallel inputs.
  let mut norm_uvw = face_xyz_to_uvw(f, a.point_cross(b)).0;
  let a_uvw = face_xyz_to_uvw(f, a).0;
  let b_uvw = face_xyz_to_uvw(f, b).0;

  // Scaling u and v of the normal is the same as padding the face vertices.
  let scale_uv = 1.0 + padding;
  let scaled_n = Uvw(Vector::new(scale_uv * norm_uvw.x, scale_uv * norm_uvw.y, norm_uvw.z));
  if !scaled_n.intersects_face() {
    return None;
  }

  // Avoid underflow when normalizing very small normals.
  let max_abs = norm_uvw.x.abs().max(norm_uvw.y.abs()).max(norm_uvw.z.abs());
  if max_abs < 2f64.powi(-511) {
    norm_uvw = norm_uvw * 2f64.powi(563);
  }
  let norm_uvw = norm_uvw.normalize();

  let a_tan = norm_uvw.cross(a_uvw);
  let b_tan = b_uvw.cross(norm_uvw);

  // A combined score of 3 or more means the segment misses the face.
  let (a_uv, a_score) = clip_destination(b_uvw, a_uvw, Uvw(-scaled_n.0), b_tan, a_tan, scale_uv);
  let (b_uv, b_score) = clip_destination(a_uvw, b_uvw, scaled_n, a_tan, b_tan, scale_uv);
  if a_score + b_score < 3 {
    Some((a_uv, b_uv))
  } else {
    None
  }
}

// Clips the B end of AB to the face. The score is 0 when B' lies inside AB, 1 or 2 when it lies
// beyond B or A respectively (B itself is used), and 3 when B cannot be projected either.
fn clip_destination(a: Vector, b: Vector, scaled_n: Uvw, a_tan: Vector, b_tan: Vector, scale_uv: f64) -> (R2Point, u8) {
  let max_safe_uv_coord = 1.0 - FACE_CLIP_ERROR_UV_COORD;
  if b.z > 0.0 {
    let uv = R2Point::new(b.x / b.z, b.y / b.z);
    if uv.x.abs().max(uv.y.abs()) <= max_safe_uv_coord {
      return (uv, 0);
    }
  }

  let mut uv = scaled_n.exit_point(scaled_n.exit_axis()) * scale_uv;
  let p = Vector::new(uv.x, uv.y, 1.0);

  let mut score = 0;
  if (p - a).dot(a_tan) < 0.0 {
    score = 2;
  } else if (p - b).dot(b_tan) < 0.0 {
    score = 1;
  }
  if score > 0 {
    if b.z <= 0.0 {
      score = 3;
    } else {
      uv = R2Point::new(b.x / b.z, b.y / b.z);
    }
  }
  (uv, score)
}

/// Splits AB into per-face segments in traversal order.
///
/// Consecutive segments share an endpoint (expressed in each face's own coordinates), and the
/// first and last segments start at A and end at B.
#[must_use]
pub fn face_segments(a: Point, b: Point) -> Vec<FaceSegment> {
  let (a_face, au, av) = xyz_to_face_uv(a.0);
  let (b_face, bu, bv) = xyz_to_face_uv(b.0);
  let mut segment = FaceSegment { face: a_face, a: R2Point::new(au, av), b: R2Point::new(bu, bv) };
  if a_face == b_face {
    return vec![segment];
  }

  // The normal of AB is the ultimate definition of the line. Rounding may leave an endpoint on a
  // face the line misses; such endpoints are moved onto an adjacent face.
  let ab = a.point_cross(b);
  let (a_face, a_uv) = move_origin_to_valid_face(a_face, a, ab, segment.a);
  let (b_face, b_uv) = move_origin_to_valid_face(b_face, b, -ab, segment.b);

  let mut segments = Vec::new();
  segment.face = a_face;
  segment.a = a_uv;
  let mut face = a_face;
  while face != b_face {
    let n = Uvw(face_xyz_to_uvw(face, ab).0);
    let exit_axis = n.exit_axis();
    segment.b = n.exit_point(exit_axis);
    segments.push(segment);

    let exit_xyz = face_uv_to_xyz(face, segment.b.x, segment.b.y);
    face = next_face(face, segment.b, exit_axis, n, b_face);
    let exit_uvw = face_xyz_to_uvw(face, Point(exit_xyz)).0;
    segment.face = face;
    segment.a = R2Point::new(exit_uvw.x, exit_uvw.y);
  }
  segment.b = b_uv;
  segments.push(segment);
  segments
}

fn move_origin_to_valid_face(mut face: u8, a: Point, ab: Point, a_uv: R2Point) -> (u8, R2Point) {
  let max_safe_uv_coord = 1.0 - FACE_CLIP_ERROR_UV_COORD;
  if a_uv.x.abs().max(a_uv.y.abs()) <= max_safe_uv_coord {
    return (face, a_uv);
  }

  let n = Uvw(face_xyz_to_uvw(face, ab).0);
  if n.intersects_face() {
    // Usable unless the exit point is behind A by more than the error tolerance.
    let uv = n.exit_point(n.exit_axis());
    let exit = face_uv_to_xyz(face, uv.x, uv.y);
    let a_tangent = ab.normalize().cross(a).0;
    if (exit - a.0).dot(a_tangent) >= -FACE_CLIP_ERROR_RADIANS {
      return (face, a_uv);
    }
  }

  // The line misses this face, so it passes through every adjacent face.
  face = if a_uv.x.abs() > a_uv.y.abs() {
    uvw_face(face, 0, usize::from(a_uv.x > 0.0))
  } else {
    uvw_face(face, 1, usize::from(a_uv.y > 0.0))
  };
  let (u, v) = valid_face_xyz_to_uv(face, a.0);
  (face, R2Point::new(u.clamp(-1.0, 1.0), v.clamp(-1.0, 1.0)))
}

fn next_face(face: u8, exit: R2Point, axis: ExitAxis, n: Uvw, target_face: u8) -> u8 {
  let (exit_a, exit_1_minus_a, axis_idx) = match axis {
    ExitAxis::U => (exit.x, exit.y, 0),
    ExitAxis::V => (exit.y, exit.x, 1),
  };
  // When AB exits exactly through a corner and one of the two next faces is the target,
  // go there directly.
  if exit_1_minus_a.abs() == 1.0
    && uvw_face(face, 1 - axis_idx, usize::from(exit_1_minus_a > 0.0)) == target_face
    && sum_equal(exit.x * n.0.x, exit.y * n.0.y, -n.0.z)
  {
    return target_face;
  }
  uvw_face(face, axis_idx, usize::from(exit_a > 0.0))
}

/// Value at `x` of the line through `(a, a1)` and `(b, b1)`, interpolated from the nearer end.
#[must_use]
pub fn interpolate_f64(x: f64, a: f64, b: f64, a1: f64, b1: f64) -> f64 {
  if (a - x).abs() <= (b - x).abs() {
    a1 + (b1 - a1) * (x - a) / (b - a)
  } else {
    b1 + (a1 - b1) * (x - b) / (a - b)
  }
}

/// Clips the planar edge AB to `clip`. Returns the clipped endpoints in the order of A and B,
/// or `None` if AB misses the rectangle.
#[must_use]
pub fn clip_edge(a: R2Point, b: R2Point, clip: &R2Rect) -> Option<(R2Point, R2Point)> {
  let bound = clip_edge_bound(a, b, clip, &R2Rect::from_points(&[a, b]))?;
  let ai = usize::from(a.x > b.x);
  let aj = usize::from(a.y > b.y);
  Some((bound.vertex_ij(ai, aj), bound.vertex_ij(1 - ai, 1 - aj)))
}

/// Bound of the part of AB inside `clip`, or the empty rectangle.
#[must_use]
pub fn clipped_edge_bound(a: R2Point, b: R2Point, clip: &R2Rect) -> R2Rect {
  clip_edge_bound(a, b, clip, &R2Rect::from_points(&[a, b])).unwrap_or_else(R2Rect::empty)
}

/// Shrinks `bound`, a bound of some portion of AB, to the part of AB inside `clip`.
#[must_use]
pub fn clip_edge_bound(a: R2Point, b: R2Point, clip: &R2Rect, bound: &R2Rect) -> Option<R2Rect> {
  // Which diagonal of the bound AB spans decides which endpoints move together.
  let neg_slope = (a.x > b.x) != (a.y > b.y);
  let (bx, by) = clip_bound_axis(a.x, b.x, bound.x, a.y, b.y, bound.y, neg_slope, clip.x)?;
  let (by, bx) = clip_bound_axis(a.y, b.y, by, a.x, b.x, bx, neg_slope, clip.y)?;
  Some(R2Rect::new(bx, by))
}

fn update_endpoint(mut bound: Interval, high_endpoint: bool, value: f64) -> Option<Interval> {
  if high_endpoint {
    if bound.lo > value {
      return None;
    }
    if bound.hi > value {
      bound.hi = value;
    }
  } else {
    if bound.hi < value {
      return None;
    }
    if bound.lo < value {
      bound.lo = value;
    }
  }
  Some(bound)
}

#[allow(clippy::too_many_arguments)]
fn clip_bound_axis(
  a0: f64,
  b0: f64,
  mut bound0: Interval,
  a1: f64,
  b1: f64,
  mut bound1: Interval,
  neg_slope: bool,
  clip: Interval,
) -> Option<(Interval, Interval)> {
  if bound0.lo < clip.lo {
    if bound0.hi < clip.lo {
      return None;
    }
    bound0.lo = clip.lo;
    bound1 = update_endpoint(bound1, neg_slope, interpolate_f64(clip.lo, a0, b0, a1, b1))?;
  }
  if bound0.hi > clip.hi {
    if bound0.lo > clip.hi {
      return None;
    }
    bound0.hi = clip.hi;
    bound1 = update_endpoint(bound1, !neg_slope, interpolate_f64(clip.hi, a0, b0, a1, b1))?;
  }
  Some((bound0, bound1))
}

/// Whether the planar edge AB intersects `r`, within `INTERSECTS_RECT_ERROR_UV_DIST`.
#[must_use]
pub fn edge_intersects_rect(a: R2Point, b: R2Point, r: &R2Rect) -> bool {
  if !r.intersects(&R2Rect::from_points(&[a, b])) {
    return false;
  }
  // The rectangle is crossed iff its extreme vertices along the edge normal straddle AB.
  let n = (b - a).ortho();
  let i = usize::from(n.x >= 0.0);
  let j = usize::from(n.y >= 0.0);
  let max = n.dot(r.vertex_ij(i, j) - a);
  let min = n.dot(r.vertex_ij(1 - i, 1 - j) - a);
  max >= 0.0 && min <= 0.0
}
