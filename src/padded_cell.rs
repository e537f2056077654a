// src/padded_cell.rs

//! Cells with a padded (u,v) bound, for recursive subdivision.

use crate::cellid::lookup::{IJ_TO_POS, POS_TO_IJ, POS_TO_ORIENTATION};
use crate::cellid::{face_ij_orientation, from_face_ij, ij_level_to_bound_uv, size_ij, CellId};
use crate::constants::{DBL_EPSILON, INVERT_MASK, MAX_LEVEL, SWAP_MASK};
use crate::coords::{face_siti_to_xyz, siti_to_st, st_to_ij, st_to_uv, uv_to_st};
use crate::math::r1::Interval as R1Interval;
use crate::math::r2::Rect as R2Rect;
use crate::point::Point;

/// A cell whose (u,v) bound is expanded on every side by `padding`.
///
/// Children are built incrementally from their parent, which is cheaper than going through
/// `CellId` when walking down the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddedCell {
  id: CellId,
  padding: f64,
  bound: R2Rect,
  i_lo: i32,
  j_lo: i32,
  orientation: u8,
  level: i32,
}

impl PaddedCell {
  #[must_use]
  pub fn from_cell_id(id: CellId, padding: f64) -> PaddedCell {
    if id.is_face() {
      let limit = padding + 1.0;
      return PaddedCell {
        id,
        padding,
        bound: R2Rect::new(R1Interval::new(-limit, limit), R1Interval::new(-limit, limit)),
        i_lo: 0,
        j_lo: 0,
        orientation: id.face() & 1,
        level: 0,
      };
    }
    let (_, i, j, orientation) = face_ij_orientation(id);
    let level = id.level();
    let ij_size = size_ij(level);
    PaddedCell {
      id,
      padding,
      bound: ij_level_to_bound_uv(i, j, level).expanded_by_margin(padding),
      i_lo: i & -ij_size,
      j_lo: j & -ij_size,
      orientation,
      level,
    }
  }

  /// The child at position (i, j) in (u,v) space, each 0 or 1.
  #[must_use]
  pub fn from_parent_ij(parent: &PaddedCell, i: usize, j: usize) -> PaddedCell {
    let pos = IJ_TO_POS[parent.orientation as usize][2 * i + j] as usize;
    let level = parent.level + 1;
    let ij_size = size_ij(level);
    let middle = parent.middle();
    let mut bound = parent.bound;
    // One corner comes from the parent bound and the opposite corner from the middle.
    if i == 1 {
      bound.x.lo = middle.x.lo;
    } else {
      bound.x.hi = middle.x.hi;
    }
    if j == 1 {
      bound.y.lo = middle.y.lo;
    } else {
      bound.y.hi = middle.y.hi;
    }
    PaddedCell {
      id: parent.id.children()[pos],
      padding: parent.padding,
      bound,
      i_lo: parent.i_lo + i as i32 * ij_size,
      j_lo: parent.j_lo + j as i32 * ij_size,
      orientation: parent.orientation ^ POS_TO_ORIENTATION[pos],
      level,
    }
  }

  #[inline]
  #[must_use]
  pub fn id(&self) -> CellId {
    self.id
  }

  #[inline]
  #[must_use]
  pub fn padding(&self) -> f64 {
    self.padding
  }

  #[inline]
  #[must_use]
  pub fn level(&self) -> i32 {
    self.level
  }

  /// Padded (u,v) bound of the cell.
  #[inline]
  #[must_use]
  pub fn bound(&self) -> R2Rect {
    self.bound
  }

  /// The padded square around the cell center that belongs to all four children.
  #[must_use]
  pub fn middle(&self) -> R2Rect {
    let ij_size = size_ij(self.level);
    let u = st_to_uv(siti_to_st((2 * self.i_lo + ij_size) as u32));
    let v = st_to_uv(siti_to_st((2 * self.j_lo + ij_size) as u32));
    R2Rect::new(
      R1Interval::new(u - self.padding, u + self.padding),
      R1Interval::new(v - self.padding, v + self.padding),
    )
  }

  /// (i, j) position of the child at Hilbert curve position `pos`.
  #[must_use]
  pub fn child_ij(&self, pos: usize) -> (usize, usize) {
    let ij = POS_TO_IJ[self.orientation as usize][pos] as usize;
    (ij >> 1, ij & 1)
  }

  /// Center of the unpadded cell.
  #[must_use]
  pub fn center(&self) -> Point {
    let ij_size = size_ij(self.level);
    let si = (2 * self.i_lo + ij_size) as u32;
    let ti = (2 * self.j_lo + ij_size) as u32;
    face_siti_to_xyz(self.id.face(), si, ti).normalize()
  }

  /// Vertex where the Hilbert curve enters the cell. Equal to the exit vertex of the previous
  /// cell at the same level, wrapping from face 5 to face 0.
  #[must_use]
  pub fn entry_vertex(&self) -> Point {
    // (0,0) unless the axis directions are reversed, then (1,1).
    let mut i = self.i_lo;
    let mut j = self.j_lo;
    if self.orientation & INVERT_MASK != 0 {
      let ij_size = size_ij(self.level);
      i += ij_size;
      j += ij_size;
    }
    face_siti_to_xyz(self.id.face(), (2 * i) as u32, (2 * j) as u32).normalize()
  }

  /// Vertex where the Hilbert curve leaves the cell.
  #[must_use]
  pub fn exit_vertex(&self) -> Point {
    // (1,0) when the axes are both or neither swapped and inverted, otherwise (0,1).
    let mut i = self.i_lo;
    let mut j = self.j_lo;
    let ij_size = size_ij(self.level);
    if self.orientation == 0 || self.orientation == SWAP_MASK | INVERT_MASK {
      i += ij_size;
    } else {
      j += ij_size;
    }
    face_siti_to_xyz(self.id.face(), (2 * i) as u32, (2 * j) as u32).normalize()
  }

  /// The smallest descendant (or self) whose padded bound contains `rect`.
  ///
  /// `rect` must intersect this cell's padded bound.
  #[must_use]
  pub fn shrink_to_fit(&self, rect: &R2Rect) -> CellId {
    // A rect spanning the cell center along either axis cannot shrink.
    if self.level == 0 && (rect.x.contains(0.0) || rect.y.contains(0.0)) {
      return self.id;
    }
    let ij_size = size_ij(self.level);
    if rect.x.contains(st_to_uv(siti_to_st((2 * self.i_lo + ij_size) as u32)))
      || rect.y.contains(st_to_uv(siti_to_st((2 * self.j_lo + ij_size) as u32)))
    {
      return self.id;
    }

    // Find the highest bit at which the spanned min and max (i,j) differ; that is the first
    // level where two children intersect the rect. 1.5 ulps covers the error in uv_to_st.
    let padded = rect.expanded_by_margin(self.padding + 1.5 * DBL_EPSILON);
    let i_min = self.i_lo.max(st_to_ij(uv_to_st(padded.x.lo)));
    let i_xor = i_min ^ (self.i_lo + ij_size - 1).min(st_to_ij(uv_to_st(padded.x.hi)));
    let j_min = self.j_lo.max(st_to_ij(uv_to_st(padded.y.lo)));
    let j_xor = j_min ^ (self.j_lo + ij_size - 1).min(st_to_ij(uv_to_st(padded.y.hi)));

    let level_msb = (((i_xor | j_xor) as u64) << 1) + 1;
    let level = MAX_LEVEL - (63 - level_msb.leading_zeros() as i32);
    if level <= self.level {
      return self.id;
    }
    from_face_ij(self.id.face(), i_min, j_min).parent(level)
  }
}
