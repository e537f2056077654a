// src/cellid/mod.rs

//! 64-bit hierarchical cell identifiers.
//!
//! Bit layout, from the most significant bit:
//!
//! ```text
//!   fff pp pp ... pp 1 00 ... 00
//!   \_/ \_________/  ^ \______/
//!  face  2 bits per  |  2 bits per level below the cell's level
//!        level       terminator (the lowest set bit)
//! ```
//!
//! Leaf cells (level 30) have the terminator in bit 0. Ordering the raw integers walks a
//! Hilbert curve over each face in turn, and every cell's descendants occupy the contiguous
//! id range `[range_min, range_max]`.

pub mod lookup;
pub mod neighbors;
pub mod string_conv;

use crate::constants::{FACE_BITS_OFFSET, MAX_LEVEL, MAX_SIZE, NUM_FACES, POS_BITS};
use crate::coords::{face_uv_to_xyz, siti_to_st, st_to_ij, st_to_uv, uv_to_st, xyz_to_face_uv};
use crate::latlng::LatLng;
use crate::math::r1::Interval;
use crate::math::r2::{Point as R2Point, Rect as R2Rect};
use crate::math::r3::Vector;
use crate::point::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use lookup::{face_ij_orientation, from_face_ij, from_face_ij_same, from_face_ij_wrap};
pub use string_conv::{cell_id_from_token, cell_id_to_token};

/// A cell on the S2 hierarchy, identified by a 64-bit integer.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellId(pub u64);

/// Offset added to wrap ids from the end of face 5 back to the start of face 0.
const WRAP_OFFSET: u64 = (NUM_FACES as u64) << POS_BITS;

/// Lowest set bit of a cell at `level`.
#[inline(always)]
#[must_use]
pub const fn lsb_for_level(level: i32) -> u64 {
  1u64 << (2 * (MAX_LEVEL - level))
}

/// Edge length in leaf cells of a cell at `level`.
#[inline(always)]
#[must_use]
pub const fn size_ij(level: i32) -> i32 {
  1 << (MAX_LEVEL - level)
}

/// The (u, v) bound of the cell at `level` containing leaf (i, j).
#[must_use]
pub fn ij_level_to_bound_uv(i: i32, j: i32, level: i32) -> R2Rect {
  let cell_size = size_ij(level);
  let x_lo = i & -cell_size;
  let y_lo = j & -cell_size;
  R2Rect::new(
    Interval::new(
      st_to_uv(crate::coords::ij_to_st_min(x_lo)),
      st_to_uv(crate::coords::ij_to_st_min(x_lo + cell_size)),
    ),
    Interval::new(
      st_to_uv(crate::coords::ij_to_st_min(y_lo)),
      st_to_uv(crate::coords::ij_to_st_min(y_lo + cell_size)),
    ),
  )
}

impl CellId {
  /// The invalid id 0.
  #[inline(always)]
  #[must_use]
  pub const fn none() -> CellId {
    CellId(0)
  }

  /// An invalid id greater than every valid id.
  #[inline(always)]
  #[must_use]
  pub const fn sentinel() -> CellId {
    CellId(u64::MAX)
  }

  /// The level 0 cell of a face.
  #[inline(always)]
  #[must_use]
  pub const fn from_face(face: u8) -> CellId {
    CellId(((face as u64) << FACE_BITS_OFFSET) + lsb_for_level(0))
  }

  /// The cell at `level` containing the leaf at curve position `pos` on `face`.
  #[must_use]
  pub const fn from_face_pos_level(face: u8, pos: u64, level: i32) -> CellId {
    CellId((((face as u64) << FACE_BITS_OFFSET) + pos) | 1).parent(level)
  }

  /// The leaf cell containing `p`.
  #[must_use]
  pub fn from_point(p: Point) -> CellId {
    let (f, u, v) = xyz_to_face_uv(p.0);
    from_face_ij(f, st_to_ij(uv_to_st(u)), st_to_ij(uv_to_st(v)))
  }

  #[must_use]
  pub fn from_lat_lng(ll: LatLng) -> CellId {
    CellId::from_point(ll.to_point())
  }

  /// First cell in curve order at `level`.
  #[must_use]
  pub const fn begin(level: i32) -> CellId {
    CellId::from_face(0).child_begin_at_level(level)
  }

  /// One past the last cell in curve order at `level`.
  #[must_use]
  pub const fn end(level: i32) -> CellId {
    CellId::from_face(NUM_FACES - 1).child_end_at_level(level)
  }

  #[inline(always)]
  #[must_use]
  pub const fn face(self) -> u8 {
    (self.0 >> POS_BITS) as u8
  }

  /// Position along the Hilbert curve over the face, including the terminator bit.
  #[inline(always)]
  #[must_use]
  pub const fn pos(self) -> u64 {
    self.0 & (u64::MAX >> 3)
  }

  /// Subdivision level, 0 for faces through 30 for leaves. Undefined for invalid ids.
  #[inline(always)]
  #[must_use]
  pub const fn level(self) -> i32 {
    MAX_LEVEL - (self.0.trailing_zeros() as i32 >> 1)
  }

  #[inline(always)]
  #[must_use]
  pub const fn lsb(self) -> u64 {
    self.0 & self.0.wrapping_neg()
  }

  #[inline(always)]
  #[must_use]
  pub const fn is_valid(self) -> bool {
    self.face() < NUM_FACES && (self.lsb() & 0x1555_5555_5555_5555) != 0
  }

  #[inline(always)]
  #[must_use]
  pub const fn is_leaf(self) -> bool {
    self.0 & 1 != 0
  }

  #[inline(always)]
  #[must_use]
  pub const fn is_face(self) -> bool {
    self.0 & (lsb_for_level(0) - 1) == 0
  }

  /// Ancestor at `level`, which must not exceed this cell's level.
  #[inline(always)]
  #[must_use]
  pub const fn parent(self, level: i32) -> CellId {
    let lsb = lsb_for_level(level);
    CellId((self.0 & lsb.wrapping_neg()) | lsb)
  }

  /// Parent one level up. Not valid for face cells.
  #[inline(always)]
  #[must_use]
  pub const fn immediate_parent(self) -> CellId {
    let nlsb = self.lsb() << 2;
    CellId((self.0 & nlsb.wrapping_neg()) | nlsb)
  }

  /// Position of this cell's ancestor at `level` within its parent, in 0..4.
  /// `level` must be in `1..=self.level()`.
  #[inline(always)]
  #[must_use]
  pub const fn child_position(self, level: i32) -> u8 {
    ((self.0 >> (2 * (MAX_LEVEL - level) + 1)) & 3) as u8
  }

  /// The four children in curve order. Not valid for leaves.
  #[must_use]
  pub const fn children(self) -> [CellId; 4] {
    let lsb = self.lsb();
    let c0 = self.0 - lsb + (lsb >> 2);
    let step = lsb >> 1;
    [CellId(c0), CellId(c0 + step), CellId(c0 + 2 * step), CellId(c0 + 3 * step)]
  }

  #[inline(always)]
  #[must_use]
  pub const fn child_begin(self) -> CellId {
    let ol = self.lsb();
    CellId(self.0 - ol + (ol >> 2))
  }

  #[inline(always)]
  #[must_use]
  pub const fn child_begin_at_level(self, level: i32) -> CellId {
    CellId(self.0 - self.lsb() + lsb_for_level(level))
  }

  /// One past the last child. May be an invalid id.
  #[inline(always)]
  #[must_use]
  pub const fn child_end(self) -> CellId {
    let ol = self.lsb();
    CellId(self.0.wrapping_add(ol).wrapping_add(ol >> 2))
  }

  #[inline(always)]
  #[must_use]
  pub const fn child_end_at_level(self, level: i32) -> CellId {
    CellId(self.0.wrapping_add(self.lsb()).wrapping_add(lsb_for_level(level)))
  }

  /// Next cell at the same level along the curve. Crosses faces but not from face 5 to 0.
  #[inline(always)]
  #[must_use]
  pub const fn next(self) -> CellId {
    CellId(self.0.wrapping_add(self.lsb() << 1))
  }

  #[inline(always)]
  #[must_use]
  pub const fn prev(self) -> CellId {
    CellId(self.0.wrapping_sub(self.lsb() << 1))
  }

  /// Like `next`, but wraps from the last cell of face 5 to the first of face 0.
  #[must_use]
  pub const fn next_wrap(self) -> CellId {
    let n = self.next();
    if n.0 < WRAP_OFFSET {
      n
    } else {
      CellId(n.0.wrapping_sub(WRAP_OFFSET))
    }
  }

  /// Like `prev`, but wraps from the first cell of face 0 to the last of face 5.
  #[must_use]
  pub const fn prev_wrap(self) -> CellId {
    let p = self.prev();
    if p.0 < WRAP_OFFSET {
      p
    } else {
      CellId(p.0.wrapping_add(WRAP_OFFSET))
    }
  }

  /// Moves `steps` cells along the curve at this level, clamped to the valid range.
  #[must_use]
  pub fn advance(self, mut steps: i64) -> CellId {
    if steps == 0 {
      return self;
    }
    let step_shift = 2 * (MAX_LEVEL - self.level()) + 1;
    if steps < 0 {
      let min_steps = -((self.0 >> step_shift) as i64);
      steps = steps.max(min_steps);
    } else {
      let max_steps = ((WRAP_OFFSET + self.lsb() - self.0) >> step_shift) as i64;
      steps = steps.min(max_steps);
    }
    CellId(self.0.wrapping_add((steps as u64) << step_shift))
  }

  /// Moves `steps` cells along the curve at this level, wrapping around the sphere.
  #[must_use]
  pub fn advance_wrap(self, mut steps: i64) -> CellId {
    if steps == 0 {
      return self;
    }
    let shift = 2 * (MAX_LEVEL - self.level()) + 1;
    let wrap = (WRAP_OFFSET >> shift) as i64;
    if steps < 0 {
      let min = -((self.0 >> shift) as i64);
      if steps < min {
        steps %= wrap;
        if steps < min {
          steps += wrap;
        }
      }
    } else {
      let max = ((WRAP_OFFSET - self.0) >> shift) as i64;
      if steps > max {
        steps %= wrap;
        if steps > max {
          steps -= wrap;
        }
      }
    }
    CellId(self.0.wrapping_add((steps as u64) << shift))
  }

  /// Number of cells at this level from `CellId::begin(level)` to this cell.
  #[must_use]
  pub const fn distance_from_begin(self) -> i64 {
    (self.0 >> (2 * (MAX_LEVEL - self.level()) + 1)) as i64
  }

  /// First leaf cell in this cell's subtree.
  #[inline(always)]
  #[must_use]
  pub const fn range_min(self) -> CellId {
    CellId(self.0 - (self.lsb() - 1))
  }

  /// Last leaf cell in this cell's subtree.
  #[inline(always)]
  #[must_use]
  pub const fn range_max(self) -> CellId {
    CellId(self.0 + (self.lsb() - 1))
  }

  /// Whether `other` is this cell or one of its descendants.
  #[inline(always)]
  #[must_use]
  pub const fn contains(self, other: CellId) -> bool {
    self.range_min().0 <= other.0 && other.0 <= self.range_max().0
  }

  #[inline(always)]
  #[must_use]
  pub const fn intersects(self, other: CellId) -> bool {
    other.range_min().0 <= self.range_max().0 && other.range_max().0 >= self.range_min().0
  }

  /// Largest cell with the same `range_min` whose `range_max` is below `limit`.
  ///
  /// Repeated calls walk out the minimal covering of a leaf range; a `limit` at or before
  /// this cell's start returns `limit` itself.
  #[must_use]
  pub fn max_tile(self, limit: CellId) -> CellId {
    let start = self.range_min();
    if start >= limit.range_min() {
      return limit;
    }
    let mut id = self;
    if id.range_max() >= limit {
      // Too large: shrink until it fits. Ends before leaf level since start < limit.
      loop {
        id = id.child_begin();
        if id.range_max() < limit {
          return id;
        }
      }
    }
    while !id.is_face() {
      let parent = id.immediate_parent();
      if parent.range_min() != start || parent.range_max() >= limit {
        break;
      }
      id = parent;
    }
    id
  }

  /// Level of the lowest common ancestor, or `None` if the cells are on different faces.
  #[must_use]
  pub fn common_ancestor_level(self, other: CellId) -> Option<i32> {
    let bits = (self.0 ^ other.0).max(self.lsb()).max(other.lsb());
    let msb_pos = 63 - bits.leading_zeros() as i32;
    if msb_pos > 60 {
      return None;
    }
    Some((60 - msb_pos) >> 1)
  }

  /// Face and (si, ti) of the cell center.
  #[must_use]
  pub fn face_siti(self) -> (u8, u32, u32) {
    let (face, i, j, _) = face_ij_orientation(self);
    let delta = if self.is_leaf() {
      1
    } else if (i ^ (self.0 >> 2) as i32) & 1 != 0 {
      2
    } else {
      0
    };
    (face, (2 * i + delta) as u32, (2 * j + delta) as u32)
  }

  /// Unnormalized center of the cell.
  #[must_use]
  pub fn to_point_raw(self) -> Vector {
    let (face, si, ti) = self.face_siti();
    face_uv_to_xyz(face, st_to_uv(siti_to_st(si)), st_to_uv(siti_to_st(ti)))
  }

  /// Center of the cell on the sphere.
  #[must_use]
  pub fn to_point(self) -> Point {
    Point(self.to_point_raw().normalize())
  }

  #[must_use]
  pub fn to_lat_lng(self) -> LatLng {
    LatLng::from_point(self.to_point())
  }

  /// Center of the cell in (s, t) space.
  #[must_use]
  pub fn center_st(self) -> R2Point {
    let (_, si, ti) = self.face_siti();
    R2Point::new(siti_to_st(si), siti_to_st(ti))
  }

  /// Center of the cell in (u, v) space.
  #[must_use]
  pub fn center_uv(self) -> R2Point {
    let (_, si, ti) = self.face_siti();
    R2Point::new(st_to_uv(siti_to_st(si)), st_to_uv(siti_to_st(ti)))
  }

  /// Bound of the cell in (s, t) space.
  #[must_use]
  pub fn bound_st(self) -> R2Rect {
    let s = crate::coords::ij_to_st_min(size_ij(self.level()));
    R2Rect::from_center_size(self.center_st(), R2Point::new(s, s))
  }

  /// Bound of the cell in (u, v) space.
  #[must_use]
  pub fn bound_uv(self) -> R2Rect {
    let (_, i, j, _) = face_ij_orientation(self);
    ij_level_to_bound_uv(i, j, self.level())
  }
}

impl std::fmt::Debug for CellId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "CellId({})", cell_id_to_token(*self))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_face_cells() {
    for face in 0..NUM_FACES {
      let id = CellId::from_face(face);
      assert!(id.is_valid() && id.is_face());
      assert_eq!(id.face(), face);
      assert_eq!(id.level(), 0);
    }
    assert!(!CellId::none().is_valid());
    assert!(!CellId::sentinel().is_valid());
  }

  #[test]
  fn test_parent_child_relationships() {
    let id = CellId::from_face_pos_level(3, 0x12345678, MAX_LEVEL - 4);
    assert!(id.is_valid());
    assert_eq!(id.face(), 3);
    assert_eq!(id.pos(), 0x12345700);
    assert_eq!(id.level(), MAX_LEVEL - 4);
    assert!(!id.is_leaf());

    assert_eq!(id.child_begin_at_level(id.level() + 2).pos(), 0x12345610);
    assert_eq!(id.child_begin().pos(), 0x12345640);
    assert_eq!(id.children()[0], id.child_begin());
    assert_eq!(id.immediate_parent().pos(), 0x12345400);
    assert_eq!(id.parent(id.level() - 2).pos(), 0x12345000);

    assert!(id.child_begin() < id);
    assert!(id.child_end() > id);
    assert_eq!(id.child_begin().next().next().next().next(), id.child_end());
    assert_eq!(id.child_begin_at_level(MAX_LEVEL), id.range_min());
    assert_eq!(id.child_end_at_level(MAX_LEVEL), id.range_max().next());
    assert_eq!(id.range_min().0 + id.range_max().0, 2 * id.0);
  }

  #[test]
  fn test_wrapping() {
    assert_eq!(CellId::from_face(5).next_wrap(), CellId::from_face(0));
    assert_eq!(CellId::from_face(0).prev_wrap(), CellId::from_face(5));
    let last = CellId::end(MAX_LEVEL).prev();
    assert_eq!(last.next_wrap(), CellId::begin(MAX_LEVEL));
    assert_eq!(CellId::begin(7).advance_wrap(-1), CellId::end(7).prev());
    assert_eq!(CellId::begin(0).advance(7), CellId::end(0));
    assert_eq!(CellId::begin(0).advance(6), CellId::end(0));
    assert_eq!(CellId::from_face(5).advance_wrap(2), CellId::from_face(1));
  }

  #[test]
  fn test_distance_from_begin() {
    assert_eq!(CellId::end(0).distance_from_begin(), 6);
    assert_eq!(CellId::end(MAX_LEVEL).distance_from_begin(), 6 * (1i64 << (2 * MAX_LEVEL)));
    assert_eq!(CellId::begin(MAX_LEVEL).distance_from_begin(), 0);
    let id = CellId::from_face_pos_level(3, 0x12345678, MAX_LEVEL - 4);
    assert_eq!(CellId::begin(id.level()).advance(id.distance_from_begin()), id);
  }

  #[test]
  fn test_max_tile() {
    for level in [0, 5, 17, 29] {
      let id = CellId::begin(level);
      // The tile ending exactly at our range end is the cell itself.
      assert_eq!(id.range_min().max_tile(id.range_max().next()), id);
      assert_eq!(id.max_tile(id), id, "limit at start returns the limit");
    }
    let id = CellId::from_face_pos_level(1, 1 << 40, 10);
    assert_eq!(id.child_begin().max_tile(id.child_begin().next().next()), id.child_begin());
  }

  #[test]
  fn test_common_ancestor_level() {
    let a = CellId::from_face(0);
    assert_eq!(a.common_ancestor_level(a), Some(0));
    let leaf = a.child_begin_at_level(30);
    assert_eq!(leaf.common_ancestor_level(leaf), Some(30));
    assert_eq!(leaf.common_ancestor_level(a), Some(0));
    assert_eq!(CellId::from_face(5).common_ancestor_level(a), None);
    let c = CellId::from_face(2).child_begin_at_level(3);
    assert_eq!(c.common_ancestor_level(c.next().child_begin_at_level(10)), Some(2));
  }

  #[test]
  fn test_point_round_trip() {
    for face in 0..NUM_FACES {
      for level in [0, 1, 10, 30] {
        let steps = if level == 0 { 0 } else { 3 };
        let id = CellId::from_face(face).child_begin_at_level(level).advance(steps);
        let p = id.to_point();
        assert_eq!(CellId::from_point(p).parent(level), id, "center of {:?}", id);
      }
    }
  }

  #[test]
  fn test_bounds() {
    let id = CellId::from_face(0);
    let uv = id.bound_uv();
    assert_eq!(uv.x, Interval::new(-1.0, 1.0));
    assert_eq!(uv.y, Interval::new(-1.0, 1.0));
    assert_eq!(id.center_uv(), R2Point::new(0.0, 0.0));
    assert_eq!(id.bound_st(), R2Rect::new(Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)));
    assert_eq!(ij_level_to_bound_uv(MAX_SIZE - 1, 0, 1).x.hi, 1.0);
  }
}
