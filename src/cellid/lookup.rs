// src/cellid/lookup.rs

//! Hilbert curve tables and the (face, i, j) <-> `CellId` conversions built on them.

use super::CellId;
use crate::constants::{INVERT_MASK, LOOKUP_BITS, MAX_LEVEL, MAX_SIZE, POS_BITS, SWAP_MASK};
use crate::coords::{face_uv_to_xyz, st_to_ij, xyz_to_face_uv};

/// (i, j) quadrant, as `2*i + j`, visited at each curve position for each orientation.
pub const POS_TO_IJ: [[u8; 4]; 4] = [
  [0, 1, 3, 2], // canonical order:    (0,0), (0,1), (1,1), (1,0)
  [0, 2, 3, 1], // axes swapped:       (0,0), (1,0), (1,1), (0,1)
  [3, 2, 0, 1], // bits inverted:      (1,1), (1,0), (0,0), (0,1)
  [3, 1, 0, 2], // swapped & inverted: (1,1), (0,1), (0,0), (1,0)
];

/// Inverse of `POS_TO_IJ`: curve position of each (i, j) quadrant.
pub const IJ_TO_POS: [[u8; 4]; 4] = [
  [0, 1, 3, 2],
  [0, 3, 1, 2],
  [2, 3, 1, 0],
  [2, 1, 3, 0],
];

/// Orientation change applied when descending into the subcell at each curve position.
pub const POS_TO_ORIENTATION: [u8; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

const LOOKUP_LEN: usize = 1 << (2 * LOOKUP_BITS + 2);

struct Tables {
  pos: [u16; LOOKUP_LEN],
  ij: [u16; LOOKUP_LEN],
}

// Maps "iiiijjjjoo" keys to "ppppppppoo" values (pos) and back (ij), 4 levels at a time.
const fn build_tables() -> Tables {
  let mut pos_table = [0u16; LOOKUP_LEN];
  let mut ij_table = [0u16; LOOKUP_LEN];
  let mut orig = 0usize;
  while orig < 4 {
    let mut pos = 0usize;
    while pos < (1 << (2 * LOOKUP_BITS)) {
      let mut orientation = orig;
      let mut i = 0usize;
      let mut j = 0usize;
      let mut k = 0;
      while k < LOOKUP_BITS {
        let sub = (pos >> (2 * (LOOKUP_BITS - 1 - k))) & 3;
        let r = POS_TO_IJ[orientation][sub] as usize;
        i = (i << 1) + (r >> 1);
        j = (j << 1) + (r & 1);
        orientation ^= POS_TO_ORIENTATION[sub] as usize;
        k += 1;
      }
      let ij = (i << LOOKUP_BITS) + j;
      pos_table[(ij << 2) + orig] = ((pos << 2) + orientation) as u16;
      ij_table[(pos << 2) + orig] = ((ij << 2) + orientation) as u16;
      pos += 1;
    }
    orig += 1;
  }
  Tables { pos: pos_table, ij: ij_table }
}

static TABLES: Tables = build_tables();

/// Leaf cell id of face `face` at leaf coordinates (i, j).
#[must_use]
pub fn from_face_ij(face: u8, i: i32, j: i32) -> CellId {
  // Built one bit short and shifted left at the end to make room for the terminator.
  let mut n = u64::from(face) << (POS_BITS - 1);
  let mut bits = usize::from(face & SWAP_MASK);
  let mask = (1usize << LOOKUP_BITS) - 1;
  for k in (0..8u32).rev() {
    bits += ((i as usize >> (k * LOOKUP_BITS)) & mask) << (LOOKUP_BITS + 2);
    bits += ((j as usize >> (k * LOOKUP_BITS)) & mask) << 2;
    bits = usize::from(TABLES.pos[bits]);
    n |= ((bits >> 2) as u64) << (k * 2 * LOOKUP_BITS);
    bits &= usize::from(SWAP_MASK | INVERT_MASK);
  }
  CellId(n * 2 + 1)
}

/// Leaf cell id for (i, j) which may lie just outside `face`, wrapped onto the adjacent face.
#[must_use]
pub fn from_face_ij_wrap(face: u8, i: i32, j: i32) -> CellId {
  let i = i.clamp(-1, MAX_SIZE);
  let j = j.clamp(-1, MAX_SIZE);

  // Linear projection to a point barely outside the face, then reprojected onto the right face.
  let scale = 1.0 / f64::from(MAX_SIZE);
  let limit = f64::from_bits(1.0f64.to_bits() + 1);
  let u = (scale * f64::from((i << 1) + 1 - MAX_SIZE)).clamp(-limit, limit);
  let v = (scale * f64::from((j << 1) + 1 - MAX_SIZE)).clamp(-limit, limit);

  let (f, u, v) = xyz_to_face_uv(face_uv_to_xyz(face, u, v));
  from_face_ij(f, st_to_ij(0.5 * (u + 1.0)), st_to_ij(0.5 * (v + 1.0)))
}

#[must_use]
pub fn from_face_ij_same(face: u8, i: i32, j: i32, same_face: bool) -> CellId {
  if same_face {
    from_face_ij(face, i, j)
  } else {
    from_face_ij_wrap(face, i, j)
  }
}

/// Face, leaf (i, j) and Hilbert curve orientation of a cell.
///
/// For non-leaf cells the terminator bit is decoded as part of the position, so (i, j) is a
/// leaf next to the cell center rather than its lower-left corner.
#[must_use]
pub fn face_ij_orientation(id: CellId) -> (u8, i32, i32, u8) {
  let face = id.face();
  let mut orientation = usize::from(face & SWAP_MASK);
  let mut i = 0i32;
  let mut j = 0i32;
  // The first step only has 2 levels of position below the face bits.
  let mut nbits = MAX_LEVEL as u32 - 7 * LOOKUP_BITS;
  for k in (0..8u32).rev() {
    orientation += (((id.0 >> (k * 2 * LOOKUP_BITS + 1)) as usize) & ((1 << (2 * nbits)) - 1)) << 2;
    orientation = usize::from(TABLES.ij[orientation]);
    i += ((orientation >> (LOOKUP_BITS + 2)) as i32) << (k * LOOKUP_BITS);
    j += (((orientation >> 2) & ((1 << LOOKUP_BITS) - 1)) as i32) << (k * LOOKUP_BITS);
    orientation &= usize::from(SWAP_MASK | INVERT_MASK);
    nbits = LOOKUP_BITS;
  }

  // Each "00" pair in the trailing 10*0 suffix of a non-leaf id flips the swap bit.
  if id.lsb() & 0x1111_1111_1111_1110 != 0 {
    orientation ^= usize::from(SWAP_MASK);
  }
  (face, i, j, orientation as u8)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tables_are_inverse() {
    for orientation in 0..4 {
      for pos in 0..4 {
        let ij = POS_TO_IJ[orientation][pos];
        assert_eq!(IJ_TO_POS[orientation][ij as usize], pos as u8);
      }
    }
    for key in 0..LOOKUP_LEN {
      let value = usize::from(TABLES.pos[key]);
      // Going forward then back restores the ij key with the same starting orientation.
      let back = usize::from(TABLES.ij[(value & !3) | (key & 3)]);
      assert_eq!(back >> 2, key >> 2, "round trip of lookup key {}", key);
    }
  }

  #[test]
  fn test_face_ij_round_trip() {
    for face in 0..6u8 {
      for &(i, j) in &[(0, 0), (MAX_SIZE - 1, MAX_SIZE - 1), (12345, 987654), (MAX_SIZE / 2, 3)] {
        let id = from_face_ij(face, i, j);
        assert!(id.is_leaf());
        let (f, ii, jj, _) = face_ij_orientation(id);
        assert_eq!((f, ii, jj), (face, i, j));
      }
    }
  }

  #[test]
  fn test_wrap_onto_adjacent_face() {
    let id = from_face_ij_wrap(0, -1, 0);
    assert_ne!(id.face(), 0, "i = -1 on face 0 lands on a neighboring face");
    assert_eq!(from_face_ij_same(1, 5, 5, true), from_face_ij(1, 5, 5));
  }
}
