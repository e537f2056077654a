// src/cellid/neighbors.rs

//! Neighbor finding across cell and face boundaries.

use super::lookup::{face_ij_orientation, from_face_ij_same, from_face_ij_wrap};
use super::{size_ij, CellId};
use crate::constants::MAX_SIZE;

impl CellId {
  /// The four cells at this level sharing an edge with this cell, in the order
  /// down, right, up, left (relative to the face's (i, j) axes).
  #[must_use]
  pub fn edge_neighbors(self) -> [CellId; 4] {
    let level = self.level();
    let size = size_ij(level);
    let (f, i, j, _) = face_ij_orientation(self);
    [
      from_face_ij_wrap(f, i, j - size).parent(level),
      from_face_ij_wrap(f, i + size, j).parent(level),
      from_face_ij_wrap(f, i, j + size).parent(level),
      from_face_ij_wrap(f, i - size, j).parent(level),
    ]
  }

  /// Cells at `level` sharing the vertex of this cell closest to its center's position.
  ///
  /// Usually four; three when the vertex is one of the eight cube corners. `level` must be
  /// less than this cell's level.
  #[must_use]
  pub fn vertex_neighbors(self, level: i32) -> Vec<CellId> {
    let half_size = size_ij(level + 1);
    let size = half_size << 1;
    let (f, i, j, _) = face_ij_orientation(self);

    let (ioffset, isame) = if i & half_size != 0 {
      (size, i + size < MAX_SIZE)
    } else {
      (-size, i - size >= 0)
    };
    let (joffset, jsame) = if j & half_size != 0 {
      (size, j + size < MAX_SIZE)
    } else {
      (-size, j - size >= 0)
    };

    let mut results = vec![
      self.parent(level),
      from_face_ij_same(f, i + ioffset, j, isame).parent(level),
      from_face_ij_same(f, i, j + joffset, jsame).parent(level),
    ];
    if isame || jsame {
      results.push(from_face_ij_same(f, i + ioffset, j + joffset, isame && jsame).parent(level));
    }
    results
  }

  /// All cells at `level` adjacent to this cell (sharing an edge or a vertex), excluding
  /// this cell's own descendants. `level` must be at least this cell's level.
  #[must_use]
  pub fn all_neighbors(self, level: i32) -> Vec<CellId> {
    let mut neighbors = Vec::new();
    let (face, i, j, _) = face_ij_orientation(self);

    // Normalize (i, j) to the lower-left leaf of this cell.
    let size = size_ij(self.level());
    let i = i & -size;
    let j = j & -size;
    let nbr_size = size_ij(level);

    // Loop test is at the end to avoid overflow past MAX_SIZE.
    let mut k = -nbr_size;
    loop {
      let same_face = if k < 0 {
        j + k >= 0
      } else if k >= size {
        j + k < MAX_SIZE
      } else {
        neighbors.push(from_face_ij_same(face, i + k, j - nbr_size, j - size >= 0).parent(level));
        neighbors.push(from_face_ij_same(face, i + k, j + size, j + size < MAX_SIZE).parent(level));
        true
      };
      neighbors.push(from_face_ij_same(face, i - nbr_size, j + k, same_face && i - size >= 0).parent(level));
      neighbors.push(from_face_ij_same(face, i + size, j + k, same_face && i + size < MAX_SIZE).parent(level));
      if k >= size {
        break;
      }
      k += nbr_size;
    }
    neighbors
  }
}
