// src/cell_union/encode.rs

//! Lossless binary coding of cell unions.
//!
//! Layout: `[u8 version][uvarint count][u64 little-endian id] * count`.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::warn;

use super::CellUnion;
use crate::cellid::CellId;
use crate::constants::{ENCODING_VERSION, MAX_ENCODED_CELLS};
use crate::encoding::{read_uvarint, truncated, write_uvarint};
use crate::error::{Result, S2Error};

impl CellUnion {
  /// Writes the ids verbatim; a union need not be normalized to be encoded.
  pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
    w.write_u8(ENCODING_VERSION)?;
    write_uvarint(w, self.len() as u64)?;
    for id in self {
      w.write_u64::<LittleEndian>(id.0)?;
    }
    Ok(())
  }

  #[must_use]
  pub fn encode_to_vec(&self) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + 10 + 8 * self.len());
    // Writing into a Vec cannot fail.
    let _ = self.encode(&mut buf);
    buf
  }

  /// Reads a union written by [`CellUnion::encode`], restoring the ids exactly as stored.
  pub fn decode<R: Read>(r: &mut R) -> Result<CellUnion> {
    let version = r.read_u8().map_err(|e| truncated(e, "version"))?;
    if version != ENCODING_VERSION {
      warn!(version, "rejecting cell union with unknown encoding version");
      return Err(S2Error::UnsupportedVersion(version));
    }
    let count = read_uvarint(r, "cell count")?;
    if count > MAX_ENCODED_CELLS as u64 {
      warn!(count, max = MAX_ENCODED_CELLS, "rejecting oversized cell union");
      return Err(S2Error::TooManyCells { count: count as usize, max: MAX_ENCODED_CELLS });
    }
    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
      ids.push(CellId(r.read_u64::<LittleEndian>().map_err(|e| truncated(e, "cell id"))?));
    }
    Ok(CellUnion::from_cell_ids_raw(ids))
  }
}
