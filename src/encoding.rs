// src/encoding.rs

//! Byte-level helpers shared by the binary encoders.

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{Result, S2Error};

/// Writes `v` as an unsigned LEB128 varint.
pub(crate) fn write_uvarint<W: Write>(w: &mut W, mut v: u64) -> Result<()> {
  while v >= 0x80 {
    w.write_u8((v as u8) | 0x80)?;
    v >>= 7;
  }
  w.write_u8(v as u8)?;
  Ok(())
}

/// Reads an unsigned LEB128 varint of at most 10 bytes.
pub(crate) fn read_uvarint<R: Read>(r: &mut R, what: &'static str) -> Result<u64> {
  let mut v = 0u64;
  for shift in (0..70).step_by(7) {
    let b = r.read_u8().map_err(|e| truncated(e, what))?;
    if shift == 63 && b > 1 {
      return Err(S2Error::Malformed(format!("varint overflow in {what}")));
    }
    v |= u64::from(b & 0x7f) << shift;
    if b < 0x80 {
      return Ok(v);
    }
  }
  Err(S2Error::Malformed(format!("varint too long in {what}")))
}

/// Maps an unexpected end of input to `Truncated`, keeping other I/O errors.
pub(crate) fn truncated(e: std::io::Error, what: &'static str) -> S2Error {
  if e.kind() == std::io::ErrorKind::UnexpectedEof {
    S2Error::Truncated { what }
  } else {
    S2Error::Io(e)
  }
}

/// Length of the varint encoding of `v`.
pub(crate) fn uvarint_len(mut v: u64) -> usize {
  let mut n = 1;
  while v >= 0x80 {
    v >>= 7;
    n += 1;
  }
  n
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_varint_boundaries() {
    for v in [0u64, 1, 127, 128, 300, 1 << 35, u64::MAX] {
      let mut buf = Vec::new();
      write_uvarint(&mut buf, v).unwrap();
      assert_eq!(buf.len(), uvarint_len(v));
      assert_eq!(read_uvarint(&mut buf.as_slice(), "test").unwrap(), v);
    }
    assert_eq!(uvarint_len(u64::MAX), 10);
  }

  #[test]
  fn test_varint_errors() {
    assert!(matches!(read_uvarint(&mut [0x80u8].as_slice(), "count"), Err(S2Error::Truncated { what: "count" })));
    let overlong = [0xffu8; 11];
    assert!(matches!(read_uvarint(&mut overlong.as_slice(), "count"), Err(S2Error::Malformed(_))));
  }
}
