// src/cellid/string_conv.rs

use super::CellId;
use crate::constants::{MAX_LEVEL, NUM_FACES};
use crate::error::S2Error;
use std::fmt;
use std::str::FromStr;

/// Converts a `CellId` into its compact token: the hex id without trailing zeros.
///
/// The invalid id 0 is written as `"X"`.
#[must_use]
pub fn cell_id_to_token(id: CellId) -> String {
  let s = format!("{:016x}", id.0);
  let trimmed = s.trim_end_matches('0');
  if trimmed.is_empty() {
    return "X".to_string();
  }
  trimmed.to_string()
}

/// Parses a token produced by `cell_id_to_token`. Malformed tokens yield `CellId::none()`.
#[must_use]
pub fn cell_id_from_token(s: &str) -> CellId {
  if s.is_empty() || s.len() > 16 {
    return CellId::none();
  }
  match u64::from_str_radix(s, 16) {
    // Equivalent to right-padding with zeros to 16 hex digits.
    Ok(n) => CellId(n << (4 * (16 - s.len()))),
    Err(_) => CellId::none(),
  }
}

impl fmt::Display for CellId {
  /// Writes `face/child positions`, e.g. `3/0132`.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.is_valid() {
      return write!(f, "Invalid: {:016x}", self.0);
    }
    write!(f, "{}/", self.face())?;
    for level in 1..=self.level() {
      write!(f, "{}", self.child_position(level))?;
    }
    Ok(())
  }
}

impl FromStr for CellId {
  type Err = S2Error;

  /// Parses the `face/child positions` form written by `Display`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = s.as_bytes();
    let level = bytes.len() as i32 - 2;
    if !(0..=MAX_LEVEL).contains(&level) || bytes[1] != b'/' {
      return Err(S2Error::Malformed(format!("cell id debug string {:?}", s)));
    }
    let face = bytes[0].wrapping_sub(b'0');
    if face >= NUM_FACES {
      return Err(S2Error::Malformed(format!("cell id face in {:?}", s)));
    }
    let mut id = CellId::from_face(face);
    for &c in &bytes[2..] {
      let pos = c.wrapping_sub(b'0');
      if pos > 3 {
        return Err(S2Error::Malformed(format!("cell id child position in {:?}", s)));
      }
      id = id.children()[pos as usize];
    }
    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_token_round_trip() {
    assert_eq!(cell_id_to_token(CellId(0x89c259c000000000)), "89c259c");
    assert_eq!(cell_id_from_token("89c259c"), CellId(0x89c259c000000000));
    assert_eq!(cell_id_to_token(CellId::none()), "X");
    assert_eq!(cell_id_from_token("X"), CellId::none());
    assert_eq!(cell_id_from_token(""), CellId::none());
    assert_eq!(cell_id_from_token("876b e99"), CellId::none());
    assert_eq!(cell_id_from_token("876bee99\n"), CellId::none());
    assert_eq!(cell_id_from_token("0000000000000000a"), CellId::none());
    let id = CellId::from_face(4).child_begin_at_level(13).advance(77);
    assert_eq!(cell_id_from_token(&cell_id_to_token(id)), id);
  }

  #[test]
  fn test_debug_string_round_trip() {
    let id = CellId::from_face(3).children()[1].children()[3].children()[2];
    assert_eq!(id.to_string(), "3/132");
    assert_eq!("3/132".parse::<CellId>().ok(), Some(id));
    assert_eq!("5/".parse::<CellId>().ok(), Some(CellId::from_face(5)));
    assert!("6/0".parse::<CellId>().is_err());
    assert!("2/014".parse::<CellId>().is_err());
    assert!("".parse::<CellId>().is_err());
    assert_eq!(CellId::none().to_string(), "Invalid: 0000000000000000");
  }
}
