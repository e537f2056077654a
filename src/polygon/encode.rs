// src/polygon/encode.rs

//! Binary coding of polygons.
//!
//! Lossless layout:
//! `[u8 1][u8 has_holes][u32 loops]`, then per loop
//! `[u8 1][u32 n][f64 x, y, z] * n[u8 origin_inside][i32 depth]`.
//! Fixed-width fields are little-endian.
//!
//! Compressed layout, for vertices that are mostly cell centers at one level:
//! `[u8 4][u8 level][uvarint loops]`, then per loop
//! `[uvarint n][uvarint origin_inside | depth << 1][uvarint k]`, `k` off-center vertices as
//! `[uvarint position][f64 x, y, z]`, and the remaining `n - k` vertices in order as
//! `[uvarint (face << 2 * level) | (i << level) | j]`.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::{trace, warn};

use super::Polygon;
use crate::constants::{
  ENCODING_COMPRESSED_VERSION, ENCODING_VERSION, MAX_ENCODED_LOOPS, MAX_ENCODED_VERTICES, MAX_LEVEL,
};
use crate::coords::stuv::{face_siti_to_xyz, xyz_to_face_siti};
use crate::encoding::{read_uvarint, truncated, write_uvarint};
use crate::error::{Result, S2Error};
use crate::loops::Loop;
use crate::math::r3::Vector;
use crate::point::Point;

// Vectors are grown as vertices arrive rather than sized from untrusted counts.
const MAX_PREALLOCATED_VERTICES: usize = 4096;

impl Polygon {
  /// Writes whichever of the lossless and compressed encodings is smaller.
  pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
    w.write_all(&self.encode_to_vec())?;
    Ok(())
  }

  #[must_use]
  pub fn encode_to_vec(&self) -> Vec<u8> {
    let mut lossless = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = self.encode_lossless(&mut lossless);
    let Some(level) = self.best_snap_level() else {
      return lossless;
    };
    let mut compressed = Vec::new();
    let _ = self.encode_compressed(&mut compressed, level);
    trace!(level, lossless = lossless.len(), compressed = compressed.len(), "polygon encoding sizes");
    if compressed.len() < lossless.len() {
      compressed
    } else {
      lossless
    }
  }

  /// Writes every vertex as three doubles.
  pub fn encode_lossless<W: Write>(&self, w: &mut W) -> Result<()> {
    w.write_u8(ENCODING_VERSION)?;
    w.write_u8(u8::from(self.has_holes))?;
    w.write_u32::<LittleEndian>(self.loops.len() as u32)?;
    for l in &self.loops {
      w.write_u8(ENCODING_VERSION)?;
      w.write_u32::<LittleEndian>(l.num_vertices() as u32)?;
      for v in l.vertices() {
        write_point(w, *v)?;
      }
      w.write_u8(u8::from(l.contains_origin()))?;
      w.write_i32::<LittleEndian>(l.depth())?;
    }
    Ok(())
  }

  /// Writes vertices that are centers of cells at `level` as cell coordinates, and the rest
  /// as three doubles.
  pub fn encode_compressed<W: Write>(&self, w: &mut W, level: i32) -> Result<()> {
    if !(0..=MAX_LEVEL).contains(&level) {
      return Err(S2Error::InvalidLevel(level));
    }
    w.write_u8(ENCODING_COMPRESSED_VERSION)?;
    w.write_u8(level as u8)?;
    write_uvarint(w, self.loops.len() as u64)?;
    for l in &self.loops {
      let snapped: Vec<Option<u64>> = l.vertices().iter().map(|&v| snap_vertex(v, level)).collect();
      let depth = u64::try_from(l.depth()).map_err(|_| S2Error::InvalidLoop(format!("negative depth {}", l.depth())))?;
      write_uvarint(w, l.num_vertices() as u64)?;
      write_uvarint(w, u64::from(l.contains_origin()) | depth << 1)?;
      write_uvarint(w, snapped.iter().filter(|s| s.is_none()).count() as u64)?;
      for (i, s) in snapped.iter().enumerate() {
        if s.is_none() {
          write_uvarint(w, i as u64)?;
          write_point(w, l.vertices()[i])?;
        }
      }
      for value in snapped.into_iter().flatten() {
        write_uvarint(w, value)?;
      }
    }
    Ok(())
  }

  // The level at which the most vertices are cell centers, if any are.
  fn best_snap_level(&self) -> Option<i32> {
    let mut histogram = [0usize; MAX_LEVEL as usize + 1];
    for l in &self.loops {
      for &v in l.vertices() {
        let (_, _, _, level) = xyz_to_face_siti(v);
        if level >= 0 {
          histogram[level as usize] += 1;
        }
      }
    }
    let (level, &count) = histogram.iter().enumerate().max_by_key(|&(level, count)| (*count, usize::MAX - level))?;
    (count > 0).then_some(level as i32)
  }

  /// Reads a polygon written by [`Polygon::encode`] in either format.
  ///
  /// Polygons with more than one loop are rejected, since they cannot be assembled.
  pub fn decode<R: Read>(r: &mut R) -> Result<Polygon> {
    let version = r.read_u8().map_err(|e| truncated(e, "version"))?;
    match version {
      ENCODING_VERSION => decode_lossless(r),
      ENCODING_COMPRESSED_VERSION => decode_compressed(r),
      _ => {
        warn!(version, "rejecting polygon with unknown encoding version");
        Err(S2Error::UnsupportedVersion(version))
      }
    }
  }
}

fn write_point<W: Write>(w: &mut W, p: Point) -> Result<()> {
  w.write_f64::<LittleEndian>(p.0.x)?;
  w.write_f64::<LittleEndian>(p.0.y)?;
  w.write_f64::<LittleEndian>(p.0.z)?;
  Ok(())
}

fn read_point<R: Read>(r: &mut R) -> Result<Point> {
  let mut c = [0.0; 3];
  for x in &mut c {
    *x = r.read_f64::<LittleEndian>().map_err(|e| truncated(e, "vertex"))?;
  }
  Ok(Point(Vector::new(c[0], c[1], c[2])))
}

// The cell coordinates of `v` if it is exactly the center of a cell at `level`.
fn snap_vertex(v: Point, level: i32) -> Option<u64> {
  let (face, si, ti, vertex_level) = xyz_to_face_siti(v);
  if vertex_level != level {
    return None;
  }
  // Centers at this level have si = (2i + 1) << (MAX_LEVEL - level).
  let shift = (MAX_LEVEL - level + 1) as u32;
  let (i, j) = (u64::from(si >> shift), u64::from(ti >> shift));
  Some((u64::from(face) << (2 * level)) | (i << level) | j)
}

fn unsnap_vertex(value: u64, level: i32) -> Result<Point> {
  let face = value >> (2 * level);
  if face >= 6 {
    return Err(S2Error::Malformed(format!("vertex face {face} out of range")));
  }
  let mask = (1u64 << level) - 1;
  let (i, j) = ((value >> level) & mask, value & mask);
  let shift = (MAX_LEVEL - level) as u32;
  let si = ((2 * i + 1) << shift) as u32;
  let ti = ((2 * j + 1) << shift) as u32;
  Ok(face_siti_to_xyz(face as u8, si, ti).normalize())
}

fn check_loop_count(count: u64) -> Result<usize> {
  if count > MAX_ENCODED_LOOPS as u64 {
    warn!(count, max = MAX_ENCODED_LOOPS, "rejecting polygon with too many loops");
    return Err(S2Error::TooManyLoops { count: count as usize, max: MAX_ENCODED_LOOPS });
  }
  if count > 1 {
    warn!(count, "rejecting multi-loop polygon");
    return Err(S2Error::InvalidPolygon(format!("{count} loops; only single-loop polygons are supported")));
  }
  Ok(count as usize)
}

fn check_vertex_count(count: u64) -> Result<usize> {
  if count > MAX_ENCODED_VERTICES as u64 {
    warn!(count, max = MAX_ENCODED_VERTICES, "rejecting loop with too many vertices");
    return Err(S2Error::TooManyVertices { count: count as usize, max: MAX_ENCODED_VERTICES });
  }
  Ok(count as usize)
}

fn decode_lossless<R: Read>(r: &mut R) -> Result<Polygon> {
  // Recomputed from the loop depths.
  let _has_holes = r.read_u8().map_err(|e| truncated(e, "has_holes"))?;
  let num_loops = check_loop_count(u64::from(r.read_u32::<LittleEndian>().map_err(|e| truncated(e, "loop count"))?))?;
  let mut loops = Vec::with_capacity(num_loops);
  for _ in 0..num_loops {
    let version = r.read_u8().map_err(|e| truncated(e, "loop version"))?;
    if version != ENCODING_VERSION {
      warn!(version, "rejecting loop with unknown encoding version");
      return Err(S2Error::UnsupportedVersion(version));
    }
    let n = check_vertex_count(u64::from(r.read_u32::<LittleEndian>().map_err(|e| truncated(e, "vertex count"))?))?;
    let mut vertices = Vec::with_capacity(n.min(MAX_PREALLOCATED_VERTICES));
    for _ in 0..n {
      vertices.push(read_point(r)?);
    }
    let origin_inside = r.read_u8().map_err(|e| truncated(e, "origin_inside"))? != 0;
    let depth = r.read_i32::<LittleEndian>().map_err(|e| truncated(e, "depth"))?;
    loops.push(make_loop(vertices, origin_inside, depth)?);
  }
  Ok(Polygon::from_parts(loops))
}

fn decode_compressed<R: Read>(r: &mut R) -> Result<Polygon> {
  let level = i32::from(r.read_u8().map_err(|e| truncated(e, "level"))?);
  if level > MAX_LEVEL {
    warn!(level, "rejecting compressed polygon with invalid level");
    return Err(S2Error::InvalidLevel(level));
  }
  let num_loops = check_loop_count(read_uvarint(r, "loop count")?)?;
  let mut loops = Vec::with_capacity(num_loops);
  for _ in 0..num_loops {
    let n = check_vertex_count(read_uvarint(r, "vertex count")?)?;
    let flags = read_uvarint(r, "loop flags")?;
    let depth =
      i32::try_from(flags >> 1).map_err(|_| S2Error::Malformed(format!("loop depth {} too large", flags >> 1)))?;
    let num_off_center = read_uvarint(r, "off-center count")?;
    if num_off_center > n as u64 {
      return Err(S2Error::Malformed(format!("{num_off_center} off-center vertices in a loop of {n}")));
    }
    let mut off_center = Vec::with_capacity((num_off_center as usize).min(MAX_PREALLOCATED_VERTICES));
    for _ in 0..num_off_center {
      let position = read_uvarint(r, "vertex position")?;
      let in_order = off_center.last().map_or(true, |&(last, _)| last < position);
      if position >= n as u64 || !in_order {
        return Err(S2Error::Malformed(format!("off-center vertex position {position} out of order")));
      }
      off_center.push((position, read_point(r)?));
    }
    let mut vertices = Vec::with_capacity(n.min(MAX_PREALLOCATED_VERTICES));
    let mut pending = off_center.into_iter().peekable();
    for i in 0..n as u64 {
      match pending.next_if(|&(position, _)| position == i) {
        Some((_, v)) => vertices.push(v),
        None => vertices.push(unsnap_vertex(read_uvarint(r, "vertex")?, level)?),
      }
    }
    loops.push(make_loop(vertices, flags & 1 != 0, depth)?);
  }
  Ok(Polygon::from_parts(loops))
}

fn make_loop(vertices: Vec<Point>, origin_inside: bool, depth: i32) -> Result<Loop> {
  if vertices.is_empty() {
    return Err(S2Error::InvalidLoop("loop has no vertices".into()));
  }
  Ok(Loop::from_raw_parts(vertices, origin_inside, depth))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cell::Cell;
  use crate::cellid::CellId;
  use crate::math::s1::Angle;
  use crate::shape::Shape;

  fn decode(buf: &[u8]) -> Result<Polygon> {
    Polygon::decode(&mut &buf[..])
  }

  #[test]
  fn test_lossless_layout() {
    let poly = Polygon::from_loop(Loop::regular(Point::from_coords(1.0, 2.0, 3.0), Angle::from_degrees(2.0), 5));
    let mut buf = Vec::new();
    poly.encode_lossless(&mut buf).unwrap();
    assert_eq!(buf.len(), 6 + 1 + 4 + 5 * 24 + 1 + 4);
    assert_eq!(&buf[..6], &[ENCODING_VERSION, 0, 1, 0, 0, 0]);
    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded, poly);
    assert_eq!(decoded.rect_bound(), poly.rect_bound());
  }

  #[test]
  fn test_cell_polygon_compresses() {
    // Cell vertices are not centers, but a loop of centers at one level is.
    let id = CellId::from_face(4).child_begin_at_level(10);
    let centers: Vec<Point> = [id, id.next(), id.next().next()].iter().map(|c| c.to_point()).collect();
    let poly = Polygon::from_loop(Loop::new(centers));
    let buf = poly.encode_to_vec();
    assert_eq!(buf[0], ENCODING_COMPRESSED_VERSION);
    assert_eq!(buf[1], 10);
    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded, poly);
  }

  #[test]
  fn test_compressed_mixes_snapped_and_raw() {
    let id = CellId::from_face(0).child_begin_at_level(5);
    let loop_vertices = vec![id.to_point(), Point::from_coords(1.0, 0.31, 0.27), id.next().to_point()];
    let poly = Polygon::from_loop(Loop::new(loop_vertices));
    let mut buf = Vec::new();
    poly.encode_compressed(&mut buf, 5).unwrap();
    assert_eq!(decode(&buf).unwrap(), poly);
    // Forcing a level none of the vertices snap to still round trips.
    let mut buf = Vec::new();
    poly.encode_compressed(&mut buf, 17).unwrap();
    assert_eq!(decode(&buf).unwrap(), poly);
    assert!(matches!(poly.encode_compressed(&mut Vec::new(), 31), Err(S2Error::InvalidLevel(31))));
  }

  #[test]
  fn test_empty_and_full() {
    for poly in [Polygon::empty(), Polygon::full()] {
      let decoded = decode(&poly.encode_to_vec()).unwrap();
      assert_eq!(decoded, poly);
      assert_eq!(decoded.is_full(), poly.is_full());
      assert_eq!(decoded.num_chains(), poly.num_chains());
    }
  }

  #[test]
  fn test_rejects_bad_input() {
    assert!(matches!(decode(&[7]), Err(S2Error::UnsupportedVersion(7))));
    assert!(matches!(decode(&[]), Err(S2Error::Truncated { what: "version" })));

    let mut many = vec![ENCODING_VERSION, 0];
    many.extend_from_slice(&(MAX_ENCODED_LOOPS as u32 + 1).to_le_bytes());
    assert!(matches!(decode(&many), Err(S2Error::TooManyLoops { .. })));

    let mut two = vec![ENCODING_VERSION, 0];
    two.extend_from_slice(&2u32.to_le_bytes());
    assert!(matches!(decode(&two), Err(S2Error::InvalidPolygon(_))));

    let mut huge_loop = vec![ENCODING_COMPRESSED_VERSION, 3, 1];
    write_uvarint(&mut huge_loop, MAX_ENCODED_VERTICES as u64 + 1).unwrap();
    assert!(matches!(decode(&huge_loop), Err(S2Error::TooManyVertices { .. })));

    let cell = Cell::from_cell_id(CellId::from_face(2).child_begin_at_level(4));
    let full = Polygon::from_cell(&cell).encode_to_vec();
    assert!(matches!(decode(&full[..full.len() - 2]), Err(S2Error::Truncated { .. })));

    assert!(matches!(decode(&[ENCODING_COMPRESSED_VERSION, 40]), Err(S2Error::InvalidLevel(40))));
  }
}
