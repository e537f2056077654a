// src/constants.rs

//! S2 core library constants.

use std::f64::consts;

// Mathematical constants
/// pi
pub const M_PI: f64 = consts::PI;
/// pi / 2.0
pub const M_PI_2: f64 = consts::FRAC_PI_2;
/// pi / 4.0
pub const M_PI_4: f64 = consts::FRAC_PI_4;
/// 2.0 * PI
pub const M_2PI: f64 = 2.0 * consts::PI;
/// 4.0 * PI, the area of the unit sphere
pub const M_4PI: f64 = 4.0 * consts::PI;
/// sqrt(2)
pub const M_SQRT2: f64 = consts::SQRT_2;
/// sqrt(3)
pub const M_SQRT3: f64 = 1.732_050_807_568_877_2;

/// Machine epsilon of f64 (2^-52). Error bounds are expressed in multiples of this.
pub const DBL_EPSILON: f64 = crate::math::s1::DBL_EPSILON;
/// Rounding error of a single f64 operation (2^-53).
pub const DBL_ERROR: f64 = crate::math::s1::DBL_ERROR;
/// Smallest positive normalized f64.
pub const DBL_MIN: f64 = f64::MIN_POSITIVE;

// CellId bit layout
/// Number of cube faces.
pub const NUM_FACES: u8 = 6;
/// Deepest subdivision level. Leaf cells are at this level.
pub const MAX_LEVEL: i32 = 30;
/// Number of bits of the id used for the curve position (including the terminating bit).
pub const POS_BITS: u32 = 2 * MAX_LEVEL as u32 + 1;
/// Offset of the face bits.
pub const FACE_BITS_OFFSET: u32 = POS_BITS;
/// Number of leaf cells along one edge of a face.
pub const MAX_SIZE: i32 = 1 << MAX_LEVEL;
/// Maximum value of an si/ti coordinate (twice `MAX_SIZE`).
pub const MAX_SI_TI: u32 = 1 << (MAX_LEVEL + 1);
/// Mask for a CellId position including its terminating bit.
pub const POS_MASK: u64 = (1u64 << POS_BITS) - 1;
/// Lowest bit of a leaf cell id (a level 30 cell).
pub const LEAF_LSB: u64 = 1;

// Hilbert curve orientation bits
/// The i and j axes are swapped in this subcell.
pub const SWAP_MASK: u8 = 0x01;
/// The i and j directions are reversed in this subcell.
pub const INVERT_MASK: u8 = 0x02;
/// Bits of (i, j) resolved per lookup table step.
pub const LOOKUP_BITS: u32 = 4;

// Edge clipping and padding
/// Error in the u or v coordinate of edges clipped to a face, in uv units.
pub const FACE_CLIP_ERROR_UV_COORD: f64 = 9.0 * (1.0 / consts::SQRT_2) * DBL_EPSILON;
/// Error of edges clipped to a rectangle in uv coordinates.
pub const EDGE_CLIP_ERROR_UV_COORD: f64 = 2.25 * DBL_EPSILON;
/// Error when testing whether an edge intersects a rectangle, in uv distance.
pub const INTERSECTS_RECT_ERROR_UV_DIST: f64 = 3.0 * consts::SQRT_2 * DBL_EPSILON;
/// Padding of index cells so that clipped edges are never missed near a boundary.
pub const CELL_PADDING: f64 = 2.0 * (FACE_CLIP_ERROR_UV_COORD + EDGE_CLIP_ERROR_UV_COORD);

// Encoding
/// Version byte of the lossless encodings.
pub const ENCODING_VERSION: u8 = 1;
/// Version byte of the compressed polygon encoding.
pub const ENCODING_COMPRESSED_VERSION: u8 = 4;
/// Decoders reject polygons claiming more loops than this.
pub const MAX_ENCODED_LOOPS: usize = 10_000_000;
/// Decoders reject loops claiming more vertices than this.
pub const MAX_ENCODED_VERTICES: usize = 50_000_000;
/// Decoders reject cell unions claiming more cells than this.
pub const MAX_ENCODED_CELLS: usize = 1_000_000;
