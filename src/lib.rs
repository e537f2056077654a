#![deny(clippy::all)] // Enforce clippy lints
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Often a matter of taste
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)] // Bit packing of cell ids, review carefully
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unreadable_literal)] // Error bounds are clearer written out
#![allow(clippy::similar_names)] // Can be common in math-heavy code
#![allow(clippy::many_single_char_names)]

//! `xs-s2` is a Rust implementation of S2 spherical geometry.
//!
//! The sphere is projected onto the six faces of a cube and each face is recursively split
//! into a quadtree of cells, numbered along a Hilbert curve by 64-bit [`CellId`]s. On top of
//! the cell hierarchy sit [`CellUnion`]s, robust orientation [`predicates`], the [`Shape`]
//! abstraction with its spatial [`ShapeIndex`], and queries for point containment and
//! closest or furthest edges.

pub mod cap;
pub mod cell;
pub mod cell_index;
pub mod cell_union;
pub mod cellid;
pub mod constants;
pub mod coords;
pub mod edge;
pub(crate) mod encoding;
pub mod error;
pub mod latlng;
pub mod loops;
pub mod math;
pub mod measures;
pub mod metric;
pub mod padded_cell;
pub mod point;
pub mod polygon;
pub mod predicates;
pub mod query;
pub mod rect;
pub mod rect_bounder;
pub mod region;
pub mod shape;
pub mod shape_index;

// Re-export key public types for easier use
pub use cap::Cap;
pub use cell::Cell;
pub use cell_index::CellIndex;
pub use cell_union::CellUnion;
pub use cellid::CellId;
pub use constants::MAX_LEVEL;
pub use edge::{Crossing, EdgeCrosser};
pub use error::{Result, S2Error};
pub use latlng::LatLng;
pub use loops::Loop;
pub use math::s1::{Angle, ChordAngle};
pub use point::Point;
pub use polygon::Polygon;
pub use predicates::Direction;
pub use query::{
  ClosestEdgeQuery, ClosestEdgeQueryOptions, ContainsPointQuery, EdgeQueryResult, FurthestEdgeQuery,
  FurthestEdgeQueryOptions, VertexModel,
};
pub use rect::Rect;
pub use region::Region;
pub use shape::{Edge, Shape};
pub use shape_index::{ShapeIndex, ShapeIndexIterator, ShapeIndexOptions};
