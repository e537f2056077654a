// src/edge/mod.rs

//! Edge algorithms: crossing tests, distances, and clipping to cube faces.

pub mod clipping;
pub mod crosser;
pub mod crossings;
pub mod distances;

pub use clipping::{
  clip_edge, clip_edge_bound, clip_to_face, clip_to_padded_face, clipped_edge_bound, edge_intersects_rect,
  face_segments, interpolate_f64, FaceSegment,
};
pub use crosser::EdgeCrosser;
pub use crossings::{
  crossing_sign, edge_or_vertex_crossing, intersection, vertex_crossing, Crossing, INTERSECTION_ERROR,
};
pub use distances::{
  distance_from_segment, edge_pair_closest_points, interpolate, interpolate_at_distance, is_distance_less,
  min_update_distance_max_error, project, update_edge_pair_max_distance, update_edge_pair_min_distance,
  update_max_distance, update_min_distance, update_min_interior_distance,
};
