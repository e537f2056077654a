// src/query/mod.rs

//! Queries over a [`ShapeIndex`](crate::shape_index::ShapeIndex): point containment and
//! closest or furthest edges.

pub mod contains_point;
pub mod distance;
pub mod edge_query;
pub mod targets;

pub use contains_point::{ContainsPointQuery, VertexModel};
pub use distance::{Distance, MaxDistance, MinDistance};
pub use edge_query::{
  ClosestEdgeQuery, ClosestEdgeQueryOptions, EdgeQuery, EdgeQueryOptions, EdgeQueryResult, FurthestEdgeQuery,
  FurthestEdgeQueryOptions,
};
pub use targets::{CellTarget, DistanceTarget, EdgeTarget, PointTarget, ShapeIndexTarget};
