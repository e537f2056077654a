// src/shape_index/builder.rs

//! Decomposes shape edges into index cells.

use std::sync::Arc;

use super::cell::{CellTable, ClippedShape, ShapeIndexCell};
use super::tracker::InteriorTracker;
use super::ShapeIndexOptions;
use crate::cell_union::CellUnion;
use crate::cellid::CellId;
use crate::constants::{CELL_PADDING, NUM_FACES};
use crate::coords::stuv::{face, valid_face_xyz_to_uv};
use crate::edge::{clip_to_padded_face, interpolate_f64};
use crate::math::r1::Interval;
use crate::math::r2::{Point as R2Point, Rect as R2Rect};
use crate::metric::AVG_EDGE;
use crate::padded_cell::PaddedCell;
use crate::shape::{contains_brute_force, Dimension, Edge, Shape};

/// An edge clipped to one cube face.
#[derive(Debug, Clone, Copy)]
struct FaceEdge {
  shape_id: i32,
  edge_id: i32,
  // Level beyond which subdividing no longer reduces the edge count.
  max_level: i32,
  has_interior: bool,
  edge: Edge,
  a: R2Point,
  b: R2Point,
}

/// A face edge further clipped to the bound of a cell.
#[derive(Debug, Clone, Copy)]
struct ClippedEdge {
  face_edge: usize,
  bound: R2Rect,
}

struct Builder<'a> {
  options: &'a ShapeIndexOptions,
  face_edges: Vec<FaceEdge>,
  table: CellTable,
}

/// Builds the full cell table for the given shapes.
pub(crate) fn build(shapes: &[Option<Arc<dyn Shape>>], options: &ShapeIndexOptions) -> CellTable {
  let mut all_edges: [Vec<FaceEdge>; NUM_FACES as usize] = Default::default();
  let mut tracker = InteriorTracker::new();
  for (id, shape) in shapes.iter().enumerate() {
    if let Some(shape) = shape {
      add_shape_edges(id as i32, shape.as_ref(), &mut all_edges, &mut tracker);
    }
  }

  let mut builder = Builder { options, face_edges: Vec::new(), table: CellTable::default() };
  for (face, edges) in all_edges.into_iter().enumerate() {
    builder.face_edges = edges;
    builder.update_face_edges(face as u8, &mut tracker);
  }
  builder.table
}

fn add_shape_edges(
  shape_id: i32,
  shape: &dyn Shape,
  all_edges: &mut [Vec<FaceEdge>; NUM_FACES as usize],
  tracker: &mut InteriorTracker,
) {
  let has_interior = shape.dimension() == Dimension::Polygon;
  if has_interior {
    tracker.add_shape(shape_id, contains_brute_force(shape, tracker.focus()));
  }
  for e in 0..shape.num_edges() {
    let edge = shape.edge(e);
    let fe = FaceEdge {
      shape_id,
      edge_id: e as i32,
      max_level: max_level_for_edge(&edge),
      has_interior,
      edge,
      a: R2Point::default(),
      b: R2Point::default(),
    };
    add_face_edge(fe, all_edges);
  }
}

// The level at which cells are about as long as the edge; below it the edge crosses too many
// cells for subdivision to help.
fn max_level_for_edge(edge: &Edge) -> i32 {
  AVG_EDGE.min_level((edge.v0 - edge.v1).norm())
}

fn add_face_edge(mut fe: FaceEdge, all_edges: &mut [Vec<FaceEdge>; NUM_FACES as usize]) {
  // Fast path: both endpoints on the same face, and far enough from its boundary that the
  // edge cannot touch another padded face.
  let a_face = face(fe.edge.v0.0);
  if a_face == face(fe.edge.v1.0) {
    let (au, av) = valid_face_xyz_to_uv(a_face, fe.edge.v0.0);
    let (bu, bv) = valid_face_xyz_to_uv(a_face, fe.edge.v1.0);
    let max_uv = 1.0 - CELL_PADDING;
    if au.abs() <= max_uv && av.abs() <= max_uv && bu.abs() <= max_uv && bv.abs() <= max_uv {
      fe.a = R2Point::new(au, av);
      fe.b = R2Point::new(bu, bv);
      all_edges[a_face as usize].push(fe);
      return;
    }
  }
  for f in 0..NUM_FACES {
    if let Some((a, b)) = clip_to_padded_face(fe.edge.v0, fe.edge.v1, f, CELL_PADDING) {
      fe.a = a;
      fe.b = b;
      all_edges[f as usize].push(fe);
    }
  }
}

impl Builder<'_> {
  fn update_face_edges(&mut self, face: u8, tracker: &mut InteriorTracker) {
    if self.face_edges.is_empty() && tracker.shape_ids().is_empty() {
      return;
    }
    let mut bound = R2Rect::empty();
    let clipped: Vec<ClippedEdge> = self
      .face_edges
      .iter()
      .enumerate()
      .map(|(i, fe)| {
        let edge_bound = R2Rect::from_points(&[fe.a, fe.b]);
        bound = bound.add_rect(&edge_bound);
        ClippedEdge { face_edge: i, bound: edge_bound }
      })
      .collect();

    let face_id = CellId::from_face(face);
    let pcell = PaddedCell::from_cell_id(face_id, CELL_PADDING);
    if !clipped.is_empty() {
      let shrunk_id = pcell.shrink_to_fit(&bound);
      if shrunk_id != face_id {
        // Every edge lies in a descendant; start there, filling in the skipped ranges for
        // shapes whose interior covers them.
        self.skip_cell_range(face_id.range_min(), shrunk_id.range_min(), tracker);
        self.update_edges(&PaddedCell::from_cell_id(shrunk_id, CELL_PADDING), &clipped, tracker);
        self.skip_cell_range(shrunk_id.range_max().next(), face_id.range_max().next(), tracker);
        return;
      }
    }
    self.update_edges(&pcell, &clipped, tracker);
  }

  // Emits cells for the leaf range [begin, end), which contains no edges.
  fn skip_cell_range(&mut self, begin: CellId, end: CellId, tracker: &mut InteriorTracker) {
    if tracker.shape_ids().is_empty() {
      return;
    }
    for id in CellUnion::from_range(begin, end).iter() {
      self.update_edges(&PaddedCell::from_cell_id(*id, CELL_PADDING), &[], tracker);
    }
  }

  fn update_edges(&mut self, pcell: &PaddedCell, edges: &[ClippedEdge], tracker: &mut InteriorTracker) {
    if self.make_index_cell(pcell, edges, tracker) {
      return;
    }

    // Split the edges among the four children, indexed [i][j].
    let mut child_edges: [[Vec<ClippedEdge>; 2]; 2] = Default::default();
    let middle = pcell.middle();
    for edge in edges {
      if edge.bound.x.hi <= middle.x.lo {
        // Entirely in the two left children.
        let (lo, hi) = self.clip_v_axis(edge, &middle.y);
        push_some(&mut child_edges[0][0], lo);
        push_some(&mut child_edges[0][1], hi);
      } else if edge.bound.x.lo >= middle.x.hi {
        // Entirely in the two right children.
        let (lo, hi) = self.clip_v_axis(edge, &middle.y);
        push_some(&mut child_edges[1][0], lo);
        push_some(&mut child_edges[1][1], hi);
      } else if edge.bound.y.hi <= middle.y.lo {
        // Entirely in the two lower children.
        child_edges[0][0].push(self.clip_u_bound(edge, 1, middle.x.hi));
        child_edges[1][0].push(self.clip_u_bound(edge, 0, middle.x.lo));
      } else if edge.bound.y.lo >= middle.y.hi {
        // Entirely in the two upper children.
        child_edges[0][1].push(self.clip_u_bound(edge, 1, middle.x.hi));
        child_edges[1][1].push(self.clip_u_bound(edge, 0, middle.x.lo));
      } else {
        // The bound spans all four children; the edge itself meets three or four of them.
        let left = self.clip_u_bound(edge, 1, middle.x.hi);
        let (lo, hi) = self.clip_v_axis(&left, &middle.y);
        push_some(&mut child_edges[0][0], lo);
        push_some(&mut child_edges[0][1], hi);
        let right = self.clip_u_bound(edge, 0, middle.x.lo);
        let (lo, hi) = self.clip_v_axis(&right, &middle.y);
        push_some(&mut child_edges[1][0], lo);
        push_some(&mut child_edges[1][1], hi);
      }
    }

    // Recurse in curve order so cells are emitted sorted.
    for pos in 0..4 {
      let (i, j) = pcell.child_ij(pos);
      if !child_edges[i][j].is_empty() || !tracker.shape_ids().is_empty() {
        let child = PaddedCell::from_parent_ij(pcell, i, j);
        let edges = std::mem::take(&mut child_edges[i][j]);
        self.update_edges(&child, &edges, tracker);
      }
    }
  }

  // Clips the u-axis of the bound at `u`, keeping the low side (`u_end == 1` replaces hi) or
  // the high side (`u_end == 0` replaces lo).
  fn clip_u_bound(&self, edge: &ClippedEdge, u_end: usize, u: f64) -> ClippedEdge {
    if (u_end == 0 && edge.bound.x.lo >= u) || (u_end == 1 && edge.bound.x.hi <= u) {
      return *edge;
    }
    // Interpolate from the original endpoints to avoid accumulating error across levels.
    let e = &self.face_edges[edge.face_edge];
    let v = edge.bound.y.clamp_point(interpolate_f64(u, e.a.x, e.b.x, e.a.y, e.b.y));
    // A positive slope moves the same end of the v-range, a negative slope the other.
    let positive_slope = (e.a.x > e.b.x) == (e.a.y > e.b.y);
    let v_end = usize::from((u_end == 1) == positive_slope);
    update_bound(edge, u_end, u, v_end, v)
  }

  fn clip_v_bound(&self, edge: &ClippedEdge, v_end: usize, v: f64) -> ClippedEdge {
    if (v_end == 0 && edge.bound.y.lo >= v) || (v_end == 1 && edge.bound.y.hi <= v) {
      return *edge;
    }
    let e = &self.face_edges[edge.face_edge];
    let u = edge.bound.x.clamp_point(interpolate_f64(v, e.a.y, e.b.y, e.a.x, e.b.x));
    let positive_slope = (e.a.x > e.b.x) == (e.a.y > e.b.y);
    let u_end = usize::from((v_end == 1) == positive_slope);
    update_bound(edge, u_end, u, v_end, v)
  }

  // Splits an edge between the lower and upper child along v.
  fn clip_v_axis(&self, edge: &ClippedEdge, middle: &Interval) -> (Option<ClippedEdge>, Option<ClippedEdge>) {
    if edge.bound.y.hi <= middle.lo {
      return (Some(*edge), None);
    }
    if edge.bound.y.lo >= middle.hi {
      return (None, Some(*edge));
    }
    (Some(self.clip_v_bound(edge, 1, middle.hi)), Some(self.clip_v_bound(edge, 0, middle.lo)))
  }

  // Emits an index cell for `pcell` unless it has too many edges, in which case it returns
  // false and the caller subdivides.
  fn make_index_cell(&mut self, pcell: &PaddedCell, edges: &[ClippedEdge], tracker: &mut InteriorTracker) -> bool {
    if edges.is_empty() && tracker.shape_ids().is_empty() {
      return true;
    }

    // Only edges that could still be split further count against the limit.
    let level = pcell.level();
    let mut count = 0;
    for ce in edges {
      if level < self.face_edges[ce.face_edge].max_level {
        count += 1;
      }
      if count > self.options.max_edges_per_cell {
        return false;
      }
    }

    // Bring the containment state to the cell center.
    if tracker.is_active() && !edges.is_empty() {
      if !tracker.at_cell_id(pcell.id()) {
        tracker.move_to(pcell.entry_vertex());
      }
      tracker.draw_to(pcell.center());
      self.test_all_edges(edges, tracker);
    }

    // Merge the shapes with edges here and the shapes containing the center; both are sorted
    // by shape id, and so are the edges.
    let containing = tracker.shape_ids();
    let mut shapes = Vec::new();
    let mut e_next = 0;
    let mut c_next = 0;
    while e_next < edges.len() || c_next < containing.len() {
      let e_shape = edges.get(e_next).map_or(i32::MAX, |ce| self.face_edges[ce.face_edge].shape_id);
      let c_shape = containing.get(c_next).copied().unwrap_or(i32::MAX);
      if c_shape < e_shape {
        shapes.push(ClippedShape { shape_id: c_shape, contains_center: true, edges: Vec::new() });
        c_next += 1;
        continue;
      }
      let e_begin = e_next;
      while e_next < edges.len() && self.face_edges[edges[e_next].face_edge].shape_id == e_shape {
        e_next += 1;
      }
      let edge_ids: Vec<i32> = edges[e_begin..e_next].iter().map(|ce| self.face_edges[ce.face_edge].edge_id).collect();
      let contains_center = c_shape == e_shape;
      if contains_center {
        c_next += 1;
      }
      shapes.push(ClippedShape { shape_id: e_shape, contains_center, edges: edge_ids });
    }
    self.table.push(pcell.id(), ShapeIndexCell { shapes });

    // Move the focus to where the next cell begins.
    if tracker.is_active() && !edges.is_empty() {
      tracker.draw_to(pcell.exit_vertex());
      self.test_all_edges(edges, tracker);
      tracker.set_next_cell_id(pcell.id().next());
    }
    true
  }

  fn test_all_edges(&self, edges: &[ClippedEdge], tracker: &mut InteriorTracker) {
    for ce in edges {
      let fe = &self.face_edges[ce.face_edge];
      if fe.has_interior {
        tracker.test_edge(fe.shape_id, &fe.edge);
      }
    }
  }
}

fn update_bound(edge: &ClippedEdge, u_end: usize, u: f64, v_end: usize, v: f64) -> ClippedEdge {
  let x = if u_end == 0 { Interval::new(u, edge.bound.x.hi) } else { Interval::new(edge.bound.x.lo, u) };
  let y = if v_end == 0 { Interval::new(v, edge.bound.y.hi) } else { Interval::new(edge.bound.y.lo, v) };
  ClippedEdge { face_edge: edge.face_edge, bound: R2Rect::new(x, y) }
}

fn push_some(edges: &mut Vec<ClippedEdge>, edge: Option<ClippedEdge>) {
  if let Some(edge) = edge {
    edges.push(edge);
  }
}
