// tests/shape_index_tests.rs

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xs_s2::shape::{LaxPolygon, PointVector, Polyline};
use xs_s2::shape_index::ShapeIndexRegion;
use xs_s2::*;

fn random_point(rng: &mut StdRng) -> Point {
  Point::from_coords(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
}

fn random_loops(rng: &mut StdRng, count: usize) -> Vec<Loop> {
  (0..count)
    .map(|_| {
      let radius = Angle::from_degrees(rng.gen_range(0.5..15.0));
      Loop::regular(random_point(rng), radius, rng.gen_range(3..60))
    })
    .collect()
}

#[test]
fn test_index_cells_cover_every_edge() {
  let mut rng = StdRng::seed_from_u64(5);
  let mut index = ShapeIndex::with_options(ShapeIndexOptions::default().with_max_edges_per_cell(4));
  for l in random_loops(&mut rng, 8) {
    index.add(l);
  }
  assert!(!index.is_fresh());
  assert!(index.cell_count() > 0);
  assert!(index.is_fresh());

  // Index cells are sorted, disjoint, and each edge lives in the cell containing its endpoints.
  let mut it = index.iter();
  let mut prev: Option<CellId> = None;
  while !it.done() {
    let id = it.cell_id();
    if let Some(prev) = prev {
      assert!(prev.range_max() < id.range_min());
    }
    prev = Some(id);
    it.next();
  }
  for (shape_id, shape) in index.shapes() {
    for e in 0..shape.num_edges() {
      let v0 = shape.edge(e).v0;
      let mut it = index.iter();
      assert!(it.locate_point(v0), "vertex of shape {shape_id} edge {e} is not indexed");
      let clipped = it.index_cell().find_by_shape_id(shape_id);
      assert!(clipped.is_some_and(|c| c.contains_edge(e as i32)));
    }
  }

  // Across all cells, each shape's clipped edge ids are exactly its edges.
  let mut seen: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
  let mut it = index.iter();
  while !it.done() {
    for clipped in it.index_cell().shapes() {
      seen.entry(clipped.shape_id()).or_default().extend(clipped.edges().iter().copied());
    }
    it.next();
  }
  assert_eq!(seen.len(), index.len());
  for (shape_id, shape) in index.shapes() {
    let expected: BTreeSet<i32> = (0..shape.num_edges() as i32).collect();
    assert_eq!(seen[&shape_id], expected, "edge ids of shape {shape_id}");
  }
}

#[test]
fn test_contains_point_matches_brute_force() {
  let mut rng = StdRng::seed_from_u64(9);
  let loops = random_loops(&mut rng, 6);
  let mut index = ShapeIndex::new();
  for l in &loops {
    index.add(l.clone());
  }
  let query = ContainsPointQuery::new(&index, VertexModel::SemiOpen);
  for _ in 0..500 {
    let p = random_point(&mut rng);
    let expected: Vec<i32> =
      loops.iter().enumerate().filter(|(_, l)| l.contains_point(p)).map(|(i, _)| i as i32).collect();
    assert_eq!(query.containing_shapes(p), expected);
    assert_eq!(query.contains(p), !expected.is_empty());
  }
}

#[test]
fn test_removed_shapes_are_not_found() {
  let mut index = ShapeIndex::new();
  let square = vec![
    Point::from_coords(1.0, -0.1, -0.1),
    Point::from_coords(1.0, 0.1, -0.1),
    Point::from_coords(1.0, 0.1, 0.1),
    Point::from_coords(1.0, -0.1, 0.1),
  ];
  let a = index.add(LaxPolygon::from_loops(&[square.clone()]));
  let b = index.add(LaxPolygon::from_loops(&[square]));
  let center = Point::from_coords(1.0, 0.0, 0.0);
  assert_eq!(ContainsPointQuery::new(&index, VertexModel::SemiOpen).containing_shapes(center), vec![a, b]);
  assert!(index.remove(a).is_some());
  assert!(index.remove(a).is_none());
  assert_eq!(ContainsPointQuery::new(&index, VertexModel::SemiOpen).containing_shapes(center), vec![b]);
  assert_eq!(index.num_shape_ids(), 2);
  assert_eq!(index.len(), 1);
}

#[test]
fn test_vertex_models() {
  let mut index = ShapeIndex::new();
  let v = Point::from_coords(0.0, 1.0, 0.0);
  index.add(PointVector::new(vec![v]));
  index.add(Polyline::new(vec![Point::from_coords(0.0, 0.0, 1.0), v]));
  assert!(!ContainsPointQuery::new(&index, VertexModel::Open).contains(v));
  assert!(!ContainsPointQuery::new(&index, VertexModel::SemiOpen).contains(v));
  assert_eq!(ContainsPointQuery::new(&index, VertexModel::Closed).containing_shapes(v), vec![0, 1]);
}

#[test]
fn test_region_covering_contains_shapes() {
  let mut rng = StdRng::seed_from_u64(21);
  let loops = random_loops(&mut rng, 3);
  let mut index = ShapeIndex::new();
  for l in &loops {
    index.add(l.clone());
  }
  let covering = CellUnion::from_cell_ids(ShapeIndexRegion::new(&index).cell_union_bound());
  for l in &loops {
    for &v in l.vertices() {
      assert!(covering.contains_point(v));
    }
  }
}
