// tests/query_tests.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xs_s2::query::{CellTarget, EdgeTarget, MinDistance, PointTarget, ShapeIndexTarget};
use xs_s2::shape::{PointVector, Polyline};
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
fn test_closest_edge_to_polyline_vertices() {
  // A meridian polyline; the closest edge to a point east of it is the one spanning its latitude.
  let vertices: Vec<Point> = (0..10).map(|i| LatLng::from_degrees(f64::from(i) * 5.0, 0.0).to_point()).collect();
  let mut index = ShapeIndex::new();
  index.add(Polyline::new(vertices));
  let mut query = ClosestEdgeQuery::new(&index, ClosestEdgeQueryOptions::default());
  let target = LatLng::from_degrees(12.0, 1.0).to_point();
  let result = query.find_edge(&mut PointTarget::new(target));
  assert_eq!((result.shape_id, result.edge_id), (0, 2));
  let expected = Angle::from_degrees(1.0).radians() * 12f64.to_radians().cos();
  assert!((result.distance.to_angle().radians() - expected).abs() < 1e-4);
  let edge = query.edge(&result).unwrap();
  assert_eq!(edge.v0, LatLng::from_degrees(10.0, 0.0).to_point());
}

#[test]
fn test_edge_and_cell_targets() {
  let mut index = ShapeIndex::new();
  index.add(PointVector::new(vec![Point::from_coords(1.0, 0.0, 0.0), Point::from_coords(0.0, 0.0, 1.0)]));
  let mut query = ClosestEdgeQuery::new(&index, ClosestEdgeQueryOptions::default());

  // An edge passing through the first point is at distance zero.
  let mut edge = EdgeTarget::new(Point::from_coords(1.0, -1.0, 0.0), Point::from_coords(1.0, 1.0, 0.0));
  let result = query.find_edge(&mut edge);
  assert_eq!(result.edge_id, 0);
  assert!(result.distance.length2() < 1e-30);

  // A cell containing the second point is at distance zero too.
  let cell = Cell::from_cell_id(CellId::from_point(Point::from_coords(0.0, 0.0, 1.0)).parent(8));
  let result = query.find_edge(&mut CellTarget::new(cell));
  assert_eq!(result.edge_id, 1);
  assert_eq!(result.distance, ChordAngle::ZERO);
}

#[test]
fn test_max_error_still_bounds_results() {
  let mut rng = StdRng::seed_from_u64(41);
  let mut index = ShapeIndex::new();
  for l in random_loops(&mut rng, 10) {
    index.add(l);
  }
  let exact_options = ClosestEdgeQueryOptions::default().with_include_interiors(false);
  let mut exact = ClosestEdgeQuery::new(&index, exact_options);
  let slack = ChordAngle::from_angle(Angle::from_degrees(1.0));
  let mut approx = ClosestEdgeQuery::new(&index, exact_options.with_max_error(slack));
  for _ in 0..50 {
    let p = random_point(&mut rng);
    let best = exact.get_distance(&mut PointTarget::new(p));
    let found = approx.get_distance(&mut PointTarget::new(p));
    assert!(found >= best);
    assert!(found.length2() <= (best + slack).length2() + 1e-15);
  }
}

#[test]
fn test_loop_and_polygon_through_queries() {
  let center = LatLng::from_degrees(-10.0, 100.0).to_point();
  let l = Loop::regular(center, Angle::from_degrees(2.0), 64);
  let poly = Polygon::from_loop(l.clone());
  let mut index = ShapeIndex::new();
  index.add(poly.clone());

  let query = ContainsPointQuery::new(&index, VertexModel::SemiOpen);
  assert!(query.contains(center));
  assert_eq!(query.contains(center), poly.contains_point(center));
  let outside = LatLng::from_degrees(-10.0, 104.0).to_point();
  assert!(!query.contains(outside) && !l.contains_point(outside));

  let mut closest = ClosestEdgeQuery::new(&index, ClosestEdgeQueryOptions::default());
  assert_eq!(closest.get_distance(&mut PointTarget::new(center)), ChordAngle::ZERO);
  let rim = closest.find_edge(&mut PointTarget::new(outside));
  assert!(!rim.is_interior());
  let gap = rim.distance.to_angle().degrees();
  assert!(gap > 1.9 && gap < 2.1, "gap {gap}");
}

#[test]
fn test_closest_edges_between_indexes() {
  let mut rng = StdRng::seed_from_u64(33);
  let mut index = ShapeIndex::new();
  for l in random_loops(&mut rng, 4) {
    index.add(l);
  }
  let mut other = ShapeIndex::new();
  other.add(PointVector::new((0..10).map(|_| random_point(&mut rng)).collect()));

  let mut query = ClosestEdgeQuery::new(&index, ClosestEdgeQueryOptions::default().with_include_interiors(false));
  let mut target: ShapeIndexTarget<'_, MinDistance> = ShapeIndexTarget::new(&other);
  let distance = query.get_distance(&mut target);

  // The closest edge to the point set is the closest edge to one of its points.
  let best = other
    .shape(0)
    .map(|points| {
      (0..points.num_edges())
        .map(|i| query.get_distance(&mut PointTarget::new(points.edge(i).v0)))
        .fold(ChordAngle::infinity(), ChordAngle::min)
    })
    .unwrap_or(ChordAngle::infinity());
  assert!((distance.length2() - best.length2()).abs() < 1e-15);

  let mut furthest = FurthestEdgeQuery::new(&index, FurthestEdgeQueryOptions::default());
  let far = furthest.get_distance(&mut PointTarget::new(Point::from_coords(0.0, 0.0, 1.0)));
  let near = ClosestEdgeQuery::new(&index, ClosestEdgeQueryOptions::default())
    .get_distance(&mut PointTarget::new(Point::from_coords(0.0, 0.0, 1.0)));
  assert!(far >= near);
}
