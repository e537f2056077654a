// tests/predicates_tests.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xs_s2::edge::{crossing_sign, vertex_crossing};
use xs_s2::predicates::{compare_distance, compare_distances, expensive_sign, ordered_ccw, robust_sign, sign};
use xs_s2::*;

fn random_point(rng: &mut StdRng) -> Point {
  Point::from_coords(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
}

#[test]
fn test_robust_sign_basic_orientation() {
  let x = Point::from_coords(1.0, 0.0, 0.0);
  let y = Point::from_coords(0.0, 1.0, 0.0);
  let z = Point::from_coords(0.0, 0.0, 1.0);
  assert_eq!(robust_sign(x, y, z), Direction::CounterClockwise);
  assert_eq!(robust_sign(z, y, x), Direction::Clockwise);
  assert!(sign(x, y, z));
  assert!(!sign(z, y, x));
}

#[test]
fn test_robust_sign_is_consistent_under_permutation() {
  let mut rng = StdRng::seed_from_u64(11);
  for _ in 0..200 {
    let (a, b, c) = (random_point(&mut rng), random_point(&mut rng), random_point(&mut rng));
    let s = robust_sign(a, b, c);
    assert_ne!(s, Direction::Indeterminate);
    assert_eq!(robust_sign(b, c, a), s);
    assert_eq!(robust_sign(c, a, b), s);
    assert_eq!(robust_sign(c, b, a), -s);
  }
}

#[test]
fn test_degenerate_triangles_get_a_definite_sign() {
  let a = Point::from_coords(1.0, 0.0, 0.0);
  let b = Point::from_coords(1.0, 1.0, 0.0);
  let c = Point::from_coords(0.0, 1.0, 0.0);
  // Three points on the equator are exactly coplanar with the origin.
  let s = robust_sign(a, b, c);
  assert_ne!(s, Direction::Indeterminate);
  assert_eq!(robust_sign(b, a, c), -s);
  assert_eq!(expensive_sign(a, b, c), s);
  // Repeated points are the only indeterminate case.
  assert_eq!(robust_sign(a, a, c), Direction::Indeterminate);
  assert_eq!(robust_sign(a, b, b), Direction::Indeterminate);
}

#[test]
fn test_ordered_ccw() {
  let o = Point::from_coords(0.0, 0.0, 1.0);
  let a = Point::from_coords(1.0, 0.0, 0.0);
  let b = Point::from_coords(0.0, 1.0, 0.0);
  let c = Point::from_coords(-1.0, 0.0, 0.0);
  assert!(ordered_ccw(a, b, c, o));
  assert!(!ordered_ccw(c, b, a, o));
}

#[test]
fn test_distance_comparisons() {
  let x = Point::from_coords(1.0, 0.0, 0.0);
  let near = Point::from_coords(1.0, 0.1, 0.0);
  let far = Point::from_coords(1.0, 0.0, 1.0);
  assert_eq!(compare_distances(x, near, far), -1);
  assert_eq!(compare_distances(x, far, near), 1);
  assert_eq!(compare_distances(x, near, near), 0);

  let r = ChordAngle::from_angle(Angle::from_degrees(10.0));
  assert_eq!(compare_distance(x, near, r), -1);
  assert_eq!(compare_distance(x, far, r), 1);
}

#[test]
fn test_edge_crossings() {
  let a = Point::from_coords(1.0, -1.0, 0.1);
  let b = Point::from_coords(1.0, 1.0, 0.1);
  let c = Point::from_coords(1.0, 0.0, -1.0);
  let d = Point::from_coords(1.0, 0.0, 1.0);
  assert_eq!(crossing_sign(a, b, c, d), Crossing::Cross);
  assert_eq!(crossing_sign(a, b, c, c), Crossing::DoNotCross);
  assert_eq!(crossing_sign(a, b, a, d), Crossing::MaybeCross);
  let e = Point::from_coords(1.0, 0.0, 0.5);
  assert_eq!(crossing_sign(a, b, d, e), Crossing::DoNotCross);

  let mut crosser = EdgeCrosser::new(a, b);
  assert_eq!(crosser.crossing_sign(c, d), Crossing::Cross);
  // An edge crosses itself; edges without a shared vertex never cross at a vertex.
  assert!(vertex_crossing(a, b, a, b));
  assert!(!vertex_crossing(a, b, c, d));
  assert!(crosser.edge_or_vertex_crossing(c, d));
}
