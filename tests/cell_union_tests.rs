// tests/cell_union_tests.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xs_s2::*;

fn random_cell(rng: &mut StdRng, max_level: i32) -> CellId {
  let face = rng.gen_range(0..6u8);
  let pos = rng.gen::<u64>() & ((1u64 << 61) - 1);
  CellId::from_face_pos_level(face, pos, rng.gen_range(0..=max_level))
}

#[test]
fn test_normalize_merges_siblings_and_drops_contained() {
  let parent = CellId::from_lat_lng(LatLng::from_degrees(40.0, -3.0)).parent(10);
  let [a, b, c, d] = parent.children();
  let grandchild = b.children()[2];
  let cu = CellUnion::from_cell_ids(vec![d, grandchild, c, a, b, a]);
  assert_eq!(cu.cell_ids(), &[parent]);
  assert!(cu.is_normalized());

  let raw = CellUnion::from_cell_ids_raw(vec![a, b, c, d]);
  assert!(raw.is_valid());
  assert!(!raw.is_normalized());
}

#[test]
fn test_whole_sphere() {
  let all = CellUnion::whole_sphere();
  assert_eq!(all.len(), 6);
  assert_eq!(all.leaf_cells_covered(), 6 << 60);
  assert!((all.average_based_area() - 4.0 * std::f64::consts::PI).abs() < 1e-10);
  assert!((all.exact_area() - 4.0 * std::f64::consts::PI).abs() < 1e-10);
  assert!(all.contains_point(Point::from_coords(0.3, -0.2, 0.9)));
}

#[test]
fn test_boolean_operations_agree_with_membership() {
  let mut rng = StdRng::seed_from_u64(7);
  for _ in 0..50 {
    let x = CellUnion::from_cell_ids((0..20).map(|_| random_cell(&mut rng, 8)).collect());
    let y = CellUnion::from_cell_ids((0..20).map(|_| random_cell(&mut rng, 8)).collect());
    let union = x.union(&y);
    let inter = x.intersection(&y);
    let diff = x.difference(&y);
    assert!(union.is_normalized() && inter.is_normalized() && diff.is_normalized());
    assert!(union.contains_union(&x) && union.contains_union(&y));
    assert!(x.contains_union(&inter) && y.contains_union(&inter));
    assert!(x.contains_union(&diff));
    assert!(!diff.intersects_union(&y));
    assert_eq!(diff.union(&inter), x);
    assert_eq!(x.intersects_union(&y), !inter.is_empty());
    assert_eq!(
      union.leaf_cells_covered() + inter.leaf_cells_covered(),
      x.leaf_cells_covered() + y.leaf_cells_covered()
    );
    for _ in 0..10 {
      let probe = random_cell(&mut rng, 12);
      let rest = CellUnion::from_cell_ids(vec![probe]).difference(&union);
      assert_eq!(union.contains_cell_id(probe), rest.is_empty());
    }
  }
}

#[test]
fn test_range_constructors() {
  let begin = CellId::from_face(1).child_begin_at_level(MAX_LEVEL);
  let end = CellId::from_face(3).child_begin_at_level(MAX_LEVEL);
  let cu = CellUnion::from_range(begin, end);
  assert_eq!(cu.cell_ids(), &[CellId::from_face(1), CellId::from_face(2)]);

  let id = CellId::from_face(4).child_begin_at_level(9).advance(123);
  let cu = CellUnion::from_min_max(id, id);
  assert_eq!(cu.cell_ids(), &[id]);
}

#[test]
fn test_denormalize() {
  let ids = vec![CellId::from_face(2).children()[1], CellId::from_face(5).child_begin_at_level(4)];
  let cu = CellUnion::from_cell_ids(ids);
  let denorm = cu.denormalize(3, 2);
  assert!(denorm.iter().all(|id| id.level() == 3 || id.level() == 5));
  assert_eq!(CellUnion::from_cell_ids(denorm.cell_ids().to_vec()), cu);
  assert_eq!(denorm.leaf_cells_covered(), cu.leaf_cells_covered());
}

#[test]
fn test_expand_at_level_covers_neighbors() {
  let id = CellId::from_lat_lng(LatLng::from_degrees(-20.0, 60.0)).parent(12);
  let mut cu = CellUnion::from_cell_ids(vec![id]);
  cu.expand_at_level(12);
  for n in id.all_neighbors(12) {
    assert!(cu.contains_cell_id(n));
  }
  assert!(cu.contains_cell_id(id));
}

#[test]
fn test_region_bounds_contain_cells() {
  let mut rng = StdRng::seed_from_u64(3);
  let cu = CellUnion::from_cell_ids((0..10).map(|_| random_cell(&mut rng, 10)).collect());
  let cap = cu.cap_bound();
  let rect = cu.rect_bound();
  for &id in &cu {
    let cell = Cell::from_cell_id(id);
    assert!(cap.contains_cell(&cell));
    for k in 0..4 {
      assert!(rect.contains_point(cell.vertex(k)));
    }
    assert!(cu.contains_cell(&cell));
  }
}
