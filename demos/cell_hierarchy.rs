use xs_s2::cellid::cell_id_to_token;
use xs_s2::latlng::EARTH_RADIUS_KM;
use xs_s2::{Cell, CellId, LatLng, S2Error, MAX_LEVEL};

fn main() -> Result<(), S2Error> {
  println!("--- S2 Cell Hierarchy Example ---");

  // 1. Find the leaf cell containing a point (e.g., San Francisco City Hall)
  let point = LatLng::from_degrees(37.779265, -122.419277);
  let leaf = CellId::from_lat_lng(point);
  println!("Leaf cell: {} (token {}, level {})", leaf, cell_id_to_token(leaf), leaf.level());

  // 2. Walk up the hierarchy, printing size and area at a few levels
  for level in [0, 5, 10, 15, 20, 25, MAX_LEVEL] {
    let id = leaf.parent(level);
    let cell = Cell::from_cell_id(id);
    let area_km2 = cell.exact_area() * EARTH_RADIUS_KM * EARTH_RADIUS_KM;
    println!("Level {:2}: token {:16} area {:.6e} km^2", level, cell_id_to_token(id), area_km2);
  }

  // 3. Children of a level-10 cell cover exactly its leaf range
  let parent = leaf.parent(10);
  let children = parent.children();
  println!("\nChildren of {}:", parent);
  for child in &children {
    println!("  {} [{:016x}, {:016x}]", child, child.range_min().0, child.range_max().0);
  }
  assert_eq!(children[0].range_min(), parent.range_min());
  assert_eq!(children[3].range_max(), parent.range_max());

  // 4. Neighbours at the same level
  println!("\nEdge neighbors of {}:", parent);
  for n in parent.edge_neighbors() {
    println!("  {}", n);
  }

  // 5. Round trip through the debug string form
  let parsed: CellId = parent.to_string().parse()?;
  println!("\nParsed {} back from its string form: {}", parsed, parsed == parent);

  Ok(())
}
