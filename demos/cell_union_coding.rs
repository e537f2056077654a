use xs_s2::{Angle, CellId, CellIndex, CellUnion, LatLng, Loop, Polygon, S2Error};

fn main() -> Result<(), S2Error> {
  println!("--- Cell Union Coding Example ---");

  // 1. Build a union from scattered cells; siblings collapse into their parent
  let seed = CellId::from_lat_lng(LatLng::from_degrees(35.6762, 139.6503)).parent(9);
  let mut ids: Vec<CellId> = seed.children().to_vec();
  ids.push(seed.next().children()[1]);
  let cu = CellUnion::from_cell_ids(ids);
  println!("Normalized union has {} cells covering {} leaves", cu.len(), cu.leaf_cells_covered());

  // 2. Encode and decode
  let bytes = cu.encode_to_vec();
  println!("Encoded union in {} bytes", bytes.len());
  let decoded = CellUnion::decode(&mut &bytes[..])?;
  println!("Round trip equal: {}", decoded == cu);

  // 3. Label the union in a cell index and query it
  let mut index = CellIndex::new();
  index.add_cell_union(&cu, 1);
  index.add(seed.parent(5), 2);
  index.build();
  let target = CellUnion::from_cell_ids(vec![seed.child_begin_at_level(12)]);
  println!("Labels intersecting {}: {:?}", target[0], index.intersecting_labels(&target));

  // 4. Polygons pick the smaller of the lossless and compressed formats
  let poly = Polygon::from_loop(Loop::regular(seed.to_point(), Angle::from_degrees(0.1), 12));
  let mut lossless = Vec::new();
  poly.encode_lossless(&mut lossless)?;
  let best = poly.encode_to_vec();
  println!("Polygon: lossless {} bytes, chosen {} bytes", lossless.len(), best.len());
  let back = Polygon::decode(&mut &best[..])?;
  println!("Polygon round trip equal: {}", back == poly);

  // 5. Corrupt input is rejected, not trusted
  match CellUnion::decode(&mut &bytes[..bytes.len() - 3]) {
    Ok(_) => println!("Unexpectedly decoded a truncated union"),
    Err(e) => println!("Truncated union rejected: {}", e),
  }
  Ok(())
}
