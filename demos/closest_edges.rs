use xs_s2::latlng::EARTH_RADIUS_KM;
use xs_s2::query::PointTarget;
use xs_s2::shape::Polyline;
use xs_s2::{
  Angle, ChordAngle, ClosestEdgeQuery, ClosestEdgeQueryOptions, ContainsPointQuery, LatLng, Loop, Polygon,
  ShapeIndex, VertexModel,
};

fn main() {
  tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
  println!("--- Closest Edge Query Example ---");

  // 1. Index a polygon around a city center and a polyline along a river
  let center = LatLng::from_degrees(48.8566, 2.3522).to_point();
  let mut index = ShapeIndex::new();
  let city = index.add(Polygon::from_loop(Loop::regular(center, Angle::from_degrees(0.05), 24)));
  let river: Vec<_> = [(48.80, 2.20), (48.85, 2.30), (48.86, 2.36), (48.83, 2.45)]
    .iter()
    .map(|&(lat, lng)| LatLng::from_degrees(lat, lng).to_point())
    .collect();
  let river_id = index.add(Polyline::new(river));
  println!("Indexed {} shapes with {} edges into {} cells", index.len(), index.num_edges(), index.cell_count());

  // 2. Point containment
  let contains = ContainsPointQuery::new(&index, VertexModel::SemiOpen);
  let probe = LatLng::from_degrees(48.87, 2.34).to_point();
  println!("Probe inside city polygon (shape {}): {}", city, contains.shape_contains(city, probe));

  // 3. The three closest edges within 10 km
  let limit = ChordAngle::from_angle(Angle::from_radians(10.0 / EARTH_RADIUS_KM));
  let options = ClosestEdgeQueryOptions::default().with_max_results(3).with_distance_limit(limit);
  let mut query = ClosestEdgeQuery::new(&index, options);
  for result in query.find_edges(&mut PointTarget::new(probe)) {
    let km = result.distance.to_angle().radians() * EARTH_RADIUS_KM;
    let kind = if result.shape_id == river_id { "river" } else { "city" };
    if result.is_interior() {
      println!("  inside {} (shape {})", kind, result.shape_id);
    } else {
      println!("  {} edge {} at {:.3} km", kind, result.edge_id, km);
    }
  }

  // 4. Without interiors, report only boundary distance
  query.options_mut().include_interiors = false;
  let boundary = query.get_distance(&mut PointTarget::new(probe));
  println!("Distance to nearest boundary: {:.3} km", boundary.to_angle().radians() * EARTH_RADIUS_KM);
}
