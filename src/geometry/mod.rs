mod bounding_box;
mod coordinates;
mod polygon;
mod sios;

pub use self::bounding_box::BoundingBox;
pub use self::coordinates::{parse_coordinates, AxisOrder, Coordinate};
pub use self::polygon::{extract_polygon, from_geojson, Footprint, Polygon};
pub use self::sios::classify;
