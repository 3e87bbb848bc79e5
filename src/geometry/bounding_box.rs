use super::coordinates::Coordinate;
use super::polygon::InsufficientGeometryError;

/// The extreme latitudes and longitudes of a ring, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// The four corners of the box as a closed ring.
    pub fn corners(&self) -> Vec<Coordinate> {
        vec![
            Coordinate::new(self.west, self.south),
            Coordinate::new(self.west, self.north),
            Coordinate::new(self.east, self.north),
            Coordinate::new(self.east, self.south),
            Coordinate::new(self.west, self.south),
        ]
    }
}

/// Compute the bounding box of a canonical ring.
///
/// North and south are the extreme latitudes, east and west the extreme longitudes.
pub fn bounding_box(ring: &[Coordinate]) -> Result<BoundingBox, InsufficientGeometryError> {
    let (first, rest) = ring
        .split_first()
        .ok_or_else(|| InsufficientGeometryError::new(0))?;

    let bbox = rest.iter().fold(
        BoundingBox {
            north: first.lat,
            south: first.lat,
            east: first.lon,
            west: first.lon,
        },
        |bbox, coordinate| BoundingBox {
            north: bbox.north.max(coordinate.lat),
            south: bbox.south.min(coordinate.lat),
            east: bbox.east.max(coordinate.lon),
            west: bbox.west.min(coordinate.lon),
        },
    );

    if bbox.north == bbox.south && bbox.east == bbox.west {
        return Err(InsufficientGeometryError::new(ring.len()));
    }

    Ok(bbox)
}
