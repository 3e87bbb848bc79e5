//! Membership test for the SIOS area of interest around Svalbard.

use super::bounding_box::BoundingBox;
use super::coordinates::Coordinate;
use super::polygon::Footprint;

/// The SIOS reference quadrilateral, longitude [-20, 40] and latitude [70, 90].
const SIOS_REGION: [Coordinate; 4] = [
    Coordinate { lon: -20.0, lat: 70.0 },
    Coordinate { lon: -20.0, lat: 90.0 },
    Coordinate { lon: 40.0, lat: 90.0 },
    Coordinate { lon: 40.0, lat: 70.0 },
];

/// Whether a ring intersects the SIOS region. Touching the boundary counts.
pub fn within_sios(ring: &[Coordinate]) -> bool {
    intersects(ring, &SIOS_REGION)
}

pub fn bbox_within_sios(bbox: &BoundingBox) -> bool {
    within_sios(&bbox.corners())
}

/// Classify a product by its footprint, or by its bounding box when it has no footprint.
///
/// A footprint of several polygons is in the region when any of its parts is.
/// Returns `None` when neither geometry is available.
pub fn classify(footprint: Option<&Footprint>, bbox: Option<&BoundingBox>) -> Option<bool> {
    match (footprint, bbox) {
        (Some(footprint), _) => Some(
            footprint
                .polygons
                .iter()
                .any(|polygon| within_sios(&polygon.exterior)),
        ),
        (None, Some(bbox)) => Some(bbox_within_sios(bbox)),
        (None, None) => None,
    }
}

/// Two polygons intersect if any of their edges cross or one contains a vertex of the other.
fn intersects(a: &[Coordinate], b: &[Coordinate]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    edges(a).any(|(p1, p2)| edges(b).any(|(q1, q2)| segments_intersect(p1, p2, q1, q2)))
        || a.iter().any(|point| contains(b, *point))
        || b.iter().any(|point| contains(a, *point))
}

fn edges(ring: &[Coordinate]) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(start, end)| (*start, *end))
}

fn orientation(p: Coordinate, q: Coordinate, r: Coordinate) -> f64 {
    (q.lon - p.lon) * (r.lat - p.lat) - (q.lat - p.lat) * (r.lon - p.lon)
}

fn on_segment(p: Coordinate, q: Coordinate, r: Coordinate) -> bool {
    r.lon >= p.lon.min(q.lon)
        && r.lon <= p.lon.max(q.lon)
        && r.lat >= p.lat.min(q.lat)
        && r.lat <= p.lat.max(q.lat)
}

fn segments_intersect(p1: Coordinate, p2: Coordinate, q1: Coordinate, q2: Coordinate) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Even-odd ray casting.
fn contains(ring: &[Coordinate], point: Coordinate) -> bool {
    edges(ring).fold(false, |inside, (a, b)| {
        let crosses = (a.lat > point.lat) != (b.lat > point.lat)
            && point.lon < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon;
        inside != crosses
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geometry::Polygon;

    fn square(west: f64, south: f64, east: f64, north: f64) -> Vec<Coordinate> {
        BoundingBox {
            north,
            south,
            east,
            west,
        }
        .corners()
    }

    #[test]
    fn polygon_inside_region() {
        assert!(within_sios(&square(10.0, 76.0, 20.0, 80.0)));
    }

    #[test]
    fn equatorial_polygon() {
        assert!(!within_sios(&square(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn partial_overlap() {
        assert!(within_sios(&square(30.0, 65.0, 60.0, 72.0)));
    }

    #[test]
    fn region_inside_polygon() {
        assert!(within_sios(&square(-50.0, 60.0, 80.0, 89.9)));
    }

    #[test]
    fn touching_boundary() {
        assert!(within_sios(&square(40.0, 75.0, 50.0, 80.0)));
    }

    #[test]
    fn disjoint_neighbour() {
        assert!(!within_sios(&square(40.5, 75.0, 50.0, 80.0)));
    }

    #[test]
    fn classification_sources() {
        let bbox = BoundingBox {
            north: 80.0,
            south: 78.0,
            east: 20.0,
            west: 10.0,
        };

        assert_eq!(classify(None, Some(&bbox)), Some(true));
        assert_eq!(classify(None, None), None);

        let footprint = Footprint::new(square(0.0, 0.0, 10.0, 10.0), vec![]).unwrap();
        assert_eq!(classify(Some(&footprint), Some(&bbox)), Some(false));
    }

    #[test]
    fn any_part_classifies_footprint() {
        let footprint = Footprint::from_polygons(vec![
            Polygon::new(square(0.0, 0.0, 10.0, 10.0), vec![]).unwrap(),
            Polygon::new(square(15.0, 77.0, 25.0, 79.0), vec![]).unwrap(),
        ])
        .unwrap();

        assert_eq!(classify(Some(&footprint), None), Some(true));
    }
}
