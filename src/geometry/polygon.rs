use failure::Error;
use failure::Fail;
use serde_json::Value;

use crate::xml_query::XmlQuery;

use super::bounding_box::{bounding_box, BoundingBox};
use super::coordinates::{parse_coordinates, parse_number, AxisOrder, Coordinate, FormatError};

/// One part of a footprint: an exterior ring and optional holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<Coordinate>,
    pub interiors: Vec<Vec<Coordinate>>,
}

impl Polygon {
    pub fn new(
        exterior: Vec<Coordinate>,
        interiors: Vec<Vec<Coordinate>>,
    ) -> Result<Self, InsufficientGeometryError> {
        if exterior.len() < 3 {
            return Err(InsufficientGeometryError::new(exterior.len()));
        }

        Ok(Self {
            exterior,
            interiors,
        })
    }
}

/// A product footprint in canonical order, made of one or more polygons.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    pub polygons: Vec<Polygon>,
}

impl Footprint {
    /// A footprint of a single polygon.
    pub fn new(
        exterior: Vec<Coordinate>,
        interiors: Vec<Vec<Coordinate>>,
    ) -> Result<Self, InsufficientGeometryError> {
        Ok(Self {
            polygons: vec![Polygon::new(exterior, interiors)?],
        })
    }

    pub fn from_polygons(polygons: Vec<Polygon>) -> Result<Self, InsufficientGeometryError> {
        if polygons.is_empty() {
            return Err(InsufficientGeometryError::new(0));
        }

        Ok(Self { polygons })
    }

    /// The bounds of all exterior rings together.
    pub fn bounding_box(&self) -> Result<BoundingBox, InsufficientGeometryError> {
        let points = self
            .polygons
            .iter()
            .flat_map(|polygon| polygon.exterior.iter().copied())
            .collect::<Vec<_>>();

        bounding_box(&points)
    }
}

/// Extract a footprint from a WKT or GML polygon.
///
/// WKT must carry an SRID marker (`SRID=4326;POLYGON((...))`) and may be wrapped in
/// `geography'...'`. Every polygon of a `MULTIPOLYGON` is kept.
/// GML is a `Polygon` with an `outerBoundaryIs` or `exterior` ring and any number of
/// `innerBoundaryIs` or `interior` rings, given as `coordinates` or `posList`.
pub fn extract_polygon(raw: &str, order: AxisOrder) -> Result<Footprint, Error> {
    let raw = raw.trim();

    if raw.starts_with('<') {
        parse_gml(raw, order)
    } else if let Some(wkt) = wkt_body(raw) {
        parse_wkt(wkt, order)
    } else {
        Err(FormatError::new("neither WKT with an SRID nor a GML polygon").into())
    }
}

/// Build a footprint from a GeoJSON `Polygon` or `MultiPolygon` geometry object.
pub fn from_geojson(geometry: &Value) -> Result<Footprint, Error> {
    let polygons = match (geometry["type"].as_str(), &geometry["coordinates"]) {
        (Some("Polygon"), rings) => vec![geojson_polygon(rings)?],
        (Some("MultiPolygon"), polygons) => polygons
            .as_array()
            .ok_or_else(|| FormatError::new("GeoJSON multipolygon without polygons"))?
            .iter()
            .map(geojson_polygon)
            .collect::<Result<Vec<_>, _>>()?,
        (kind, _) => {
            return Err(
                FormatError::new(format!("unsupported GeoJSON geometry {:?}", kind)).into(),
            )
        }
    };

    Ok(Footprint::from_polygons(polygons)?)
}

fn geojson_polygon(rings: &Value) -> Result<Polygon, Error> {
    let mut rings = rings
        .as_array()
        .ok_or_else(|| FormatError::new("GeoJSON polygon without rings"))?
        .iter()
        .map(geojson_ring);

    let exterior = rings
        .next()
        .ok_or_else(|| FormatError::new("GeoJSON polygon without rings"))??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors)?)
}

fn geojson_ring(ring: &Value) -> Result<Vec<Coordinate>, FormatError> {
    ring.as_array()
        .ok_or_else(|| FormatError::new("GeoJSON ring is not an array"))?
        .iter()
        .map(|position| match (position[0].as_f64(), position[1].as_f64()) {
            (Some(lon), Some(lat)) => Ok(Coordinate::new(lon, lat)),
            _ => Err(FormatError::new(format!("invalid GeoJSON position {}", position))),
        })
        .collect()
}

/// The geometry text after the SRID marker, without any `geography'...'` wrapper.
fn wkt_body(raw: &str) -> Option<&str> {
    let unwrapped = raw
        .strip_prefix("geography'")
        .map(|inner| inner.trim_end_matches('\''))
        .unwrap_or(raw);

    let (marker, body) = unwrapped.split_once(';')?;
    if marker.trim().to_ascii_uppercase().starts_with("SRID=") {
        Some(body.trim())
    } else {
        None
    }
}

fn parse_wkt(wkt: &str, order: AxisOrder) -> Result<Footprint, Error> {
    let upper = wkt.to_ascii_uppercase();
    let ring_depth = if upper.starts_with("MULTIPOLYGON") {
        3
    } else if upper.starts_with("POLYGON") {
        2
    } else {
        return Err(FormatError::new(format!("unsupported WKT geometry `{}`", wkt)).into());
    };

    let polygons = wkt_polygons(wkt, ring_depth)?
        .iter()
        .map(|rings| wkt_polygon(rings, order))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Footprint::from_polygons(polygons)?)
}

fn wkt_polygon(rings: &[String], order: AxisOrder) -> Result<Polygon, Error> {
    let mut rings = rings.iter().map(|ring| wkt_ring(ring, order));

    let exterior = rings.next().transpose()?.unwrap_or_default();
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors)?)
}

/// Collect the ring texts of every polygon; rings sit at `ring_depth` parentheses.
fn wkt_polygons(wkt: &str, ring_depth: usize) -> Result<Vec<Vec<String>>, FormatError> {
    let mut polygons = Vec::new();
    let mut rings = Vec::new();
    let mut current = String::new();
    let mut depth = 0;

    for c in wkt.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth == ring_depth {
                    current.clear();
                }
            }
            ')' => {
                if depth == 0 {
                    return Err(FormatError::new("unbalanced parentheses in WKT"));
                }
                if depth == ring_depth {
                    rings.push(current.clone());
                }
                if depth == ring_depth - 1 {
                    polygons.push(std::mem::take(&mut rings));
                }
                depth -= 1;
                if depth == 0 {
                    return Ok(polygons);
                }
            }
            _ if depth == ring_depth => current.push(c),
            _ => (),
        }
    }

    Err(FormatError::new("unbalanced parentheses in WKT"))
}

fn wkt_ring(ring: &str, order: AxisOrder) -> Result<Vec<Coordinate>, FormatError> {
    ring.split(',')
        .map(|position| {
            let mut values = position.split_whitespace();
            match (values.next(), values.next()) {
                (Some(first), Some(second)) => {
                    Ok(order.coordinate(parse_number(first)?, parse_number(second)?))
                }
                _ => Err(FormatError::new(format!("invalid WKT position `{}`", position))),
            }
        })
        .collect()
}

fn parse_gml(gml: &str, order: AxisOrder) -> Result<Footprint, Error> {
    let patterns = [
        "*:outerBoundaryIs",
        "*:exterior",
        "*:innerBoundaryIs",
        "*:interior",
    ];
    let selection = XmlQuery::new(&patterns).select(gml.as_bytes())?;

    let exterior = selection
        .first("*:outerBoundaryIs")
        .or_else(|| selection.first("*:exterior"))
        .ok_or_else(|| FormatError::new("GML polygon without an exterior ring"))?;
    let exterior = parse_coordinates(&exterior.text, order)?;

    let interiors = selection
        .all("*:innerBoundaryIs")
        .iter()
        .chain(selection.all("*:interior"))
        .map(|ring| parse_coordinates(&ring.text, order))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Footprint::new(exterior, interiors)?)
}

/// This error occurs when a ring has too few distinct points to span an area.
#[derive(Debug, Fail)]
#[fail(display = "Insufficient geometry: a ring needs at least 3 points, got {}", points)]
pub struct InsufficientGeometryError {
    points: usize,
}

impl InsufficientGeometryError {
    pub fn new(points: usize) -> Self {
        Self { points }
    }
}
