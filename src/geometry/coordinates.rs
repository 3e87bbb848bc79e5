use failure::Fail;

/// A position in canonical (longitude, latitude) order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// The axis order in which a source writes its coordinate pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisOrder {
    LonLat,
    LatLon,
}

impl AxisOrder {
    /// Build a canonical coordinate from a pair as written by the source.
    pub fn coordinate(self, first: f64, second: f64) -> Coordinate {
        match self {
            AxisOrder::LonLat => Coordinate::new(first, second),
            AxisOrder::LatLon => Coordinate::new(second, first),
        }
    }
}

/// Parse a coordinate list into canonical coordinates.
///
/// Two layouts are accepted: comma pairs separated by whitespace (`"a,b c,d"`, as in
/// `gml:coordinates`) and flat whitespace separated lists (`"a b c d"`, as in `gml:posList`).
pub fn parse_coordinates(text: &str, order: AxisOrder) -> Result<Vec<Coordinate>, FormatError> {
    if text.contains(',') {
        text.split_whitespace()
            .map(|pair| {
                let mut parts = pair.split(',');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(first), Some(second), None) => {
                        Ok(order.coordinate(parse_number(first)?, parse_number(second)?))
                    }
                    _ => Err(FormatError::new(format!("invalid coordinate pair `{}`", pair))),
                }
            })
            .collect()
    } else {
        let numbers = text
            .split_whitespace()
            .map(parse_number)
            .collect::<Result<Vec<f64>, FormatError>>()?;

        if numbers.len() % 2 != 0 {
            return Err(FormatError::new(format!(
                "odd number of values ({}) in position list",
                numbers.len()
            )));
        }

        Ok(numbers
            .chunks(2)
            .map(|pair| order.coordinate(pair[0], pair[1]))
            .collect())
    }
}

pub(super) fn parse_number(token: &str) -> Result<f64, FormatError> {
    token
        .trim()
        .parse()
        .map_err(|_| FormatError::new(format!("`{}` is not a number", token)))
}

/// This error occurs when a geometry string matches none of the known formats.
#[derive(Debug, Fail)]
#[fail(display = "Unsupported geometry format: {}", reason)]
pub struct FormatError {
    reason: String,
}

impl FormatError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_pairs_lat_lon() {
        let coordinates =
            parse_coordinates("60.0,10.0 61.0,10.0 61.0,11.0", AxisOrder::LatLon).unwrap();

        assert_eq!(
            coordinates,
            vec![
                Coordinate::new(10.0, 60.0),
                Coordinate::new(10.0, 61.0),
                Coordinate::new(11.0, 61.0),
            ]
        );
    }

    #[test]
    fn flat_list_lat_lon() {
        let coordinates = parse_coordinates(
            "78.5 15.2\n  79.0 15.2 79.0 16.8",
            AxisOrder::LatLon,
        )
        .unwrap();

        assert_eq!(coordinates[0], Coordinate::new(15.2, 78.5));
        assert_eq!(coordinates[2], Coordinate::new(16.8, 79.0));
    }

    #[test]
    fn lon_lat_is_kept() {
        let coordinates = parse_coordinates("10.0,60.0 11.0,61.0", AxisOrder::LonLat).unwrap();

        assert_eq!(coordinates[1], Coordinate::new(11.0, 61.0));
    }

    #[test]
    fn malformed_lists() {
        assert!(parse_coordinates("1 2 3", AxisOrder::LonLat).is_err());
        assert!(parse_coordinates("1,2,3 4,5,6", AxisOrder::LonLat).is_err());
        assert!(parse_coordinates("1,north 2,3", AxisOrder::LonLat).is_err());
    }

    #[test]
    fn empty_list() {
        assert!(parse_coordinates("  ", AxisOrder::LonLat).unwrap().is_empty());
    }
}
