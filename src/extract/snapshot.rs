use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use failure::Error;
use serde_json::Value as JsonValue;

use crate::geometry::{extract_polygon, AxisOrder};
use crate::metadata::{normalise_polarisation, MetadataRecord, OrbitDirection, Scalar, Size};

/// A record re-hydrated from an earlier catalogue query, with the id it was stored under.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub id: Option<String>,
    pub record: MetadataRecord,
}

pub fn metadata_from_snapshot(path: &Path) -> Result<Snapshot, Error> {
    let reader = BufReader::new(File::open(path)?);
    let fields: HashMap<String, JsonValue> = serde_json::from_reader(reader)?;

    parse_snapshot(fields)
}

/// Map the fields of a snapshot into a record. Key casing is ignored.
pub fn parse_snapshot(fields: HashMap<String, JsonValue>) -> Result<Snapshot, Error> {
    let fields: HashMap<String, Scalar> = fields
        .into_iter()
        .filter_map(|(key, value)| Scalar::from_json(&value).map(|value| (key.to_lowercase(), value)))
        .collect();
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| fields.get(*key))
            .map(Scalar::to_string)
    };
    let value = |key: &str| fields.get(key);

    let mut record = MetadataRecord {
        start_date: text(&["beginposition", "startdate"]),
        completion_date: text(&["endposition", "completiondate"]),
        orbit_number: value("orbitnumber").and_then(Scalar::as_u64),
        relative_orbit_number: value("relativeorbitnumber").and_then(Scalar::as_u64),
        orbit_direction: text(&["orbitdirection"]).map(|d| OrbitDirection::parse(&d)),
        sensor_mode: text(&["sensoroperationalmode", "sensormode"]),
        polarisation: text(&["polarisationmode"]).map(|p| normalise_polarisation(&p)),
        cloud_cover: value("cloudcoverpercentage").and_then(Scalar::as_f64),
        product_type: text(&["producttype"]),
        platform: text(&["platformname"]),
        instrument: text(&["instrumentshortname"]),
        size: text(&["size"]).and_then(|size| Size::parse(&size)),
        ..Default::default()
    };

    if let Some(footprint) = text(&["gmlfootprint"]) {
        record.set_footprint(extract_polygon(&footprint, AxisOrder::LatLon)?);
    }

    Ok(Snapshot {
        id: text(&["uuid"]),
        record,
    })
}
