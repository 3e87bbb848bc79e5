use std::collections::HashMap;
use std::path::Path;

use failure::Error;
use log::debug;
use netcdf::AttributeValue;

use crate::metadata::{MetadataRecord, Scalar};

/// Stores one attribute value in its record field.
type FieldSetter = fn(&mut MetadataRecord, &Scalar);

/// NetCDF global attributes and the record fields they fill.
pub const ATTRIBUTE_TABLE: [(&str, FieldSetter); 7] = [
    ("time_coverage_start", |record, value| {
        record.start_date = Some(value.to_string())
    }),
    ("time_coverage_end", |record, value| {
        record.completion_date = Some(value.to_string())
    }),
    ("geospatial_lat_max", |record, value| record.north = value.as_f64()),
    ("geospatial_lat_min", |record, value| record.south = value.as_f64()),
    ("geospatial_lon_max", |record, value| record.east = value.as_f64()),
    ("geospatial_lon_min", |record, value| record.west = value.as_f64()),
    ("orbit", |record, value| record.orbit_number = value.as_u64()),
];

/// Map global attributes into a record. Attributes outside the table are ignored.
pub fn record_from_attributes(attributes: &HashMap<String, Scalar>) -> MetadataRecord {
    let mut record = MetadataRecord::default();

    for (attribute, set_field) in ATTRIBUTE_TABLE.iter() {
        if let Some(value) = attributes.get(*attribute) {
            set_field(&mut record, value);
        }
    }

    record
}

/// Read the global attributes of a NetCDF file, without touching its variables.
pub fn metadata_from_netcdf(path: &Path) -> Result<MetadataRecord, Error> {
    let file = netcdf::open(path)?;

    let mut attributes = HashMap::new();
    for attribute in file.attributes() {
        match scalar(attribute.value()?) {
            Some(scalar) => {
                attributes.insert(attribute.name().to_string(), scalar);
            }
            None => debug!("Skipping attribute {} of {}", attribute.name(), path.display()),
        }
    }

    Ok(record_from_attributes(&attributes))
}

/// The first element of an attribute; byte strings become text.
fn scalar(value: AttributeValue) -> Option<Scalar> {
    match value {
        AttributeValue::Str(value) => Some(Scalar::from(value)),
        AttributeValue::Strs(values) => values.into_iter().next().map(Scalar::from),
        AttributeValue::Uchars(bytes) => Some(Scalar::from(bytes.as_slice())),
        AttributeValue::Double(value) => Some(Scalar::from(value)),
        AttributeValue::Doubles(values) => values.first().map(|v| Scalar::from(*v)),
        AttributeValue::Float(value) => Some(Scalar::from(f64::from(value))),
        AttributeValue::Floats(values) => values.first().map(|v| Scalar::from(f64::from(*v))),
        AttributeValue::Int(value) => Some(Scalar::from(i64::from(value))),
        AttributeValue::Ints(values) => values.first().map(|v| Scalar::from(i64::from(*v))),
        AttributeValue::Short(value) => Some(Scalar::from(i64::from(value))),
        AttributeValue::Longlong(value) => Some(Scalar::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_mapping() {
        let mut attributes = HashMap::new();
        attributes.insert(
            "time_coverage_start".to_string(),
            Scalar::from("2023-01-04T11:12:13Z"),
        );
        attributes.insert(
            "time_coverage_end".to_string(),
            Scalar::from(&b"2023-01-04T12:53:43Z"[..]),
        );
        attributes.insert("geospatial_lat_max".to_string(), Scalar::from(89.97));
        attributes.insert("geospatial_lat_min".to_string(), Scalar::from("-89.9"));
        attributes.insert("geospatial_lon_max".to_string(), Scalar::from(180.0));
        attributes.insert("geospatial_lon_min".to_string(), Scalar::from(-180.0));
        attributes.insert("orbit".to_string(), Scalar::from(27153_i64));
        attributes.insert("title".to_string(), Scalar::from("TROPOMI/S5P NO2"));

        let record = record_from_attributes(&attributes);

        assert_eq!(record.start_date.as_deref(), Some("2023-01-04T11:12:13Z"));
        assert_eq!(record.completion_date.as_deref(), Some("2023-01-04T12:53:43Z"));
        assert_eq!(record.north, Some(89.97));
        assert_eq!(record.south, Some(-89.9));
        assert_eq!(record.east, Some(180.0));
        assert_eq!(record.west, Some(-180.0));
        assert_eq!(record.orbit_number, Some(27153));
        assert!(record.footprint.is_none());
    }

    #[test]
    fn partial_attributes() {
        let mut attributes = HashMap::new();
        attributes.insert("orbit".to_string(), Scalar::from("not a number"));

        let record = record_from_attributes(&attributes);

        assert_eq!(record, MetadataRecord::default());
    }

    #[test]
    fn global_attributes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S5P_OFFL_L2__NO2.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_attribute("time_coverage_start", "2023-01-04T11:12:13Z")
                .unwrap();
            file.add_attribute("time_coverage_end", "2023-01-04T12:53:43Z")
                .unwrap();
            file.add_attribute("geospatial_lat_max", 89.75_f64).unwrap();
            file.add_attribute("geospatial_lat_min", -89.5_f32).unwrap();
            file.add_attribute("geospatial_lon_max", 180.0_f64).unwrap();
            file.add_attribute("geospatial_lon_min", -180.0_f64).unwrap();
            file.add_attribute("orbit", 27153_i32).unwrap();
            file.add_attribute("title", "TROPOMI/S5P NO2").unwrap();
        }

        let record = metadata_from_netcdf(&path).unwrap();

        assert_eq!(record.start_date.as_deref(), Some("2023-01-04T11:12:13Z"));
        assert_eq!(record.completion_date.as_deref(), Some("2023-01-04T12:53:43Z"));
        assert_eq!(record.north, Some(89.75));
        assert_eq!(record.south, Some(-89.5));
        assert_eq!(record.east, Some(180.0));
        assert_eq!(record.west, Some(-180.0));
        assert_eq!(record.orbit_number, Some(27153));
    }

    #[test]
    fn every_table_attribute_fills_a_field() {
        for (attribute, set_field) in ATTRIBUTE_TABLE.iter() {
            let mut record = MetadataRecord::default();

            set_field(&mut record, &Scalar::from(42_i64));

            assert_ne!(record, MetadataRecord::default(), "{}", attribute);
        }
    }

    #[test]
    fn unreadable_file() {
        let path = crate::test_utils::create_temp_file_with_suffix(".nc", "not netcdf");

        assert!(metadata_from_netcdf(&path).is_err());
    }
}
