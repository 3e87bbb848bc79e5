use std::path::Path;

use failure::Error;
use log::{debug, warn};

use crate::geometry::{parse_coordinates, Footprint};
use crate::metadata::{MetadataRecord, OrbitDirection, Scalar};
use crate::mission::Mission;
use crate::xml_query::XmlQuery;

use super::archive_reader::{ArchiveReader, MissingArchiveMemberError};
use super::product_basename;

const ORBIT_NUMBER: &str = "safe:orbitNumber";
const RELATIVE_ORBIT_NUMBER: &str = "safe:relativeOrbitNumber";
const PASS: &str = "s1:pass";
const START_TIME: &str = "safe:startTime";
const STOP_TIME: &str = "safe:stopTime";
const COORDINATES: &str = "gml:coordinates";
const MODE: &str = "s1sarl1:mode";
const POLARISATION: &str = "s1sarl1:transmitterReceiverPolarisation";

const MANIFEST_PATTERNS: [&str; 8] = [
    ORBIT_NUMBER,
    RELATIVE_ORBIT_NUMBER,
    PASS,
    START_TIME,
    STOP_TIME,
    COORDINATES,
    MODE,
    POLARISATION,
];

const CLOUD_COVER: &str = "*:Cloud_Coverage_Assessment";

/// Read a Sentinel-1/2 product from its zipped SAFE directory.
pub fn metadata_from_safe(path: &Path, mission: Mission) -> Result<MetadataRecord, Error> {
    let root = format!("{}.SAFE", product_basename(path));
    let manifest_name = format!("{}/manifest.safe", root);

    let mut archive = ArchiveReader::from_path(path)?;

    let manifest_name = if archive.contains(&manifest_name) {
        manifest_name
    } else {
        archive
            .find_member(|name| name.ends_with("manifest.safe"))
            .ok_or_else(|| {
                MissingArchiveMemberError::new(&path.display().to_string(), &manifest_name)
            })?
    };
    debug!("Reading {} from {}", manifest_name, path.display());

    let manifest = archive.read_member(&manifest_name)?;
    let mut record = parse_manifest(&manifest, mission)?;

    let metadata_prefix = format!("{}/MTD_", root);
    if let Some(metadata_name) =
        archive.find_member(|name| name.starts_with(&metadata_prefix) && name.ends_with(".xml"))
    {
        match archive
            .read_member(&metadata_name)
            .and_then(|bytes| cloud_cover(&bytes))
        {
            Ok(cloud_cover) => record.cloud_cover = cloud_cover,
            Err(e) => warn!("Unable to read cloud cover from {}: {}", metadata_name, e),
        }
    }

    Ok(record)
}

/// Map the fields of a `manifest.safe` document into a record.
pub fn parse_manifest(manifest: &[u8], mission: Mission) -> Result<MetadataRecord, Error> {
    let selection = XmlQuery::new(&MANIFEST_PATTERNS).select(manifest)?;

    let mut record = MetadataRecord::default();

    if let Some(orbit) = selection.first(ORBIT_NUMBER) {
        record.orbit_number = Scalar::from(orbit.text.as_str()).as_u64();
        record.orbit_direction = orbit
            .attribute("groundTrackDirection")
            .or_else(|| selection.first_text(PASS))
            .map(OrbitDirection::parse);
    }

    record.relative_orbit_number = selection
        .first_text(RELATIVE_ORBIT_NUMBER)
        .and_then(|text| Scalar::from(text).as_u64());

    record.start_date = selection.first_text(START_TIME).map(str::to_string);
    record.completion_date = selection
        .first_text(STOP_TIME)
        .map(str::to_string)
        .or_else(|| record.start_date.clone());

    if let Some(coordinates) = selection.first_text(COORDINATES) {
        let ring = parse_coordinates(coordinates, mission.manifest_axis_order())?;
        record.set_footprint(Footprint::new(ring, Vec::new())?);
    }

    if mission == Mission::S1 {
        record.sensor_mode = selection.first_text(MODE).map(str::to_string);

        let polarisations: Vec<&str> = selection
            .all(POLARISATION)
            .iter()
            .map(|element| element.text.trim())
            .filter(|text| !text.is_empty())
            .collect();
        if !polarisations.is_empty() {
            record.polarisation = Some(polarisations.join("+"));
        }
    }

    Ok(record)
}

fn cloud_cover(xml_bytes: &[u8]) -> Result<Option<f64>, Error> {
    let patterns = [CLOUD_COVER];
    let selection = XmlQuery::new(&patterns).select(xml_bytes)?;

    Ok(selection
        .first_text(CLOUD_COVER)
        .and_then(|text| Scalar::from(text).as_f64()))
}
