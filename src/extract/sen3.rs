use std::path::{Path, PathBuf};

use failure::Error;
use log::debug;

use crate::geometry::{parse_coordinates, Footprint};
use crate::metadata::{MetadataRecord, OrbitDirection, Scalar};
use crate::mission::Mission;
use crate::xml_query::XmlQuery;

use super::archive_reader::ArchiveReader;
use super::product_basename;

const ORBIT_NUMBER: &str = "sentinel-safe:orbitNumber";
const RELATIVE_ORBIT_NUMBER: &str = "sentinel-safe:relativeOrbitNumber";
const START_TIME: &str = "sentinel-safe:startTime";
const STOP_TIME: &str = "sentinel-safe:stopTime";
const POS_LIST: &str = "gml:posList";
const CLOUDY_PIXELS: &str = "sentinel3:cloudyPixels";

const MANIFEST_PATTERNS: [&str; 6] = [
    ORBIT_NUMBER,
    RELATIVE_ORBIT_NUMBER,
    START_TIME,
    STOP_TIME,
    POS_LIST,
    CLOUDY_PIXELS,
];

/// The zipped twin of a `.SEN3` product: the path with everything from the first `.`
/// of the file name replaced by `.zip`.
pub fn companion_zip(path: &Path) -> PathBuf {
    path.with_file_name(format!("{}.zip", product_basename(path)))
}

/// Read a Sentinel-3 product from the `xfdumanifest.xml` of its companion ZIP.
pub fn metadata_from_sen3(path: &Path) -> Result<MetadataRecord, Error> {
    let zip_path = companion_zip(path);
    let manifest_name = format!("{}.SEN3/xfdumanifest.xml", product_basename(path));
    debug!("Reading {} from {}", manifest_name, zip_path.display());

    let manifest = ArchiveReader::from_path(&zip_path)?.read_member(&manifest_name)?;

    parse_manifest(&manifest)
}

/// Map the fields of an `xfdumanifest.xml` document into a record.
pub fn parse_manifest(manifest: &[u8]) -> Result<MetadataRecord, Error> {
    let selection = XmlQuery::new(&MANIFEST_PATTERNS).select(manifest)?;

    let mut record = MetadataRecord::default();

    if let Some(orbit) = selection.first(ORBIT_NUMBER) {
        record.orbit_number = Scalar::from(orbit.text.as_str()).as_u64();
        record.orbit_direction = orbit
            .attribute("groundTrackDirection")
            .map(OrbitDirection::parse);
    }

    record.relative_orbit_number = selection
        .first_text(RELATIVE_ORBIT_NUMBER)
        .and_then(|text| Scalar::from(text).as_u64());
    record.start_date = selection.first_text(START_TIME).map(str::to_string);
    record.completion_date = selection.first_text(STOP_TIME).map(str::to_string);

    if let Some(positions) = selection.first_text(POS_LIST) {
        let ring = parse_coordinates(positions, Mission::S3.manifest_axis_order())?;
        record.set_footprint(Footprint::new(ring, Vec::new())?);
    }

    record.cloud_cover = selection
        .first(CLOUDY_PIXELS)
        .and_then(|element| element.attribute("percentage"))
        .and_then(|percentage| Scalar::from(percentage).as_f64());

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geometry::Coordinate;
    use crate::test_utils;

    const S3_NAME: &str = "S3A_OL_1_EFR____20230103T095212_20230103T095512_20230104T141212_0179_094_036_1980_PS1_O_NT_003";

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1"
                   xmlns:sentinel-safe="http://www.esa.int/safe/sentinel/1.1"
                   xmlns:sentinel3="http://www.esa.int/safe/sentinel/sentinel-3/1.0"
                   xmlns:gml="http://www.opengis.net/gml">
            <metadataSection>
                <metadataObject ID="acquisitionPeriod">
                    <sentinel-safe:acquisitionPeriod>
                        <sentinel-safe:startTime>2023-01-03T09:52:12.345678Z</sentinel-safe:startTime>
                        <sentinel-safe:stopTime>2023-01-03T09:55:12.345678Z</sentinel-safe:stopTime>
                    </sentinel-safe:acquisitionPeriod>
                </metadataObject>
                <metadataObject ID="measurementOrbitReference">
                    <sentinel-safe:orbitReference>
                        <sentinel-safe:orbitNumber groundTrackDirection="descending">36012</sentinel-safe:orbitNumber>
                        <sentinel-safe:relativeOrbitNumber groundTrackDirection="descending">94</sentinel-safe:relativeOrbitNumber>
                    </sentinel-safe:orbitReference>
                </metadataObject>
                <metadataObject ID="measurementFrameSet">
                    <sentinel-safe:frameSet>
                        <sentinel-safe:footPrint>
                            <gml:posList>78.1 10.5 79.2 10.5 79.2 25.0 78.1 25.0 78.1 10.5</gml:posList>
                        </sentinel-safe:footPrint>
                    </sentinel-safe:frameSet>
                </metadataObject>
                <metadataObject ID="olciProductInformation">
                    <sentinel3:classificationSummary>
                        <sentinel3:cloudyPixels percentage="42.000000"/>
                    </sentinel3:classificationSummary>
                </metadataObject>
            </metadataSection>
        </xfdu:XFDU>"#;

    #[test]
    fn companion_zip_paths() {
        assert_eq!(
            companion_zip(Path::new("/data/S3A_OL_1_EFR.SEN3")),
            PathBuf::from("/data/S3A_OL_1_EFR.zip")
        );
        assert_eq!(
            companion_zip(Path::new("S3A_OL_1_EFR.SEN3.tar")),
            PathBuf::from("S3A_OL_1_EFR.zip")
        );
    }

    #[test]
    fn sen3_manifest() {
        let record = parse_manifest(MANIFEST.as_bytes()).unwrap();

        assert_eq!(record.orbit_number, Some(36012));
        assert_eq!(record.relative_orbit_number, Some(94));
        assert_eq!(record.orbit_direction, Some(OrbitDirection::Descending));
        assert_eq!(record.cloud_cover, Some(42.0));
        assert_eq!(
            record.completion_date.as_deref(),
            Some("2023-01-03T09:55:12.345678Z")
        );

        // lat,lon position list ends up lon,lat
        assert_eq!(
            record.footprint.as_ref().unwrap().polygons[0].exterior[2],
            Coordinate::new(25.0, 79.2)
        );
        assert_eq!(record.north, Some(79.2));
        assert_eq!(record.south, Some(78.1));
        assert_eq!(record.east, Some(25.0));
        assert_eq!(record.west, Some(10.5));
    }

    #[test]
    fn reads_companion_archive() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_name = format!("{}.SEN3/xfdumanifest.xml", S3_NAME);
        test_utils::create_named_zip_archive(
            dir.path(),
            &format!("{}.zip", S3_NAME),
            &[(manifest_name.as_str(), MANIFEST)],
        );

        let sen3_path = dir.path().join(format!("{}.SEN3", S3_NAME));
        let record = metadata_from_sen3(&sen3_path).unwrap();

        assert_eq!(record.orbit_number, Some(36012));
    }

    #[test]
    fn missing_companion_archive() {
        let dir = tempfile::tempdir().unwrap();

        assert!(metadata_from_sen3(&dir.path().join(format!("{}.SEN3", S3_NAME))).is_err());
    }
}
