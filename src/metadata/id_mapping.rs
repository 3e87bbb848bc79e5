use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use failure::Error;
use log::debug;

use crate::mission::{basename, Mission};

/// Look up the archive id of a product in the yearly id mapping files of its mission.
///
/// Mapping files are named `{mission}_{year}0101-{year}...mapping...`; when several
/// match, the last one by name wins. Any failure yields `None`.
pub fn lookup_id(mapping_dir: &Path, mission: Mission, filename: &str) -> Option<String> {
    match try_lookup_id(mapping_dir, mission, filename) {
        Ok(id) => id,
        Err(e) => {
            debug!("No id mapping for {}: {}", filename, e);
            None
        }
    }
}

fn try_lookup_id(mapping_dir: &Path, mission: Mission, filename: &str) -> Result<Option<String>, Error> {
    let year = match first_year(filename) {
        Some(year) => year,
        None => return Ok(None),
    };

    let mapping_file = match mapping_file(mapping_dir, mission, year)? {
        Some(path) => path,
        None => return Ok(None),
    };

    let reader = BufReader::new(File::open(&mapping_file)?);
    let mut ids: HashMap<String, String> = serde_json::from_reader(reader)?;

    Ok(ids.remove(basename(filename)))
}

fn mapping_file(mapping_dir: &Path, mission: Mission, year: &str) -> Result<Option<PathBuf>, Error> {
    let prefix = format!("{}_{}0101-{}", mission.mapping_label(), year, year);

    let mut candidates = Vec::new();
    for entry in fs::read_dir(mapping_dir)? {
        let path = entry?.path();
        let is_candidate = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| {
                name.starts_with(&prefix) && name[prefix.len()..].contains("mapping")
            });

        if is_candidate {
            candidates.push(path);
        }
    }
    candidates.sort();

    Ok(candidates.pop())
}

/// The first run of four digits in a filename.
fn first_year(filename: &str) -> Option<&str> {
    let bytes = filename.as_bytes();

    (0..bytes.len().saturating_sub(3))
        .find(|&start| bytes[start..start + 4].iter().all(u8::is_ascii_digit))
        .map(|start| &filename[start..start + 4])
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const FILENAME: &str = "S1A_IW_GRDH_1SDV_20230101T050212_20230101T050237_046583_059507_4B8B.zip";

    #[test]
    fn years() {
        assert_eq!(first_year(FILENAME), Some("2023"));
        assert_eq!(
            first_year("S5P_OFFL_L2__NO2____20230104T111213"),
            Some("2023")
        );
        assert_eq!(first_year("S1A_IW"), None);
    }

    #[test]
    fn latest_mapping_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Sentinel-1_20230101-20230630_mapping.json"),
            r#"{"S1A_IW_GRDH_1SDV_20230101T050212_20230101T050237_046583_059507_4B8B": "old"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("Sentinel-1_20230101-20231231_mapping.json"),
            r#"{"S1A_IW_GRDH_1SDV_20230101T050212_20230101T050237_046583_059507_4B8B": "no.met.nbs:0f6c4b9e-9f5e-4bd8-9c3c-1e2a3f4b5c6d"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("Sentinel-2_20230101-20231231_mapping.json"),
            "{}",
        )
        .unwrap();

        assert_eq!(
            lookup_id(dir.path(), Mission::S1, FILENAME).as_deref(),
            Some("no.met.nbs:0f6c4b9e-9f5e-4bd8-9c3c-1e2a3f4b5c6d")
        );
    }

    #[test]
    fn unmapped_products() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Sentinel-1_20230101-20231231_mapping.json"),
            r#"{"other": "id"}"#,
        )
        .unwrap();

        assert_eq!(lookup_id(dir.path(), Mission::S1, FILENAME), None);
        assert_eq!(lookup_id(dir.path(), Mission::S2, FILENAME), None);
        assert_eq!(
            lookup_id(&dir.path().join("missing"), Mission::S1, FILENAME),
            None
        );
    }
}
