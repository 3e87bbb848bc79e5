use std::path::PathBuf;

use failure::Error;

use crate::mission::LocalFormat;
use crate::reconcile::{Candidate, MetadataSource, Origin, Product};

use super::{netcdf, safe, sen3, snapshot};

/// The product's own data file, read with the extractor of its mission's format.
pub struct ArchiveSource {
    path: PathBuf,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for ArchiveSource {
    fn describe(&self) -> String {
        format!("local file `{}`", self.path.display())
    }

    fn fetch(&self, product: &Product) -> Result<Option<Candidate>, Error> {
        let mission = product.mission();

        let record = match mission.local_format() {
            LocalFormat::Safe => safe::metadata_from_safe(&self.path, mission)?,
            LocalFormat::Sen3 => sen3::metadata_from_sen3(&self.path)?,
            LocalFormat::NetCdf => netcdf::metadata_from_netcdf(&self.path)?,
        };

        Ok(Some(Candidate {
            id: None,
            record,
            origin: Origin::Local,
        }))
    }
}

/// A JSON dump of an earlier catalogue query.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for SnapshotSource {
    fn describe(&self) -> String {
        format!("JSON snapshot `{}`", self.path.display())
    }

    fn fetch(&self, _product: &Product) -> Result<Option<Candidate>, Error> {
        let snapshot = snapshot::metadata_from_snapshot(&self.path)?;

        Ok(Some(Candidate {
            id: snapshot.id,
            record: snapshot.record,
            origin: Origin::Local,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::extract::safe::tests::{S1_MANIFEST, S1_NAME};
    use crate::test_utils;

    #[test]
    fn archive_source_dispatches_on_mission() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_name = format!("{}.SAFE/manifest.safe", S1_NAME);
        let path = test_utils::create_named_zip_archive(
            dir.path(),
            &format!("{}.zip", S1_NAME),
            &[(manifest_name.as_str(), S1_MANIFEST)],
        );
        let product = Product::new(S1_NAME).unwrap();

        let candidate = ArchiveSource::new(&path).fetch(&product).unwrap().unwrap();

        assert_eq!(candidate.id, None);
        assert_eq!(candidate.origin, Origin::Local);
        assert_eq!(candidate.record.orbit_number, Some(12345));
        assert_eq!(candidate.record.north, Some(61.0));
    }

    #[test]
    fn missing_files_are_errors() {
        let product = Product::new(S1_NAME).unwrap();

        assert!(ArchiveSource::new("/nonexistent/product.zip")
            .fetch(&product)
            .is_err());
        assert!(SnapshotSource::new("/nonexistent/product.json")
            .fetch(&product)
            .is_err());
    }
}
