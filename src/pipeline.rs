use std::path::Path;

use failure::Error;
use log::info;

use crate::catalog::{CatalogClient, ODataClient, OpenSearchClient};
use crate::descriptors::Descriptors;
use crate::extract::{ArchiveSource, SnapshotSource};
use crate::metadata::lookup_id;
use crate::mmd::{contains_related_dataset, write_document, Assembler};
use crate::reconcile::{Product, Reconciler};
use crate::settings::Settings;

/// What to generate a document for and where to put it.
#[derive(Debug)]
pub struct MmdRequest<'a> {
    pub product: &'a str,
    pub output: &'a Path,
    pub overwrite: bool,
    pub filepath: Option<&'a Path>,
    pub snapshot: Option<&'a Path>,
}

/// Reconcile the product's metadata and write its MMD document.
///
/// Returns `false` without doing anything when the output already references its
/// parent dataset and `overwrite` is not set.
pub fn generate_mmd(
    request: &MmdRequest,
    descriptors: &Descriptors,
    settings: &Settings,
) -> Result<bool, Error> {
    if !request.overwrite && contains_related_dataset(request.output) {
        info!(
            "{} already has a related dataset; not overwriting",
            request.output.display()
        );
        return Ok(false);
    }

    let product = Product::new(request.product)?;

    let mapped_id = settings
        .archive
        .id_mapping_dir
        .as_ref()
        .and_then(|dir| lookup_id(Path::new(dir), product.mission(), product.filename()));
    if let Some(id) = &mapped_id {
        info!("Using id {} from the id mapping", id);
    }

    let policy = settings.retry.policy();
    let odata = ODataClient::new(
        CatalogClient::new(&settings.catalog, policy.clone())?,
        &settings.catalog.odata_url,
    );
    let opensearch = OpenSearchClient::new(
        CatalogClient::new(&settings.catalog, policy)?,
        &settings.catalog.opensearch_url,
    );

    let mut reconciler = Reconciler::new().with_mapped_id(mapped_id);
    if let Some(snapshot) = request.snapshot {
        reconciler = reconciler.with_local(Box::new(SnapshotSource::new(snapshot)));
    }
    if let Some(filepath) = request.filepath {
        reconciler = reconciler.with_local(Box::new(ArchiveSource::new(filepath)));
    }
    let reconciler = reconciler
        .with_odata(Box::new(odata))
        .with_opensearch(Box::new(opensearch));

    let resolved = reconciler.reconcile(&product)?;

    let assembler = Assembler::new(
        descriptors,
        &settings.archive.http_root,
        &settings.catalog.odata_url,
    );
    let document = assembler.assemble(&product, &resolved, request.filepath)?;

    write_document(&document, request.output)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    use crate::descriptors::tests::test_descriptors;
    use crate::extract::{S1_MANIFEST, S1_NAME};
    use crate::settings::{ArchiveSettings, CatalogSettings, GeneralSettings, RetrySettings};
    use crate::test_utils;
    use crate::xml_query::XmlQuery;

    const ID: &str = "0f6c4b9e-9f5e-4bd8-9c3c-1e2a3f4b5c6d";

    fn settings(id_mapping_dir: &Path) -> Settings {
        Settings {
            general: GeneralSettings {
                log_file: "sentinel_mmd.log".to_string(),
                debug: false,
            },
            catalog: CatalogSettings {
                opensearch_url: mockito::server_url(),
                odata_url: format!("{}/odata/v1/Products", mockito::server_url()),
                request_timeout_secs: 5,
                access_token: None,
            },
            retry: RetrySettings {
                max_attempts: 1,
                base_delay_secs: 0.0,
                max_delay_secs: 0.0,
                jitter_min: 1.0,
                jitter_max: 1.0,
            },
            archive: ArchiveSettings {
                http_root: "https://nbstds.met.no/thredds/fileServer/nbsArchive/".to_string(),
                id_mapping_dir: Some(id_mapping_dir.display().to_string()),
            },
        }
    }

    #[test]
    fn document_from_local_archive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Sentinel-1_20230101-20231231_mapping.json"),
            format!("{{\"{}\": \"{}\"}}", S1_NAME, ID),
        )
        .unwrap();
        let manifest_name = format!("{}.SAFE/manifest.safe", S1_NAME);
        let filepath = test_utils::create_named_zip_archive(
            dir.path(),
            &format!("{}.zip", S1_NAME),
            &[(manifest_name.as_str(), S1_MANIFEST)],
        );
        let output = dir.path().join("product.xml");
        let filename = format!("{}.zip", S1_NAME);
        let request = MmdRequest {
            product: &filename,
            output: &output,
            overwrite: false,
            filepath: Some(&filepath),
            snapshot: None,
        };

        let written = generate_mmd(&request, &test_descriptors(), &settings(dir.path())).unwrap();

        assert!(written);
        let xml = fs::read(&output).unwrap();
        let selection = XmlQuery::new(&[
            "mmd:metadata_identifier",
            "mmd:north",
            "mmd:west",
            "mmd:orbit_absolute",
            "mmd:checksum",
            "mmd:file_format",
        ])
        .select(&xml)
        .unwrap();
        assert_eq!(selection.first_text("mmd:metadata_identifier"), Some(ID));
        assert_eq!(selection.first_text("mmd:north"), Some("61.0"));
        assert_eq!(selection.first_text("mmd:west"), Some("10.0"));
        assert_eq!(selection.first_text("mmd:orbit_absolute"), Some("12345"));
        assert_eq!(selection.first_text("mmd:file_format"), Some("SAFE"));
        assert_eq!(
            selection.first_text("mmd:checksum").map(str::len),
            Some(32)
        );

        let again = generate_mmd(&request, &test_descriptors(), &settings(dir.path())).unwrap();
        assert!(!again);
    }

    #[test]
    fn existing_document_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let output = test_utils::create_temp_file_with_suffix(
            ".xml",
            "<mmd:mmd xmlns:mmd=\"http://www.met.no/schema/mmd\"><mmd:related_dataset relation_type=\"parent\">no.met:1</mmd:related_dataset></mmd:mmd>",
        );
        let request = MmdRequest {
            product: "not a sentinel product",
            output: &output,
            overwrite: false,
            filepath: None,
            snapshot: None,
        };

        assert!(!generate_mmd(&request, &test_descriptors(), &settings(dir.path())).unwrap());
    }

    #[test]
    fn unknown_mission_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("product.xml");
        let request = MmdRequest {
            product: "LC08_L1TP_198018_20230101.tar",
            output: &output,
            overwrite: true,
            filepath: None,
            snapshot: None,
        };

        assert!(generate_mmd(&request, &test_descriptors(), &settings(dir.path())).is_err());
        assert!(!output.exists());
    }
}
