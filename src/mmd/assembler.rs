//! Maps a reconciled record and the static descriptors onto an MMD document tree.

use std::path::Path;

use chrono::{DateTime, Utc};
use failure::Error;
use log::{info, warn};

use crate::descriptors::{Descriptors, ProductDescriptor, Vocabulary};
use crate::geometry::{classify, Coordinate, Polygon};
use crate::metadata::MetadataRecord;
use crate::mission::{self, Mission};
use crate::reconcile::{Origin, Product, Resolved};

use super::storage::{checksum, size_mb, CHECKSUM_UNAVAILABLE};
use super::temporal::{normalise_timestamp, update_timestamp};
use super::tree::{text_element, Element};

const DATA_CENTER_SHORT_NAME: &str = "METNO";
const DATA_CENTER_LONG_NAME: &str = "Norwegian Meteorological Institute";

/// Builds MMD documents from the configuration of one run.
pub struct Assembler<'a> {
    descriptors: &'a Descriptors,
    http_root: &'a str,
    odata_url: &'a str,
}

impl<'a> Assembler<'a> {
    pub fn new(descriptors: &'a Descriptors, http_root: &'a str, odata_url: &'a str) -> Self {
        Self {
            descriptors,
            http_root,
            odata_url,
        }
    }

    pub fn assemble(
        &self,
        product: &Product,
        resolved: &Resolved,
        filepath: Option<&Path>,
    ) -> Result<Element, Error> {
        self.assemble_at(product, resolved, filepath, Utc::now())
    }

    /// Assemble the document with `now` as its creation time.
    pub fn assemble_at(
        &self,
        product: &Product,
        resolved: &Resolved,
        filepath: Option<&Path>,
        now: DateTime<Utc>,
    ) -> Result<Element, Error> {
        let mission = product.mission();
        let filename = product.filename();
        let record = &resolved.candidate.record;

        let alias = mission.product_type_alias(filename)?;
        let descriptor = self.descriptors.products.lookup(&alias)?;
        let product_type = descriptor.product_type()?;
        let platform_code = mission::platform_code(filename);
        let platform = self.descriptors.platforms.get(platform_code)?;
        let parent_id = self
            .descriptors
            .parent_ids
            .parent_id(platform_code, product_type)?;
        let global = &self.descriptors.global;

        let mut root = Element::mmd_root();

        root.push(text_element("metadata_identifier", resolved.id.as_str()));
        root.push(text_element("title", product.basename()).with_attribute("xml:lang", "en"));
        root.push(text_element("abstract", descriptor.description()?).with_attribute("xml:lang", "en"));
        root.push(text_element("metadata_status", global.metadata_status.as_str()));
        root.push(text_element(
            "dataset_production_status",
            global.dataset_production_status.as_str(),
        ));

        root.push(text_element("collection", "NBS"));
        match classify(record.footprint.as_ref(), record.bounding_box().as_ref()) {
            Some(true) => root.push(text_element("collection", "SIOS")),
            Some(false) => {}
            None => warn!(
                "Coordinates not present so could not compute whether {} falls within the SIOS area",
                filename
            ),
        }

        root.push(last_metadata_update(now));
        root.push(temporal_extent(record));

        for topic in descriptor.iso_topic_categories()? {
            root.push(text_element("iso_topic_category", topic));
        }
        for vocabulary in [Vocabulary::Gcmdsk, Vocabulary::Gemet] {
            if let Some(keywords) = keywords(&descriptor, vocabulary)? {
                root.push(keywords);
            }
        }

        match geographic_extent(record) {
            Some(extent) => root.push(extent),
            None => warn!("No geometry for {}; the geographic extent is left out", filename),
        }

        root.push(text_element("dataset_language", global.dataset_language.as_str()));
        root.push(text_element("operational_status", global.processing_level.as_str()));
        root.push(text_element("access_constraint", global.access_constraint.as_str()));
        root.push(personnel(
            &global.creator_role,
            &global.creator_name,
            &global.creator_email,
            &global.creator_institution,
        ));
        root.push(personnel(
            &global.contributor_role,
            &global.contributor_name,
            &global.contributor_email,
            &global.contributor_institution,
        ));
        root.push(
            Element::mmd("data_center")
                .with_child(
                    Element::mmd("data_center_name")
                        .with_child(text_element("short_name", DATA_CENTER_SHORT_NAME))
                        .with_child(text_element("long_name", DATA_CENTER_LONG_NAME)),
                )
                .with_child(text_element("data_center_url", global.creator_url.as_str())),
        );

        root.push(storage_information(mission, filename, record, filepath));

        root.push(
            Element::mmd("project")
                .with_child(text_element("short_name", global.project_short_name.as_str()))
                .with_child(text_element("long_name", global.project.as_str())),
        );

        let short_name = mission::platform_short_name(filename);
        let mut platform_element = Element::mmd("platform")
            .with_child(text_element("short_name", short_name))
            .with_child(text_element("long_name", mission::platform_long_name(filename)))
            .with_child(text_element("resource", platform.platform_vocabulary.as_str()));
        for orbit in orbit_elements(record) {
            platform_element.push(orbit);
        }
        for instrument in descriptor.instruments()? {
            let mut element = Element::mmd("instrument")
                .with_child(text_element("short_name", instrument.short_name))
                .with_child(text_element("long_name", instrument.long_name))
                .with_child(text_element("resource", instrument.resource));
            if mission == Mission::S1 {
                if let Some(mode) = &record.sensor_mode {
                    element.push(text_element("mode", mode.as_str()));
                    if let Some(polarisation) = &record.polarisation {
                        element.push(text_element("polarisation", polarisation.as_str()));
                    }
                }
            }
            element.push(text_element("product_type", product_type));
            platform_element.push(element);
        }
        let mut ancillary = Element::mmd("ancillary");
        if let Some(cloud_cover) = record.cloud_cover {
            ancillary.push(text_element("cloud_coverage", format_number(cloud_cover)));
        }
        platform_element.push(ancillary);
        root.push(platform_element);

        root.push(text_element(
            "spatial_representation",
            global.spatial_representation.as_str(),
        ));
        root.push(text_element("activity_type", global.source.as_str()));
        root.push(
            Element::mmd("dataset_citation")
                .with_child(text_element("author", global.creator_name.as_str()))
                .with_child(text_element("title", product.basename())),
        );
        root.push(
            Element::mmd("related_information")
                .with_child(text_element("type", platform.related_information_type.as_str()))
                .with_child(text_element(
                    "description",
                    platform.related_information_description.as_str(),
                ))
                .with_child(text_element(
                    "resource",
                    platform.related_information_resource.as_str(),
                )),
        );
        root.push(
            Element::mmd("use_constraint")
                .with_child(text_element("license_text", global.license_text.as_str())),
        );

        root.push(data_access(
            "HTTP",
            "Direct access to the full data file.",
            mission.archive_url(self.http_root, filename, product_type)?,
        ));
        if let Origin::OData { product_id } = &resolved.candidate.origin {
            root.push(data_access(
                "ODATA",
                "Access to the product through the Copernicus Data Space OData API.",
                format!("{}({})/$value", self.odata_url.trim_end_matches('/'), product_id),
            ));
        }

        root.push(
            text_element("related_dataset", parent_id).with_attribute("relation_type", "parent"),
        );

        info!("Assembled MMD document for {}", filename);

        Ok(root)
    }
}

fn last_metadata_update(now: DateTime<Utc>) -> Element {
    Element::mmd("last_metadata_update").with_child(
        Element::mmd("update")
            .with_child(text_element("datetime", update_timestamp(now)))
            .with_child(text_element("type", "Created"))
            .with_child(Element::mmd("note")),
    )
}

fn temporal_extent(record: &MetadataRecord) -> Element {
    let mut extent = Element::mmd("temporal_extent");

    if let Some(start) = &record.start_date {
        extent.push(text_element("start_date", normalise_timestamp(start)));
    }
    if let Some(end) = &record.completion_date {
        extent.push(text_element("end_date", normalise_timestamp(end)));
    }

    extent
}

fn keywords(descriptor: &ProductDescriptor, vocabulary: Vocabulary) -> Result<Option<Element>, Error> {
    let keywords = descriptor.keywords(vocabulary)?;
    if keywords.is_empty() {
        return Ok(None);
    }

    let mut element = Element::mmd("keywords").with_attribute("vocabulary", vocabulary.name());
    for keyword in keywords {
        element.push(text_element("keyword", keyword));
    }
    element.push(text_element("resource", vocabulary.resource()));
    if let Some(separator) = vocabulary.separator() {
        element.push(text_element("separator", separator));
    }

    Ok(Some(element))
}

/// The rectangle and the polygon are independent; either may be missing.
fn geographic_extent(record: &MetadataRecord) -> Option<Element> {
    let bbox = record.bounding_box();
    if bbox.is_none() && record.footprint.is_none() {
        return None;
    }

    let mut extent = Element::mmd("geographic_extent");
    if let Some(bbox) = bbox {
        extent.push(
            Element::mmd("rectangle")
                .with_attribute("srsName", "EPSG:4326")
                .with_child(text_element("north", format_number(bbox.north)))
                .with_child(text_element("south", format_number(bbox.south)))
                .with_child(text_element("east", format_number(bbox.east)))
                .with_child(text_element("west", format_number(bbox.west))),
        );
    }
    if let Some(footprint) = &record.footprint {
        for (index, polygon) in footprint.polygons.iter().enumerate() {
            let id = match index {
                0 => "polygon".to_string(),
                _ => format!("polygon_{}", index + 1),
            };
            extent.push(Element::mmd("polygon").with_child(gml_polygon(polygon, &id)));
        }
    }

    Some(extent)
}

fn gml_polygon(polygon: &Polygon, id: &str) -> Element {
    let mut element = Element::gml("Polygon")
        .with_attribute("id", id)
        .with_attribute("srsName", "EPSG:4326")
        .with_child(Element::gml("exterior").with_child(linear_ring(&polygon.exterior)));

    for interior in &polygon.interiors {
        element.push(Element::gml("interior").with_child(linear_ring(interior)));
    }

    element
}

fn linear_ring(ring: &[Coordinate]) -> Element {
    let mut linear_ring = Element::gml("LinearRing");
    for coordinate in ring {
        linear_ring.push(Element::gml("pos").with_text(format!(
            "{} {}",
            format_number(coordinate.lon),
            format_number(coordinate.lat)
        )));
    }
    linear_ring
}

fn personnel(role: &str, name: &str, email: &str, organisation: &str) -> Element {
    Element::mmd("personnel")
        .with_child(text_element("role", role))
        .with_child(text_element("name", name))
        .with_child(text_element("email", email))
        .with_child(text_element("organisation", organisation))
}

fn storage_information(
    mission: Mission,
    filename: &str,
    record: &MetadataRecord,
    filepath: Option<&Path>,
) -> Element {
    let extension = filepath
        .and_then(|path| path.extension())
        .or_else(|| Path::new(filename).extension())
        .map(|extension| extension.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut storage = Element::mmd("storage_information")
        .with_child(text_element("file_name", filename))
        .with_child(text_element("file_format", mission.storage_format(&extension)));

    let size = match (record.size, filepath) {
        (Some(size), _) => Some(size.megabytes()),
        (None, Some(path)) => match size_mb(path) {
            Ok(size) => Some(size),
            Err(e) => {
                warn!("Unable to determine the size of {}: {}", path.display(), e);
                None
            }
        },
        (None, None) => {
            warn!("No size known for {} and no local file given", filename);
            None
        }
    };
    if let Some(size) = size {
        storage.push(text_element("file_size", format!("{:.2}", size)).with_attribute("unit", "MB"));
    }

    let checksum = match filepath {
        Some(path) => checksum(path),
        None => CHECKSUM_UNAVAILABLE.to_string(),
    };
    storage.push(text_element("checksum", checksum).with_attribute("type", "md5sum"));

    storage
}

/// Orbit elements are only written for values the record holds.
fn orbit_elements(record: &MetadataRecord) -> Vec<Element> {
    let mut elements = Vec::new();

    if let Some(relative) = record.relative_orbit_number {
        elements.push(text_element("orbit_relative", relative.to_string()));
    }
    if let Some(absolute) = record.orbit_number {
        elements.push(text_element("orbit_absolute", absolute.to_string()));
    }
    if let Some(direction) = record.orbit_direction {
        elements.push(text_element("orbit_direction", direction.as_str()));
    }

    elements
}

fn data_access(kind: &str, description: &str, resource: String) -> Element {
    Element::mmd("data_access")
        .with_child(text_element("type", kind))
        .with_child(text_element("description", description))
        .with_child(text_element("resource", resource))
}

/// Numbers keep a decimal point, e.g. `61.0`, and full precision otherwise.
fn format_number(value: f64) -> String {
    format!("{:?}", value)
}
