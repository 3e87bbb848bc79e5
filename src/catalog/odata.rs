use std::collections::HashMap;

use failure::Error;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::geometry::{extract_polygon, AxisOrder};
use crate::metadata::{normalise_polarisation, MetadataRecord, OrbitDirection, Scalar, Size};
use crate::reconcile::{Candidate, MetadataSource, Origin, Product};

use super::client::CatalogClient;

#[derive(Clone, Debug, Deserialize, PartialEq)]
struct ODataResponse {
    #[serde(default)]
    value: Vec<ODataProduct>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ODataProduct {
    id: String,
    content_date: Option<ODataContentDate>,
    footprint: Option<String>,
    content_length: Option<u64>,
    #[serde(default)]
    attributes: Vec<ODataAttribute>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct ODataContentDate {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct ODataAttribute {
    name: String,
    #[serde(default)]
    value: JsonValue,
}

impl ODataProduct {
    /// Normalise the product into a record; the WKT footprint is lon,lat.
    pub fn into_candidate(self) -> Result<Candidate, Error> {
        let attributes: HashMap<&str, Scalar> = self
            .attributes
            .iter()
            .filter_map(|attribute| {
                Scalar::from_json(&attribute.value).map(|value| (attribute.name.as_str(), value))
            })
            .collect();
        let text = |name: &str| attributes.get(name).map(Scalar::to_string);

        let platform = match (text("platformShortName"), text("platformSerialIdentifier")) {
            (Some(name), Some(serial)) => Some(format!("{}{}", name, serial)),
            (name, _) => name,
        };
        let (start_date, completion_date) = match self.content_date {
            Some(dates) => (dates.start, dates.end),
            None => (None, None),
        };

        let mut record = MetadataRecord {
            start_date,
            completion_date,
            orbit_number: attributes.get("orbitNumber").and_then(Scalar::as_u64),
            relative_orbit_number: attributes
                .get("relativeOrbitNumber")
                .and_then(Scalar::as_u64),
            orbit_direction: text("orbitDirection").map(|d| OrbitDirection::parse(&d)),
            sensor_mode: text("operationalMode"),
            polarisation: text("polarisationChannels").map(|p| normalise_polarisation(&p)),
            cloud_cover: attributes.get("cloudCover").and_then(Scalar::as_f64),
            product_type: text("productType"),
            platform,
            instrument: text("instrumentShortName"),
            size: self.content_length.map(Size::Bytes),
            ..Default::default()
        };

        if let Some(footprint) = &self.footprint {
            record.set_footprint(extract_polygon(footprint, AxisOrder::LonLat)?);
        }

        Ok(Candidate {
            id: Some(self.id.clone()),
            record,
            origin: Origin::OData {
                product_id: self.id.clone(),
            },
        })
    }
}

/// Queries the OData product endpoint of the catalogue by archived product name.
pub struct ODataClient {
    client: CatalogClient,
    base_url: String,
}

impl ODataClient {
    pub fn new(client: CatalogClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The name of the product in the catalogue, e.g. `S1A_..._4B8B.SAFE`.
    pub fn archived_name(product: &Product) -> String {
        format!(
            "{}{}",
            product.basename(),
            product.mission().container_suffix()
        )
    }

    pub fn search(&self, product: &Product) -> Option<ODataProduct> {
        let params = [
            (
                "$filter",
                format!("Name eq '{}'", Self::archived_name(product)),
            ),
            ("$expand", "Attributes".to_string()),
            ("$top", "1".to_string()),
        ];

        self.client
            .query::<ODataResponse>(&self.base_url, &params)
            .and_then(|response| response.value.into_iter().next())
    }
}

impl MetadataSource for ODataClient {
    fn describe(&self) -> String {
        format!("OData catalogue `{}`", self.base_url)
    }

    fn fetch(&self, product: &Product) -> Result<Option<Candidate>, Error> {
        match self.search(product) {
            Some(odata_product) => Ok(Some(odata_product.into_candidate()?)),
            None => Ok(None),
        }
    }
}
