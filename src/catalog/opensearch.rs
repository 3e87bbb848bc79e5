use failure::Error;
use log::info;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::geometry::{extract_polygon, from_geojson, AxisOrder};
use crate::metadata::{normalise_polarisation, MetadataRecord, OrbitDirection, Size};
use crate::reconcile::{Candidate, MetadataSource, Origin, Product};

use super::client::CatalogClient;

#[derive(Clone, Debug, Deserialize, PartialEq)]
struct OpenSearchResponse {
    #[serde(default)]
    features: Vec<OpenSearchFeature>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OpenSearchFeature {
    id: String,
    #[serde(default)]
    geometry: Option<JsonValue>,
    properties: OpenSearchProperties,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct OpenSearchProperties {
    start_date: Option<String>,
    completion_date: Option<String>,
    orbit_number: Option<u64>,
    relative_orbit_number: Option<u64>,
    orbit_direction: Option<String>,
    cloud_cover: Option<f64>,
    sensor_mode: Option<String>,
    polarisation: Option<String>,
    product_type: Option<String>,
    platform: Option<String>,
    instrument: Option<String>,
    #[serde(rename = "gmlgeometry")]
    gml_geometry: Option<String>,
    services: Option<OpenSearchServices>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
struct OpenSearchServices {
    download: Option<OpenSearchDownload>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
struct OpenSearchDownload {
    size: Option<u64>,
}

impl OpenSearchFeature {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalise the feature into a record; the GML footprint is lon,lat.
    pub fn into_candidate(self) -> Result<Candidate, Error> {
        let properties = self.properties;

        let mut record = MetadataRecord {
            start_date: properties.start_date,
            completion_date: properties.completion_date,
            orbit_number: properties.orbit_number,
            relative_orbit_number: properties.relative_orbit_number,
            orbit_direction: properties
                .orbit_direction
                .as_deref()
                .map(OrbitDirection::parse),
            sensor_mode: properties.sensor_mode,
            polarisation: properties
                .polarisation
                .as_deref()
                .map(normalise_polarisation),
            cloud_cover: properties.cloud_cover,
            product_type: properties.product_type,
            platform: properties.platform,
            instrument: properties.instrument,
            size: properties
                .services
                .and_then(|services| services.download)
                .and_then(|download| download.size)
                .map(Size::Bytes),
            ..Default::default()
        };

        let footprint = match (properties.gml_geometry, self.geometry) {
            (Some(gml), _) => Some(extract_polygon(&gml, AxisOrder::LonLat)?),
            (None, Some(geometry)) if !geometry.is_null() => Some(from_geojson(&geometry)?),
            _ => None,
        };
        if let Some(footprint) = footprint {
            record.set_footprint(footprint);
        }

        Ok(Candidate {
            id: Some(self.id),
            record,
            origin: Origin::OpenSearch,
        })
    }
}

/// Searches the OpenSearch (resto) collections of the catalogue.
pub struct OpenSearchClient {
    client: CatalogClient,
    base_url: String,
}

impl OpenSearchClient {
    pub fn new(client: CatalogClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, product: &Product) -> String {
        format!(
            "{}/{}/search.json",
            self.base_url,
            product.mission().collection()
        )
    }

    /// Search by exact product identifier, then by the second token of the filename.
    pub fn search(&self, product: &Product) -> Option<OpenSearchFeature> {
        let url = self.search_url(product);

        let exact = [
            ("productIdentifier", product.basename().to_string()),
            ("maxRecords", "1".to_string()),
        ];
        if let Some(feature) = self.first_feature(&url, &exact) {
            return Some(feature);
        }

        info!("No exact match for {}, trying a broader search", product.basename());
        let token = product.filename().split('_').nth(1)?;
        let broad = [("q", token.to_string()), ("maxRecords", "1".to_string())];

        self.first_feature(&url, &broad)
    }

    fn first_feature(&self, url: &str, params: &[(&str, String)]) -> Option<OpenSearchFeature> {
        self.client
            .query::<OpenSearchResponse>(url, params)
            .and_then(|response| response.features.into_iter().next())
    }
}

impl MetadataSource for OpenSearchClient {
    fn describe(&self) -> String {
        format!("OpenSearch catalogue `{}`", self.base_url)
    }

    fn fetch(&self, product: &Product) -> Result<Option<Candidate>, Error> {
        match self.search(product) {
            Some(feature) => Ok(Some(feature.into_candidate()?)),
            None => Ok(None),
        }
    }
}
