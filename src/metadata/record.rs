use uuid::Uuid;

use crate::geometry::{BoundingBox, Footprint};

/// The namespace an identifier may be prefixed with.
pub const ID_NAMESPACE: &str = "no.met.nbs:";

/// The fields a record needs besides a valid identifier, in reporting order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "north",
    "south",
    "east",
    "west",
    "orbitNumber",
    "completionDate",
    "startDate",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitDirection {
    Ascending,
    Descending,
    Unknown,
}

impl OrbitDirection {
    /// Parse a direction by its first letter, so `ASCENDING`, `ascending` and `a` agree.
    pub fn parse(value: &str) -> Self {
        match value.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('a') => OrbitDirection::Ascending,
            Some('d') => OrbitDirection::Descending,
            _ => OrbitDirection::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrbitDirection::Ascending => "ascending",
            OrbitDirection::Descending => "descending",
            OrbitDirection::Unknown => "unknown",
        }
    }
}

/// The size of a product as reported by a source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Size {
    Bytes(u64),
    Megabytes(f64),
}

impl Size {
    /// Parse a textual size such as `1.2 GB` or `845.12 MB`. A bare number is in megabytes.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let split = value
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let number: f64 = number.trim().parse().ok()?;

        let factor = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "MB" => 1.0,
            "KB" => 1.0 / 1024.0,
            "GB" => 1024.0,
            "TB" => 1024.0 * 1024.0,
            _ => return None,
        };

        Some(Size::Megabytes(number * factor))
    }

    pub fn megabytes(self) -> f64 {
        match self {
            Size::Bytes(bytes) => bytes as f64 / 1_048_576.0,
            Size::Megabytes(megabytes) => megabytes,
        }
    }
}

/// A partial description of a product, as produced by one source.
///
/// Coordinates are canonical (longitude, latitude) in every record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataRecord {
    pub start_date: Option<String>,
    pub completion_date: Option<String>,
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
    pub footprint: Option<Footprint>,
    pub orbit_number: Option<u64>,
    pub relative_orbit_number: Option<u64>,
    pub orbit_direction: Option<OrbitDirection>,
    pub sensor_mode: Option<String>,
    pub polarisation: Option<String>,
    pub cloud_cover: Option<f64>,
    pub product_type: Option<String>,
    pub platform: Option<String>,
    pub instrument: Option<String>,
    pub size: Option<Size>,
}

impl MetadataRecord {
    /// The bounding box, if all four bounds are known.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox {
            north: self.north?,
            south: self.south?,
            east: self.east?,
            west: self.west?,
        })
    }

    pub fn set_bounding_box(&mut self, bbox: BoundingBox) {
        self.north = Some(bbox.north);
        self.south = Some(bbox.south);
        self.east = Some(bbox.east);
        self.west = Some(bbox.west);
    }

    /// Set the footprint and derive the bounds from its exterior ring.
    pub fn set_footprint(&mut self, footprint: Footprint) {
        if let Ok(bbox) = footprint.bounding_box() {
            self.set_bounding_box(bbox);
        }
        self.footprint = Some(footprint);
    }

    /// The names of all required fields the record lacks, `id` first.
    pub fn missing_required_fields(&self, id: Option<&str>) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if !id.map_or(false, is_valid_id) {
            missing.push("id");
        }

        let present = [
            self.north.is_some(),
            self.south.is_some(),
            self.east.is_some(),
            self.west.is_some(),
            self.orbit_number.is_some(),
            self.completion_date.is_some(),
            self.start_date.is_some(),
        ];
        missing.extend(
            REQUIRED_FIELDS
                .iter()
                .zip(present.iter())
                .filter(|(_, present)| !**present)
                .map(|(name, _)| *name),
        );

        missing
    }
}

/// A record is complete if the id is valid and every required field is present.
pub fn check_metadata(record: &MetadataRecord, id: Option<&str>) -> bool {
    record.missing_required_fields(id).is_empty()
}

/// An id is a UUID, optionally prefixed with the `no.met.nbs:` namespace.
pub fn is_valid_id(id: &str) -> bool {
    let uuid = id.strip_prefix(ID_NAMESPACE).unwrap_or(id);

    Uuid::parse_str(uuid).is_ok()
}

/// Polarisation channels use `+` between channels, e.g. `VV+VH`.
pub fn normalise_polarisation(value: &str) -> String {
    value
        .split(|c| c == '&' || c == '+' || c == ' ')
        .filter(|channel| !channel.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}
