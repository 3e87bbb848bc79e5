use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use failure::Error;
use serde::Deserialize;

/// Attributes shared by every MMD document of the archive.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GlobalAttributes {
    pub metadata_status: String,
    pub dataset_production_status: String,
    pub dataset_language: String,
    pub processing_level: String,
    pub access_constraint: String,
    pub creator_role: String,
    pub creator_name: String,
    pub creator_email: String,
    pub creator_institution: String,
    pub creator_url: String,
    pub contributor_role: String,
    pub contributor_name: String,
    pub contributor_email: String,
    pub contributor_institution: String,
    pub project: String,
    pub project_short_name: String,
    pub spatial_representation: String,
    pub source: String,
    pub license_text: String,
}

impl GlobalAttributes {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_yaml::from_reader(reader)?)
    }
}
