use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use failure::Error;
use failure::Fail;
use serde::Deserialize;

/// Vocabulary and related-information entries of one platform, e.g. `S1A`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PlatformDescriptor {
    pub platform_vocabulary: String,
    pub related_information_type: String,
    pub related_information_description: String,
    pub related_information_resource: String,
}

#[derive(Debug)]
pub struct PlatformTable {
    platforms: HashMap<String, PlatformDescriptor>,
}

impl PlatformTable {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(Self {
            platforms: serde_yaml::from_reader(reader)?,
        })
    }

    pub fn get(&self, platform: &str) -> Result<&PlatformDescriptor, PlatformNotFoundError> {
        self.platforms
            .get(platform)
            .ok_or_else(|| PlatformNotFoundError::new(platform))
    }
}

/// Parent dataset ids by platform code and product type.
#[derive(Debug)]
pub struct ParentIds {
    ids: HashMap<String, HashMap<String, String>>,
}

impl ParentIds {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(Self {
            ids: serde_yaml::from_reader(reader)?,
        })
    }

    pub fn parent_id(&self, platform: &str, product_type: &str) -> Result<&str, ParentIdNotFoundError> {
        self.ids
            .get(platform)
            .and_then(|product_types| product_types.get(product_type))
            .map(String::as_str)
            .ok_or_else(|| ParentIdNotFoundError::new(platform, product_type))
    }
}

/// This error occurs when the platform metadata has no entry for a platform code.
#[derive(Debug, Fail)]
#[fail(display = "No platform metadata for `{}`.", platform)]
pub struct PlatformNotFoundError {
    platform: String,
}

impl PlatformNotFoundError {
    pub fn new(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
        }
    }
}

/// This error occurs when no parent dataset is configured for a platform and product type.
#[derive(Debug, Fail)]
#[fail(display = "No parent id for platform `{}` and product type `{}`.", platform, product_type)]
pub struct ParentIdNotFoundError {
    platform: String,
    product_type: String,
}

impl ParentIdNotFoundError {
    pub fn new(platform: &str, product_type: &str) -> Self {
        Self {
            platform: platform.to_string(),
            product_type: product_type.to_string(),
        }
    }
}
