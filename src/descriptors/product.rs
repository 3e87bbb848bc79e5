use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use failure::Error;
use failure::Fail;

/// The column the product table is keyed by.
pub const ALIAS_COLUMN: &str = "Alias (ESA product type)";

/// A controlled vocabulary keywords may be tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vocabulary {
    Gcmdsk,
    Gemet,
}

impl Vocabulary {
    pub fn name(self) -> &'static str {
        match self {
            Vocabulary::Gcmdsk => "GCMDSK",
            Vocabulary::Gemet => "GEMET",
        }
    }

    pub fn resource(self) -> &'static str {
        match self {
            Vocabulary::Gcmdsk => {
                "https://gcmd.earthdata.nasa.gov/kms/concepts/concept_scheme/sciencekeywords"
            }
            Vocabulary::Gemet => "https://inspire.ec.europa.eu/theme",
        }
    }

    /// The hierarchy separator of the vocabulary, if it has one.
    pub fn separator(self) -> Option<&'static str> {
        match self {
            Vocabulary::Gcmdsk => Some(">"),
            Vocabulary::Gemet => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instrument {
    pub short_name: String,
    pub long_name: String,
    pub resource: String,
}

/// The static description of one ESA product type.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDescriptor {
    alias: String,
    fields: HashMap<String, String>,
}

impl ProductDescriptor {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn field(&self, name: &str) -> Result<&str, MissingDescriptorFieldError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| MissingDescriptorFieldError::new(&self.alias, name))
    }

    pub fn description(&self) -> Result<&str, MissingDescriptorFieldError> {
        self.field("description")
    }

    pub fn product_type(&self) -> Result<&str, MissingDescriptorFieldError> {
        self.field("product_type")
    }

    pub fn iso_topic_categories(&self) -> Result<Vec<&str>, MissingDescriptorFieldError> {
        Ok(split_list(self.field("iso_topic_category")?, ','))
    }

    /// The keywords tagged with `vocabulary`, without their tag.
    pub fn keywords(&self, vocabulary: Vocabulary) -> Result<Vec<&str>, MissingDescriptorFieldError> {
        let keywords = self.field("keywords")?;

        Ok(split_list(keywords, ',')
            .into_iter()
            .filter_map(|keyword| {
                keyword
                    .strip_prefix(vocabulary.name())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .map(str::trim)
            })
            .collect())
    }

    /// Fused products list several instruments; the three instrument columns must agree.
    pub fn instruments(&self) -> Result<Vec<Instrument>, Error> {
        let short_names = split_list(self.field("instrument_short_name")?, ',');
        let long_names = split_list(self.field("instrument_long_name")?, ',');
        let resources = split_list(self.field("instrument_vocabulary")?, ',');

        if short_names.len() != long_names.len() || short_names.len() != resources.len() {
            return Err(InstrumentMismatchError::new(
                &self.alias,
                short_names.len(),
                long_names.len(),
                resources.len(),
            )
            .into());
        }

        Ok(short_names
            .into_iter()
            .zip(long_names)
            .zip(resources)
            .map(|((short_name, long_name), resource)| Instrument {
                short_name: short_name.to_string(),
                long_name: long_name.to_string(),
                resource: resource.to_string(),
            })
            .collect())
    }
}

fn split_list(value: &str, separator: char) -> Vec<&str> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// The product metadata table, one row per product type alias.
#[derive(Debug)]
pub struct ProductTable {
    rows: Vec<HashMap<String, String>>,
}

impl ProductTable {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let row: HashMap<String, String> = row?;
            rows.push(row);
        }

        Ok(Self { rows })
    }

    /// Find the row of `alias` by exact match and keep its non-empty values.
    pub fn lookup(&self, alias: &str) -> Result<ProductDescriptor, DescriptorNotFoundError> {
        let row = self
            .rows
            .iter()
            .find(|row| row.get(ALIAS_COLUMN).map(String::as_str) == Some(alias))
            .ok_or_else(|| DescriptorNotFoundError::new(alias))?;

        let fields = row
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        Ok(ProductDescriptor {
            alias: alias.to_string(),
            fields,
        })
    }
}

/// This error occurs when the product table has no row for a product type alias.
#[derive(Debug, Fail)]
#[fail(display = "No product metadata for product type `{}`.", alias)]
pub struct DescriptorNotFoundError {
    alias: String,
}

impl DescriptorNotFoundError {
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
        }
    }
}

/// This error occurs when a product row leaves a needed column empty.
#[derive(Debug, Fail)]
#[fail(display = "Product metadata for `{}` has no value for `{}`.", alias, field)]
pub struct MissingDescriptorFieldError {
    alias: String,
    field: String,
}

impl MissingDescriptorFieldError {
    pub fn new(alias: &str, field: &str) -> Self {
        Self {
            alias: alias.to_string(),
            field: field.to_string(),
        }
    }
}

/// This error occurs when the instrument columns of a product row have different lengths.
#[derive(Debug, Fail)]
#[fail(
    display = "Instrument columns of `{}` disagree: {} short names, {} long names, {} vocabularies.",
    alias, short_names, long_names, resources
)]
pub struct InstrumentMismatchError {
    alias: String,
    short_names: usize,
    long_names: usize,
    resources: usize,
}

impl InstrumentMismatchError {
    pub fn new(alias: &str, short_names: usize, long_names: usize, resources: usize) -> Self {
        Self {
            alias: alias.to_string(),
            short_names,
            long_names,
            resources,
        }
    }
}
