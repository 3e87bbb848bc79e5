//! The fallback chain that turns a product filename into one complete record.
//!
//! Sources are grouped into stages that run strictly in order: local extraction,
//! the OData catalogue, then OpenSearch. The first candidate that passes the
//! completeness check wins as it is; records of different sources are never merged.

use std::path::Path;

use failure::Error;
use failure::Fail;
use log::{info, warn};

use crate::metadata::{MetadataRecord, REQUIRED_FIELDS};
use crate::mission::{self, Mission, UnknownMissionError};

/// The product a run is about, identified by its file name.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    filename: String,
    mission: Mission,
}

impl Product {
    /// Accepts a bare file name or a path; only the last component is kept.
    pub fn new(filename: &str) -> Result<Self, UnknownMissionError> {
        let filename = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(filename);

        Ok(Self {
            filename: filename.to_string(),
            mission: Mission::from_filename(filename)?,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn basename(&self) -> &str {
        mission::basename(&self.filename)
    }

    pub fn mission(&self) -> Mission {
        self.mission
    }
}

/// Where a candidate record came from.
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    Local,
    OData { product_id: String },
    OpenSearch,
}

/// A record produced by one source, with the id that source knows the product by.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: Option<String>,
    pub record: MetadataRecord,
    pub origin: Origin,
}

/// Anything that can describe a product.
///
/// `Ok(None)` means the source has nothing for the product; errors are reported
/// and the reconciler moves on.
pub trait MetadataSource {
    fn describe(&self) -> String;

    fn fetch(&self, product: &Product) -> Result<Option<Candidate>, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    TryLocalExtraction,
    TryODataQuery,
    TryOpenSearchQuery,
    Complete,
    Failed,
}

impl Stage {
    /// The stage to escalate to when this one yields no complete record.
    pub fn next(self) -> Self {
        match self {
            Stage::TryLocalExtraction => Stage::TryODataQuery,
            Stage::TryODataQuery => Stage::TryOpenSearchQuery,
            Stage::TryOpenSearchQuery => Stage::Failed,
            Stage::Complete => Stage::Complete,
            Stage::Failed => Stage::Failed,
        }
    }
}

/// The winning candidate and its validated id.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub id: String,
    pub candidate: Candidate,
}

#[derive(Default)]
pub struct Reconciler {
    local: Vec<Box<dyn MetadataSource>>,
    odata: Vec<Box<dyn MetadataSource>>,
    opensearch: Vec<Box<dyn MetadataSource>>,
    mapped_id: Option<String>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.local.push(source);
        self
    }

    pub fn with_odata(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.odata.push(source);
        self
    }

    pub fn with_opensearch(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.opensearch.push(source);
        self
    }

    /// An id from the archive's id mapping takes precedence over every source's own id.
    pub fn with_mapped_id(mut self, id: Option<String>) -> Self {
        self.mapped_id = id;
        self
    }

    fn sources(&self, stage: Stage) -> &[Box<dyn MetadataSource>] {
        match stage {
            Stage::TryLocalExtraction => &self.local,
            Stage::TryODataQuery => &self.odata,
            Stage::TryOpenSearchQuery => &self.opensearch,
            Stage::Complete | Stage::Failed => &[],
        }
    }

    pub fn reconcile(&self, product: &Product) -> Result<Resolved, Error> {
        let mut stage = Stage::TryLocalExtraction;
        let mut closest: Option<Vec<&'static str>> = None;
        let mut resolved = None;

        while !matches!(stage, Stage::Complete | Stage::Failed) {
            info!("{:?} for {}", stage, product.filename());

            resolved = self.try_stage(stage, product, &mut closest);
            stage = if resolved.is_some() {
                Stage::Complete
            } else {
                stage.next()
            };
        }

        match resolved {
            Some(resolved) => Ok(resolved),
            None => {
                let missing = closest.unwrap_or_else(|| {
                    let mut all = vec!["id"];
                    all.extend_from_slice(&REQUIRED_FIELDS);
                    all
                });
                Err(IncompleteMetadataError::new(product.filename(), &missing).into())
            }
        }
    }

    fn try_stage(
        &self,
        stage: Stage,
        product: &Product,
        closest: &mut Option<Vec<&'static str>>,
    ) -> Option<Resolved> {
        for source in self.sources(stage) {
            let candidate = match source.fetch(product) {
                Ok(Some(candidate)) => candidate,
                Ok(None) => {
                    info!("{} has no metadata for {}", source.describe(), product.filename());
                    continue;
                }
                Err(e) => {
                    warn!("Unable to read metadata from {}: {}", source.describe(), e);
                    continue;
                }
            };

            let id = self.mapped_id.clone().or_else(|| candidate.id.clone());
            let missing = candidate.record.missing_required_fields(id.as_deref());

            match id {
                Some(id) if missing.is_empty() => {
                    info!("Complete metadata from {}", source.describe());
                    return Some(Resolved { id, candidate });
                }
                _ => {
                    warn!(
                        "Metadata from {} is missing: {}",
                        source.describe(),
                        missing.join(", ")
                    );
                    if closest.as_ref().map_or(true, |best| missing.len() < best.len()) {
                        *closest = Some(missing);
                    }
                }
            }
        }

        None
    }
}

/// This error occurs when no source yields a complete record for a product.
#[derive(Debug, Fail)]
#[fail(display = "Incomplete metadata for `{}`; missing: {}.", product, missing)]
pub struct IncompleteMetadataError {
    product: String,
    missing: String,
}

impl IncompleteMetadataError {
    pub fn new(product: &str, missing: &[&str]) -> Self {
        Self {
            product: product.to_string(),
            missing: missing.join(", "),
        }
    }
}
