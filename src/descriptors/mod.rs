mod global;
mod platform;
mod product;

use std::path::Path;

use failure::Error;
use log::debug;

pub use self::global::GlobalAttributes;
pub use self::platform::{ParentIds, PlatformTable};
pub use self::product::{ProductDescriptor, ProductTable, Vocabulary};

/// The static configuration the assembler draws on, loaded once per run.
#[derive(Debug)]
pub struct Descriptors {
    pub global: GlobalAttributes,
    pub platforms: PlatformTable,
    pub products: ProductTable,
    pub parent_ids: ParentIds,
}

impl Descriptors {
    pub fn load(
        global_attributes: &Path,
        platform_metadata: &Path,
        product_metadata: &Path,
        parent_ids: &Path,
    ) -> Result<Self, Error> {
        debug!("Loading global attributes from {}", global_attributes.display());
        let global = GlobalAttributes::from_path(global_attributes)?;
        debug!("Loading platform metadata from {}", platform_metadata.display());
        let platforms = PlatformTable::from_path(platform_metadata)?;
        debug!("Loading product metadata from {}", product_metadata.display());
        let products = ProductTable::from_path(product_metadata)?;
        debug!("Loading parent ids from {}", parent_ids.display());
        let parent_ids = ParentIds::from_path(parent_ids)?;

        Ok(Self {
            global,
            platforms,
            products,
            parent_ids,
        })
    }
}
