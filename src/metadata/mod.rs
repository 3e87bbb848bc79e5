mod id_mapping;
mod record;
mod scalar;

pub use self::id_mapping::lookup_id;
pub use self::record::{
    check_metadata, normalise_polarisation, MetadataRecord, OrbitDirection, Size,
    REQUIRED_FIELDS,
};
pub use self::scalar::Scalar;
