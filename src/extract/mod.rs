mod archive_reader;
mod local;
mod netcdf;
mod safe;
mod sen3;
mod snapshot;

use std::path::Path;

use crate::mission::basename;

pub use self::archive_reader::ArchiveReader;
pub use self::local::{ArchiveSource, SnapshotSource};

#[cfg(test)]
pub(crate) use self::safe::tests::{S1_MANIFEST, S1_NAME};

/// The product name of a path, without directories or extensions.
fn product_basename(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    basename(&filename).to_string()
}
