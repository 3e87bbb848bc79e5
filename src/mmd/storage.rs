use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use failure::Error;
use failure::Fail;
use log::warn;
use md5::{Digest, Md5};

use crate::extract::ArchiveReader;

/// Reported instead of a checksum when the file cannot be read.
pub const CHECKSUM_UNAVAILABLE: &str = "File not found";

const CHUNK_SIZE: usize = 4096;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// The MD5 digest of a file as lowercase hex, read in 4 KiB chunks.
pub fn checksum(path: &Path) -> String {
    match md5_digest(path) {
        Ok(digest) => digest,
        Err(e) => {
            warn!("Unable to compute checksum of {}: {}", path.display(), e);
            CHECKSUM_UNAVAILABLE.to_string()
        }
    }
}

fn md5_digest(path: &Path) -> Result<String, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Md5::new();
    let mut chunk = [0; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }

    Ok(hash_as_hex(&hasher.finalize()))
}

fn hash_as_hex(hash: &[u8]) -> String {
    let mut out = String::with_capacity(hash.len() * 2);

    for byte in hash {
        write!(&mut out, "{:02x}", byte).expect("cannot fail");
    }

    out
}

/// The size of a file in MB; for a ZIP archive, the sum of its uncompressed members.
pub fn size_mb(path: &Path) -> Result<f64, Error> {
    if !path.exists() {
        return Err(PathNotFoundError::new(path).into());
    }
    if !path.is_file() {
        return Err(NotAFileError::new(path).into());
    }

    let bytes = match ArchiveReader::from_path(path) {
        Ok(mut archive) => archive.uncompressed_size()?,
        Err(_) => path.metadata()?.len(),
    };

    Ok(bytes as f64 / BYTES_PER_MB)
}

/// This error occurs when a size is requested for a path that does not exist.
#[derive(Debug, Fail)]
#[fail(display = "The path `{}` does not exist.", path)]
pub struct PathNotFoundError {
    path: String,
}

impl PathNotFoundError {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
        }
    }
}

/// This error occurs when a size is requested for a directory or other non-file.
#[derive(Debug, Fail)]
#[fail(display = "`{}` is not a file.", path)]
pub struct NotAFileError {
    path: String,
}

impl NotAFileError {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
        }
    }
}
