use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use failure::Error;
use failure::Fail;
use zip::ZipArchive;

/// Read access to the members of a ZIP archive.
///
/// The archive file is closed when the reader is dropped.
pub struct ArchiveReader {
    archive: ZipArchive<BufReader<File>>,
    archive_name: String,
}

impl ArchiveReader {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let archive_name = path.display().to_string();

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let archive = ZipArchive::new(reader)?;

        Ok(Self {
            archive,
            archive_name,
        })
    }

    /// The first member for which `predicate` holds, in archive order.
    pub fn find_member<P>(&mut self, predicate: P) -> Option<String>
    where
        P: Fn(&str) -> bool,
    {
        let archive = &mut self.archive;

        (0..archive.len())
            .filter_map(|index| {
                archive
                    .by_index(index)
                    .ok()
                    .map(|file| file.name().to_string())
            })
            .find(|name| predicate(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archive.file_names().any(|member| member == name)
    }

    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let mut inner_file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(MissingArchiveMemberError::new(&self.archive_name, name).into())
            }
            Err(e) => return Err(e.into()),
        };

        let mut content = Vec::new();
        inner_file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// The sum of the uncompressed sizes of all members, in bytes.
    pub fn uncompressed_size(&mut self) -> Result<u64, Error> {
        let mut total = 0;
        for index in 0..self.archive.len() {
            total += self.archive.by_index(index)?.size();
        }
        Ok(total)
    }
}

/// This error occurs when an expected file is not part of an archive.
#[derive(Debug, Fail)]
#[fail(display = "Archive `{}` has no member `{}`", archive, member)]
pub struct MissingArchiveMemberError {
    archive: String,
    member: String,
}

impl MissingArchiveMemberError {
    pub fn new(archive: &str, member: &str) -> Self {
        Self {
            archive: archive.to_string(),
            member: member.to_string(),
        }
    }
}
