mod webserver;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use zip::write::FileOptions;
use zip::ZipWriter;

pub use self::webserver::MockWebserver;

pub fn create_temp_file(content: &str) -> TempPath {
    create_temp_file_with_suffix("", content)
}

pub fn create_temp_file_with_suffix(suffix: &str, content: &str) -> TempPath {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Unable to create test file.");

    write!(file, "{}", content).expect("Unable to write content to test file.");

    file.into_temp_path()
}

/// Create a ZIP archive with the given `(member name, content)` entries.
pub fn create_zip_archive(entries: &[(&str, &str)]) -> TempPath {
    let file = tempfile::Builder::new()
        .suffix(".zip")
        .tempfile()
        .expect("Unable to create test archive.");

    write_zip_archive(file.as_file(), entries);

    file.into_temp_path()
}

/// Create a ZIP archive named `name` inside `dir`, for code that derives names from the path.
pub fn create_named_zip_archive(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("Unable to create test archive.");

    write_zip_archive(&file, entries);

    path
}

fn write_zip_archive(file: &File, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(file);

    for (name, content) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("Unable to add file to test archive.");
        writer
            .write_all(content.as_bytes())
            .expect("Unable to write content to test archive.");
    }

    writer.finish().expect("Unable to finish test archive.");
}
