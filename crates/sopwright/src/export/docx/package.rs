//! Reading and writing the zip container of a `.docx` package.

use std::io::{Cursor, Read, Write};

use log::trace;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use super::super::Error;

/// A named part of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Part {
    pub(super) name: String,
    pub(super) data: Vec<u8>,
}

/// Reads every file entry of a package, in archive order.
pub(super) fn read(bytes: &[u8]) -> Result<Vec<Part>, Error> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut parts = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        trace!(part = file.name(), size = data.len(); "Package part read");
        parts.push(Part {
            name: file.name().to_string(),
            data,
        });
    }
    Ok(parts)
}

/// Writes `parts` into a new package.
///
/// Entries carry a fixed timestamp so identical parts give identical bytes.
pub(super) fn write<'p>(parts: impl IntoIterator<Item = (&'p str, &'p [u8])>) -> Result<Vec<u8>, Error> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        writer.start_file(name, options)?;
        writer.write_all(data)?;
    }
    Ok(writer.finish()?.into_inner())
}
