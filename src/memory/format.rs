//! On-disk container formats for scene descriptions.
//!
//! Two containers are recognised, tried in this order when loading:
//! plain JSON and gzip-compressed JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::core::{ArchiveFormat, ArchiveReader};
use crate::memory::{MemArchive, SceneDesc};
use crate::util::Result;

fn archive_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Plain JSON scene description.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormat;

impl ArchiveFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        let reader = BufReader::new(File::open(path)?);
        let desc: SceneDesc = serde_json::from_reader(reader)?;
        Ok(Box::new(MemArchive::from_desc(archive_name(path), desc)))
    }
}

/// Gzip-compressed JSON scene description.
#[derive(Clone, Copy, Debug, Default)]
pub struct GzipJsonFormat;

impl ArchiveFormat for GzipJsonFormat {
    fn name(&self) -> &'static str {
        "json.gz"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        let decoder = GzDecoder::new(BufReader::new(File::open(path)?));
        let desc: SceneDesc = serde_json::from_reader(decoder)?;
        Ok(Box::new(MemArchive::from_desc(archive_name(path), desc)))
    }
}

/// Formats tried by a session, in order.
pub fn default_formats() -> Vec<Box<dyn ArchiveFormat>> {
    vec![Box::new(JsonFormat), Box::new(GzipJsonFormat)]
}

/// Write a scene description, gzip-compressed when `compress` is set.
pub fn write_scene(path: &Path, desc: &SceneDesc, compress: bool) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    if compress {
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, desc)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        serde_json::to_writer_pretty(&mut file, desc)?;
        file.flush()?;
    }
    Ok(())
}
