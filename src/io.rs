//! File-backed archive helpers
//!
//! Thin glue between the filesystem and the in-memory codec. Archives are
//! read through a read-only memory map and decoded in one pass; the map and
//! file handle are dropped on every exit path, including decode failure.

use crate::archive::Archive;
use crate::config::CodecConfig;
use crate::error::Result;
use crate::writer::ArchiveWriter;
use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How extracted payloads are named on disk
///
/// Names are never stored in an archive, so extraction has to pick them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// `record-0000`, `record-0001`, ... in stream order
    #[default]
    Index,
    /// Lowercase hex SHA-256 of the payload
    ///
    /// Identical payloads map to the same file.
    ContentDigest,
}

impl NamingPolicy {
    pub fn file_name(&self, index: usize, payload: &[u8]) -> String {
        match self {
            NamingPolicy::Index => format!("record-{:04}", index),
            NamingPolicy::ContentDigest => content_digest(payload),
        }
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Read and decode an archive file
pub fn read_archive_file<P: AsRef<Path>>(path: P) -> Result<Archive> {
    read_archive_file_with_config(path, &CodecConfig::default())
}

pub fn read_archive_file_with_config<P: AsRef<Path>>(
    path: P,
    config: &CodecConfig,
) -> Result<Archive> {
    let path = path.as_ref();
    let file = File::open(path)?;

    // Zero-length files cannot be mapped on every platform
    if file.metadata()?.len() == 0 {
        return Archive::decode_with_config(&[], config);
    }

    // SAFETY: the map is read-only and dropped before this function returns.
    // Concurrent truncation by another process is outside our control, as
    // with any mmap.
    let mmap = unsafe { Mmap::map(&file)? };
    let archive = Archive::decode_with_config(&mmap, config)?;

    debug!(
        path = %path.display(),
        version = archive.version(),
        records = archive.len(),
        "Read archive file"
    );
    Ok(archive)
}

/// Encode `archive` to `path`, creating parent directories as needed
pub fn write_archive_file<P: AsRef<Path>>(path: P, archive: &Archive) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let mut writer = ArchiveWriter::new(BufWriter::new(file), archive.version())?;
    for record in archive.records() {
        writer.write_record(&record.header, &record.payload)?;
    }
    writer.finish()?;

    info!(
        path = %path.display(),
        records = archive.len(),
        "Created FCA archive"
    );
    Ok(())
}

/// Write each payload of `archive` as a file under `dir`
///
/// Returns the written paths in record order.
pub fn extract_to_dir<P: AsRef<Path>>(
    archive: &Archive,
    dir: P,
    naming: NamingPolicy,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(archive.len());
    for (index, record) in archive.records().iter().enumerate() {
        let path = dir.join(naming.file_name(index, &record.payload));
        fs::write(&path, &record.payload)?;
        debug!(
            index,
            path = %path.display(),
            bytes = record.payload.len(),
            "Extracted record"
        );
        written.push(path);
    }

    info!(
        dir = %dir.display(),
        records = written.len(),
        "Extracted archive"
    );
    Ok(written)
}
