//! Archive writer
//!
//! [`ArchiveWriter`] streams records to any `Write` sink. The global header is
//! written immediately on construction, records follow in call order with no
//! separators and no trailing padding.

use crate::config::CodecConfig;
use crate::error::{FcaError, Result};
use crate::header::{encode_global_header, V1Header, GLOBAL_HEADER_SIZE, VERSION_1};
use crate::record::{self, encode_record_into, Record};
use std::io::Write;
use tracing::debug;

/// Writes an FCA archive to a byte sink
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production code can
/// use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use fca::{ArchiveWriter, read_archive};
///
/// let mut buf = Vec::new();
/// let mut writer = ArchiveWriter::new(&mut buf, 1).unwrap();
/// writer.write_v1_default(b"first").unwrap();
/// writer.write_v1(3, 0, b"second").unwrap();
/// assert_eq!(writer.records_written(), 2);
/// drop(writer);
///
/// let archive = read_archive(&buf).unwrap();
/// assert_eq!(archive.version(), 1);
/// assert_eq!(archive.len(), 2);
/// ```
pub struct ArchiveWriter<W: Write> {
    writer: W,
    version: u8,
    records_written: u64,
    bytes_written: u64,
}

impl<W: Write> ArchiveWriter<W> {
    /// Create a writer, immediately emitting the global header
    pub fn new(mut writer: W, version: u8) -> Result<Self> {
        writer.write_all(&encode_global_header(version))?;
        debug!(version, "Started FCA archive");

        Ok(ArchiveWriter {
            writer,
            version,
            records_written: 0,
            bytes_written: GLOBAL_HEADER_SIZE as u64,
        })
    }

    /// Create a writer using the configured version
    pub fn from_config(writer: W, config: &CodecConfig) -> Result<Self> {
        Self::new(writer, config.version)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Append a record with raw header bytes
    pub fn write_record(&mut self, header: &[u8], payload: &[u8]) -> Result<()> {
        self.bytes_written += record::write_record(&mut self.writer, header, payload)?;
        self.records_written += 1;
        Ok(())
    }

    /// Append a version-1 record with explicit header fields
    pub fn write_v1(&mut self, file_type: u8, purpose: u8, payload: &[u8]) -> Result<()> {
        self.require_v1()?;
        self.write_record(&V1Header::new(file_type, purpose).to_bytes(), payload)
    }

    /// Append a version-1 record with the default `(0, 0)` header
    pub fn write_v1_default(&mut self, payload: &[u8]) -> Result<()> {
        self.write_v1(0, 0, payload)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Total bytes emitted, global header included
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and return the underlying sink
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        debug!(
            version = self.version,
            records = self.records_written,
            bytes = self.bytes_written,
            "Finished FCA archive"
        );
        Ok(self.writer)
    }

    fn require_v1(&self) -> Result<()> {
        if self.version != VERSION_1 {
            return Err(FcaError::UnsupportedVersion {
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Serialize `records` under `version` into one contiguous buffer
///
/// Sizes are validated before the buffer is allocated, so an oversized record
/// fails without writing anything.
pub fn write_archive(version: u8, records: &[Record]) -> Result<Vec<u8>> {
    let mut len = GLOBAL_HEADER_SIZE;
    for record in records {
        len = len.saturating_add(record.encoded_len()?);
    }

    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(&encode_global_header(version));
    for record in records {
        encode_record_into(&mut out, &record.header, &record.payload)?;
    }

    debug!(version, records = records.len(), bytes = out.len(), "Encoded FCA archive");
    Ok(out)
}

/// Serialize version-1 payloads, each with the default `(0, 0)` header
pub fn write_v1_archive<P: AsRef<[u8]>>(payloads: &[P]) -> Result<Vec<u8>> {
    let header = V1Header::default().to_bytes();
    let records: Vec<Record> = payloads
        .iter()
        .map(|payload| Record::new(header.to_vec(), payload.as_ref().to_vec()))
        .collect();
    write_archive(VERSION_1, &records)
}
