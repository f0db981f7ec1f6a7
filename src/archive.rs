//! Materialized archives
//!
//! An [`Archive`] is the owned form of a whole FCA stream: one version and the
//! records in stream order. It is what `read_archive` returns and what the
//! file layer writes.

use crate::config::CodecConfig;
use crate::error::{FcaError, Result};
use crate::header::{RecordHeader, V1Header, V1_HEADER_SIZE, VERSION_1};
use crate::reader::ArchiveReader;
use crate::record::Record;
use crate::writer::write_archive;
use serde::{Deserialize, Serialize};

/// An archive's version plus its records in stream order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Archive {
    version: u8,
    records: Vec<Record>,
}

/// Listing view of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Position in the stream, starting at 0
    pub index: usize,
    pub payload_len: usize,
    pub header: RecordHeader,
}

impl Archive {
    pub fn new(version: u8) -> Self {
        Archive {
            version,
            records: Vec::new(),
        }
    }

    pub fn from_records(version: u8, records: Vec<Record>) -> Self {
        Archive { version, records }
    }

    /// Decode a complete buffer
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_config(bytes, &CodecConfig::default())
    }

    pub fn decode_with_config(bytes: &[u8], config: &CodecConfig) -> Result<Self> {
        let reader = ArchiveReader::with_config(bytes, config)?;
        let version = reader.version();
        let records = reader.read_all()?;
        Ok(Archive { version, records })
    }

    /// Encode to a contiguous FCA stream
    pub fn encode(&self) -> Result<Vec<u8>> {
        write_archive(self.version, &self.records)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Append a payload under a version-1 header
    ///
    /// Fails with `UnsupportedVersion` on archives of any other version.
    pub fn push_v1(&mut self, file_type: u8, purpose: u8, payload: Vec<u8>) -> Result<()> {
        self.require_v1()?;
        self.records.push(Record::new(
            V1Header::new(file_type, purpose).to_bytes().to_vec(),
            payload,
        ));
        Ok(())
    }

    pub fn into_parts(self) -> (u8, Vec<Record>) {
        (self.version, self.records)
    }

    /// Semantic version-1 headers for every record, in order
    ///
    /// A header shorter than 2 bytes is `Truncated`; a longer one is rejected
    /// with `V1HeaderLength`, matching the `Raw` entries [`Archive::entries`]
    /// reports for it.
    pub fn v1_headers(&self) -> Result<Vec<V1Header>> {
        self.require_v1()?;
        self.records
            .iter()
            .map(|record| {
                if record.header.len() > V1_HEADER_SIZE {
                    return Err(FcaError::V1HeaderLength {
                        found: record.header.len(),
                    });
                }
                V1Header::from_bytes(&record.header)
            })
            .collect()
    }

    /// Per-record listing with version-dispatched headers
    pub fn entries(&self) -> Vec<EntryInfo> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| EntryInfo {
                index,
                payload_len: record.payload.len(),
                header: RecordHeader::parse(self.version, &record.header),
            })
            .collect()
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

impl IntoIterator for Archive {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Decode a complete FCA buffer into its version and records
///
/// All or nothing: a malformed stream yields an error and no records.
pub fn read_archive(bytes: &[u8]) -> Result<Archive> {
    Archive::decode(bytes)
}
