//! Global and per-record header codecs
//!
//! An FCA stream opens with a fixed 4-byte global header:
//!
//! ```text
//! Byte 0-2: "FCA" magic (ASCII)
//! Byte 3:   format version (0-255)
//! ```
//!
//! The version selects how each record's header bytes are interpreted. Only
//! version 1 defines semantic fields (`file_type`, `purpose`); every other
//! version exposes the header as raw bytes so older readers can still walk
//! record boundaries in archives written by newer producers.

use crate::error::{FcaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const MAGIC: [u8; 3] = *b"FCA";
pub const GLOBAL_HEADER_SIZE: usize = 4;

/// The only version with a defined semantic record header
pub const VERSION_1: u8 = 1;
pub const V1_HEADER_SIZE: usize = 2;

/// Decoded global header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalHeader {
    pub version: u8,
}

impl GlobalHeader {
    pub fn new(version: u8) -> Self {
        GlobalHeader { version }
    }

    /// Serialize to the 4-byte on-wire form
    pub fn to_bytes(&self) -> [u8; GLOBAL_HEADER_SIZE] {
        [MAGIC[0], MAGIC[1], MAGIC[2], self.version]
    }

    /// Parse the global header from the start of `bytes`
    ///
    /// The magic is checked as soon as three bytes are available, so a foreign
    /// file is reported as `BadMagic` even when it is shorter than a header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() >= MAGIC.len() && bytes[..MAGIC.len()] != MAGIC {
            return Err(FcaError::BadMagic {
                found: [bytes[0], bytes[1], bytes[2]],
            });
        }

        if bytes.len() < GLOBAL_HEADER_SIZE {
            return Err(FcaError::truncated(
                "global header",
                GLOBAL_HEADER_SIZE,
                bytes.len(),
            ));
        }

        Ok(GlobalHeader { version: bytes[3] })
    }
}

/// Encode the global header for `version`
pub fn encode_global_header(version: u8) -> [u8; GLOBAL_HEADER_SIZE] {
    GlobalHeader::new(version).to_bytes()
}

/// Decode the global header, returning the version and the bytes consumed
pub fn decode_global_header(bytes: &[u8]) -> Result<(u8, usize)> {
    let header = GlobalHeader::from_bytes(bytes)?;
    Ok((header.version, GLOBAL_HEADER_SIZE))
}

/// Version-1 record header
///
/// Both fields are opaque to the codec: all 256 values are accepted on decode.
/// Producers write `(0, 0)` unless told otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct V1Header {
    pub file_type: u8,
    pub purpose: u8,
}

impl V1Header {
    pub fn new(file_type: u8, purpose: u8) -> Self {
        V1Header { file_type, purpose }
    }

    pub fn to_bytes(&self) -> [u8; V1_HEADER_SIZE] {
        [self.file_type, self.purpose]
    }

    /// Parse from the first two header bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < V1_HEADER_SIZE {
            return Err(FcaError::truncated(
                "version 1 record header",
                V1_HEADER_SIZE,
                bytes.len(),
            ));
        }

        let header = V1Header {
            file_type: bytes[0],
            purpose: bytes[1],
        };

        if header.purpose != 0 {
            warn!(
                purpose = header.purpose,
                "Non-zero purpose byte in version 1 header, passing through"
            );
        }

        Ok(header)
    }

    /// Registered file type, if `file_type` is in the known table
    pub fn known_file_type(&self) -> Option<FileType> {
        FileType::from_u8(self.file_type)
    }
}

/// Encode a version-1 record header
pub fn encode_v1_header(file_type: u8, purpose: u8) -> [u8; V1_HEADER_SIZE] {
    V1Header::new(file_type, purpose).to_bytes()
}

/// Decode a version-1 record header into `(file_type, purpose)`
pub fn decode_v1_header(bytes: &[u8]) -> Result<(u8, u8)> {
    let header = V1Header::from_bytes(bytes)?;
    Ok((header.file_type, header.purpose))
}

/// Version-dispatched view of a record's header bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordHeader {
    /// Version 1 with the standard 2-byte layout
    V1(V1Header),
    /// Any other version, or a version 1 header of non-standard length
    Raw(Vec<u8>),
}

impl RecordHeader {
    /// Interpret `bytes` under the archive's `version`
    pub fn parse(version: u8, bytes: &[u8]) -> Self {
        match bytes {
            [file_type, purpose] if version == VERSION_1 => {
                RecordHeader::V1(V1Header::new(*file_type, *purpose))
            }
            _ => RecordHeader::Raw(bytes.to_vec()),
        }
    }

    pub fn as_v1(&self) -> Option<&V1Header> {
        match self {
            RecordHeader::V1(header) => Some(header),
            RecordHeader::Raw(_) => None,
        }
    }

    /// Serialize back to raw header bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            RecordHeader::V1(header) => header.to_bytes().to_vec(),
            RecordHeader::Raw(bytes) => bytes.clone(),
        }
    }
}

/// Known version-1 `file_type` values
///
/// Values outside this table are reserved but still legal on the wire.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Unknown = 0,
    AmiiboV2 = 1,
    AmiiboV3 = 2,
    Skylander = 3,
    DisneyInfinity = 4,
    LegoDimensions = 5,
}

impl FileType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FileType::Unknown),
            1 => Some(FileType::AmiiboV2),
            2 => Some(FileType::AmiiboV3),
            3 => Some(FileType::Skylander),
            4 => Some(FileType::DisneyInfinity),
            5 => Some(FileType::LegoDimensions),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            FileType::Unknown => "Unknown",
            FileType::AmiiboV2 => "amiibo v2",
            FileType::AmiiboV3 => "amiibo v3",
            FileType::Skylander => "Skylander",
            FileType::DisneyInfinity => "Disney Infinity",
            FileType::LegoDimensions => "Lego Dimensions",
        }
    }

    /// Display name for any raw `file_type` byte, e.g. `"Reserved (9)"`
    pub fn describe(value: u8) -> String {
        match FileType::from_u8(value) {
            Some(file_type) => file_type.name().to_string(),
            None => format!("Reserved ({})", value),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_header_bytes() {
        assert_eq!(encode_global_header(1), *b"FCA\x01");
        assert_eq!(encode_global_header(0xFF), [0x46, 0x43, 0x41, 0xFF]);
    }

    #[test]
    fn test_decode_global_header() {
        let (version, consumed) = decode_global_header(b"FCA\x07trailing").unwrap();
        assert_eq!(version, 7);
        assert_eq!(consumed, GLOBAL_HEADER_SIZE);
    }

    #[test]
    fn test_bad_magic() {
        for i in 0..3 {
            let mut bytes = encode_global_header(1);
            bytes[i] ^= 0xFF;
            assert!(matches!(
                decode_global_header(&bytes),
                Err(FcaError::BadMagic { .. })
            ));
        }
    }

    #[test]
    fn test_bad_magic_reported_on_short_input() {
        // Three wrong bytes and no version byte: magic wins over truncation
        assert!(matches!(
            decode_global_header(b"PK\x03"),
            Err(FcaError::BadMagic { found }) if found == *b"PK\x03"
        ));
    }

    #[test]
    fn test_truncated_global_header() {
        for len in 0..GLOBAL_HEADER_SIZE {
            let bytes = &b"FCA\x01"[..len];
            assert!(matches!(
                decode_global_header(bytes),
                Err(FcaError::Truncated { needed: 4, .. })
            ));
        }
    }

    #[test]
    fn test_v1_header_codec() {
        assert_eq!(encode_v1_header(0, 0), [0, 0]);
        assert_eq!(encode_v1_header(3, 9), [3, 9]);
        assert_eq!(decode_v1_header(&[5, 0]).unwrap(), (5, 0));
    }

    #[test]
    fn test_v1_header_accepts_all_values() {
        assert_eq!(decode_v1_header(&[0xFF, 0xFF]).unwrap(), (0xFF, 0xFF));
        assert_eq!(decode_v1_header(&[0x80, 0x01]).unwrap(), (0x80, 0x01));
    }

    #[test]
    fn test_v1_header_truncated() {
        assert!(matches!(
            decode_v1_header(&[]),
            Err(FcaError::Truncated { needed: 2, available: 0, .. })
        ));
        assert!(matches!(
            decode_v1_header(&[1]),
            Err(FcaError::Truncated { needed: 2, available: 1, .. })
        ));
    }

    #[test]
    fn test_record_header_dispatch() {
        assert_eq!(
            RecordHeader::parse(1, &[4, 0]),
            RecordHeader::V1(V1Header::new(4, 0))
        );
        // Other versions are opaque
        assert_eq!(
            RecordHeader::parse(2, &[4, 0]),
            RecordHeader::Raw(vec![4, 0])
        );
        // Version 1 with a non-standard header length stays raw
        assert_eq!(
            RecordHeader::parse(1, &[4, 0, 1]),
            RecordHeader::Raw(vec![4, 0, 1])
        );
        assert_eq!(RecordHeader::parse(1, &[]), RecordHeader::Raw(vec![]));
    }

    #[test]
    fn test_record_header_to_bytes() {
        assert_eq!(RecordHeader::V1(V1Header::new(2, 1)).to_bytes(), vec![2, 1]);
        assert_eq!(RecordHeader::Raw(vec![9, 8, 7]).to_bytes(), vec![9, 8, 7]);
    }

    #[test]
    fn test_file_type_from_u8() {
        assert_eq!(FileType::from_u8(0), Some(FileType::Unknown));
        assert_eq!(FileType::from_u8(1), Some(FileType::AmiiboV2));
        assert_eq!(FileType::from_u8(5), Some(FileType::LegoDimensions));
        assert_eq!(FileType::from_u8(6), None);
        assert_eq!(FileType::from_u8(255), None);
    }

    #[test]
    fn test_file_type_names() {
        assert_eq!(FileType::Skylander.to_string(), "Skylander");
        assert_eq!(FileType::describe(4), "Disney Infinity");
        assert_eq!(FileType::describe(42), "Reserved (42)");
        assert_eq!(
            V1Header::new(2, 0).known_file_type(),
            Some(FileType::AmiiboV3)
        );
    }
}
