//! # FCA - Flexible Concatenated Archive
//!
//! `fca-rs` encodes and decodes FCA streams: a low-overhead container that
//! packs any number of independent payloads into one byte stream, each with a
//! versioned per-record header.
//!
//! - **Self-delimiting records**: every record starts with its total size, so
//!   readers can skip headers they do not understand
//! - **Payload-agnostic**: no compression, encryption, or content inspection
//! - **Strict decoding**: truncation and inconsistent sizes are reported, never
//!   guessed around
//!
//! ## Format
//!
//! ```text
//! "FCA" | version (u8)
//! [total_size u32 BE][header_size u16 BE][header bytes][payload bytes]  (repeated)
//! ```
//!
//! For version 1 the header is two bytes, `file_type` and `purpose`.
//!
//! ## Quick Start
//!
//! ```rust
//! use fca::{read_archive, write_archive, Record, Result};
//!
//! # fn main() -> Result<()> {
//! let records = vec![Record::new(vec![0x00, 0x00], vec![0xAA, 0xBB, 0xCC])];
//! let bytes = write_archive(1, &records)?;
//! assert_eq!(
//!     bytes,
//!     [0x46, 0x43, 0x41, 0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC]
//! );
//!
//! let archive = read_archive(&bytes)?;
//! assert_eq!(archive.version(), 1);
//! assert_eq!(archive.records(), &records[..]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Files
//!
//! ```rust,no_run
//! use fca::{extract_to_dir, read_archive_file, NamingPolicy, Result};
//!
//! # fn main() -> Result<()> {
//! let archive = read_archive_file("figures.fca")?;
//! for entry in archive.entries() {
//!     println!("#{} {} bytes {:?}", entry.index, entry.payload_len, entry.header);
//! }
//! extract_to_dir(&archive, "out", NamingPolicy::ContentDigest)?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod header;
pub mod io;
pub mod reader;
pub mod record;
pub mod writer;

pub use crate::archive::{read_archive, Archive, EntryInfo};
pub use crate::config::CodecConfig;
pub use crate::error::{ErrorKind, FcaError, Result};
pub use crate::header::{
    decode_global_header, decode_v1_header, encode_global_header, encode_v1_header, FileType,
    GlobalHeader, RecordHeader, V1Header, GLOBAL_HEADER_SIZE, MAGIC, VERSION_1,
};
pub use crate::io::{
    content_digest, extract_to_dir, read_archive_file, read_archive_file_with_config,
    write_archive_file, NamingPolicy,
};
pub use crate::reader::{ArchiveReader, Records, StreamReader, StreamRecords};
pub use crate::record::{decode_record, encode_record, Record, RecordRef};
pub use crate::writer::{write_archive, write_v1_archive, ArchiveWriter};
