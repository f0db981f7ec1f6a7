//! Error types for FCA encoding and decoding

use thiserror::Error;

/// FCA operation result type
pub type Result<T> = std::result::Result<T, FcaError>;

/// Coarse error taxonomy, without the per-variant context
///
/// Collaborators that only care about *what* went wrong (to pick a message or
/// an exit code) can match on this instead of destructuring [`FcaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadMagic,
    Truncated,
    InvalidSize,
    SizeOverflow,
    UnsupportedVersion,
    RecordTooLarge,
    Io,
    Config,
}

/// FCA codec errors
#[derive(Error, Debug)]
pub enum FcaError {
    /// The stream does not start with `"FCA"`
    #[error("Invalid magic bytes: {found:02X?} (expected \"FCA\")")]
    BadMagic { found: [u8; 3] },

    /// A declared size runs past the end of the available bytes
    #[error("Truncated input while reading {context}: needed {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        needed: u64,
        available: u64,
    },

    /// Size fields disagree with each other
    #[error("Invalid record size: total_size {total_size} cannot hold header_size {header_size}")]
    InvalidSize { total_size: u64, header_size: u64 },

    /// A decoded record would end past the end of the buffer
    #[error("Record at offset {offset} spans {consumed} bytes but only {available} remain")]
    Overrun {
        offset: u64,
        consumed: u64,
        available: u64,
    },

    /// A version 1 record header is not the standard 2 bytes
    #[error("Version 1 record header must be 2 bytes, found {found}")]
    V1HeaderLength { found: usize },

    /// A record is too large for the on-wire size fields
    #[error("Record does not fit size fields: header {header_len} bytes, payload {payload_len} bytes")]
    SizeOverflow { header_len: usize, payload_len: usize },

    /// Semantic header decoding was requested for a version that has none
    #[error("Unsupported format version {found} (semantic headers require version 1)")]
    UnsupportedVersion { found: u8 },

    /// A record exceeds the configured decode ceiling
    #[error("Record of {total_size} bytes exceeds configured limit of {limit} bytes")]
    RecordTooLarge { total_size: u32, limit: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl FcaError {
    pub(crate) fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        FcaError::Truncated {
            context,
            needed: needed as u64,
            available: available as u64,
        }
    }

    /// The taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            FcaError::BadMagic { .. } => ErrorKind::BadMagic,
            FcaError::Truncated { .. } => ErrorKind::Truncated,
            FcaError::InvalidSize { .. }
            | FcaError::Overrun { .. }
            | FcaError::V1HeaderLength { .. } => ErrorKind::InvalidSize,
            FcaError::SizeOverflow { .. } => ErrorKind::SizeOverflow,
            FcaError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            FcaError::RecordTooLarge { .. } => ErrorKind::RecordTooLarge,
            FcaError::Io(_) => ErrorKind::Io,
            FcaError::Config(_) => ErrorKind::Config,
        }
    }
}
