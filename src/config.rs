//! Codec configuration
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! version = 1
//! max_record_size = 16777216
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::error::Result;
use crate::header::VERSION_1;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Format version written by [`ArchiveWriter::from_config`](crate::ArchiveWriter::from_config)
    pub version: u8,

    /// Largest `total_size` accepted on decode
    ///
    /// Records declaring more are rejected with `RecordTooLarge` before any of
    /// their bytes are read.
    pub max_record_size: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            version: VERSION_1,
            max_record_size: u32::MAX,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn with_max_record_size(mut self, max_record_size: u32) -> Self {
        self.max_record_size = max_record_size;
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: CodecConfig = toml::from_str(source)?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        debug!(
            path = %path.as_ref().display(),
            version = config.version,
            max_record_size = config.max_record_size,
            "Loaded codec config"
        );
        Ok(config)
    }
}
