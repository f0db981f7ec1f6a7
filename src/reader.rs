//! Archive readers
//!
//! [`ArchiveReader`] walks an in-memory buffer and hands out records that
//! borrow from it. [`StreamReader`] does the same over any `Read` source for
//! archives too large to buffer. Both validate the global header on
//! construction and stop at the first error; neither resynchronizes past
//! corrupt data.

use crate::config::CodecConfig;
use crate::error::{FcaError, Result};
use crate::header::{GlobalHeader, RecordHeader, GLOBAL_HEADER_SIZE};
use crate::record::{decode_record_with_limit, read_record, Record, RecordRef};
use std::io::Read;
use tracing::{debug, trace};

/// Sequential reader over an archive held in memory
///
/// # Examples
///
/// ```
/// use fca::{write_archive, ArchiveReader, Record};
///
/// let bytes = write_archive(1, &[Record::new(vec![0, 0], b"hello".to_vec())]).unwrap();
/// let mut reader = ArchiveReader::new(&bytes).unwrap();
/// assert_eq!(reader.version(), 1);
///
/// let record = reader.next_record().unwrap().unwrap();
/// assert_eq!(record.payload, b"hello");
/// assert!(reader.next_record().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    position: usize,
    version: u8,
    max_record_size: u32,
    records_read: u64,
}

impl<'a> ArchiveReader<'a> {
    /// Open an archive buffer, validating the global header
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_config(data, &CodecConfig::default())
    }

    pub fn with_config(data: &'a [u8], config: &CodecConfig) -> Result<Self> {
        let header = GlobalHeader::from_bytes(data)?;
        debug!(version = header.version, len = data.len(), "Opened FCA archive");

        Ok(ArchiveReader {
            data,
            position: GLOBAL_HEADER_SIZE,
            version: header.version,
            max_record_size: config.max_record_size,
            records_read: 0,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Current byte offset into the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Decode the next record, or `None` once the buffer is exactly consumed
    ///
    /// Between one and three trailing bytes are a dangling partial record and
    /// fail with `Truncated`.
    pub fn next_record(&mut self) -> Result<Option<RecordRef<'a>>> {
        let data: &'a [u8] = self.data;
        if self.position == data.len() {
            return Ok(None);
        }

        let remaining = data.get(self.position..).ok_or(FcaError::Overrun {
            offset: self.position as u64,
            consumed: 0,
            available: 0,
        })?;

        let (record, consumed) = decode_record_with_limit(remaining, self.max_record_size)?;

        let next = self
            .position
            .checked_add(consumed)
            .filter(|&end| end <= data.len())
            .ok_or(FcaError::Overrun {
                offset: self.position as u64,
                consumed: consumed as u64,
                available: remaining.len() as u64,
            })?;

        trace!(
            index = self.records_read,
            offset = self.position,
            consumed,
            "Record boundary"
        );

        self.position = next;
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Decode the next record and interpret its header under the archive version
    pub fn next_entry(&mut self) -> Result<Option<(RecordHeader, RecordRef<'a>)>> {
        let version = self.version;
        Ok(self
            .next_record()?
            .map(|record| (RecordHeader::parse(version, record.header), record)))
    }

    /// Convert into a record iterator
    pub fn records(self) -> Records<'a> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Decode every remaining record into owned values
    ///
    /// All or nothing: on error no records are returned.
    pub fn read_all(self) -> Result<Vec<Record>> {
        self.records()
            .map(|record| record.map(|r| r.to_record()))
            .collect()
    }
}

/// Iterator adapter over borrowed records
///
/// Yields at most one error, then stops.
pub struct Records<'a> {
    reader: ArchiveReader<'a>,
    done: bool,
}

impl<'a> Records<'a> {
    pub fn version(&self) -> u8 {
        self.reader.version
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<RecordRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Sequential reader over any `Read` source
///
/// Generic over `R: Read` so tests can use `&[u8]` and production code can use
/// `BufReader<File>`. Payload buffers grow as bytes arrive, so a forged
/// `total_size` cannot force a large allocation.
pub struct StreamReader<R: Read> {
    reader: R,
    version: u8,
    max_record_size: u32,
    records_read: u64,
}

impl<R: Read> StreamReader<R> {
    /// Open a stream, reading and validating the global header
    pub fn open(reader: R) -> Result<Self> {
        Self::open_with_config(reader, &CodecConfig::default())
    }

    pub fn open_with_config(mut reader: R, config: &CodecConfig) -> Result<Self> {
        let mut header = Vec::with_capacity(GLOBAL_HEADER_SIZE);
        (&mut reader)
            .take(GLOBAL_HEADER_SIZE as u64)
            .read_to_end(&mut header)?;
        let header = GlobalHeader::from_bytes(&header)?;
        debug!(version = header.version, "Opened FCA stream");

        Ok(StreamReader {
            reader,
            version: header.version,
            max_record_size: config.max_record_size,
            records_read: 0,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read the next record, or `None` at a clean end of stream
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let record = read_record(&mut self.reader, self.max_record_size)?;
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }

    /// Convert into a record iterator
    pub fn records(self) -> StreamRecords<R> {
        StreamRecords {
            reader: self,
            done: false,
        }
    }

    /// Consume the reader and return the underlying source
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator adapter over streamed records
pub struct StreamRecords<R: Read> {
    reader: StreamReader<R>,
    done: bool,
}

impl<R: Read> Iterator for StreamRecords<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
