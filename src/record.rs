//! Self-delimiting record framing
//!
//! **Layout** (all integers big-endian):
//! ```text
//! total_size   : u32  = 2 + header_size + payload_size
//! header_size  : u16
//! header_bytes : header_size bytes
//! payload_bytes: total_size - 2 - header_size bytes
//! ```
//!
//! `total_size` comes first so a reader can skip a whole record, including a
//! header layout it does not understand, without parsing the header.
//!
//! Every declared size is checked against the bytes that actually remain
//! before anything is sliced or allocated.

use crate::error::{FcaError, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use tracing::trace;

/// Width of the `total_size` field
pub const TOTAL_SIZE_FIELD: usize = 4;
/// Width of the `header_size` field (counted inside `total_size`)
pub const HEADER_SIZE_FIELD: usize = 2;

pub const MAX_HEADER_SIZE: usize = u16::MAX as usize;

// Upper bound on a single up-front reservation while streaming
const STREAM_CHUNK: usize = 64 * 1024;

/// An owned record: raw header bytes plus payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Record {
    pub fn new(header: Vec<u8>, payload: Vec<u8>) -> Self {
        Record { header, payload }
    }

    pub fn as_record_ref(&self) -> RecordRef<'_> {
        RecordRef {
            header: &self.header,
            payload: &self.payload,
        }
    }

    /// Value of the `total_size` field this record encodes to
    pub fn total_size(&self) -> Result<u32> {
        total_size_for(self.header.len(), self.payload.len())
    }

    /// Bytes this record occupies in a stream, including `total_size` itself
    pub fn encoded_len(&self) -> Result<usize> {
        Ok(TOTAL_SIZE_FIELD + self.total_size()? as usize)
    }
}

/// A record borrowed from an input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef<'a> {
    pub header: &'a [u8],
    pub payload: &'a [u8],
}

impl RecordRef<'_> {
    pub fn to_record(&self) -> Record {
        Record {
            header: self.header.to_vec(),
            payload: self.payload.to_vec(),
        }
    }
}

/// Compute `total_size` for the given lengths, checking both size fields
pub fn total_size_for(header_len: usize, payload_len: usize) -> Result<u32> {
    let overflow = || FcaError::SizeOverflow {
        header_len,
        payload_len,
    };

    if header_len > MAX_HEADER_SIZE {
        return Err(overflow());
    }

    let total = (HEADER_SIZE_FIELD as u64)
        .checked_add(header_len as u64)
        .and_then(|n| n.checked_add(payload_len as u64))
        .ok_or_else(overflow)?;

    u32::try_from(total).map_err(|_| overflow())
}

/// Append one encoded record to `out`, returning the number of bytes written
pub fn encode_record_into(out: &mut Vec<u8>, header: &[u8], payload: &[u8]) -> Result<usize> {
    let total_size = total_size_for(header.len(), payload.len())?;

    out.reserve(TOTAL_SIZE_FIELD + total_size as usize);
    out.extend_from_slice(&total_size.to_be_bytes());
    out.extend_from_slice(&(header.len() as u16).to_be_bytes());
    out.extend_from_slice(header);
    out.extend_from_slice(payload);

    Ok(TOTAL_SIZE_FIELD + total_size as usize)
}

/// Encode one record into a fresh buffer
pub fn encode_record(header: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_record_into(&mut out, header, payload)?;
    Ok(out)
}

/// Write one encoded record to a sink, returning the number of bytes written
pub fn write_record<W: Write + ?Sized>(w: &mut W, header: &[u8], payload: &[u8]) -> Result<u64> {
    let total_size = total_size_for(header.len(), payload.len())?;

    w.write_all(&total_size.to_be_bytes())?;
    w.write_all(&(header.len() as u16).to_be_bytes())?;
    w.write_all(header)?;
    w.write_all(payload)?;

    Ok(TOTAL_SIZE_FIELD as u64 + total_size as u64)
}

/// Decode one record from the start of `bytes`
///
/// Returns the borrowed record and the number of bytes consumed
/// (`4 + total_size`).
pub fn decode_record(bytes: &[u8]) -> Result<(RecordRef<'_>, usize)> {
    decode_record_with_limit(bytes, u32::MAX)
}

/// Decode one record, rejecting any `total_size` above `max_record_size`
pub fn decode_record_with_limit(bytes: &[u8], max_record_size: u32) -> Result<(RecordRef<'_>, usize)> {
    let mut rest = bytes;

    let total_size = u32::from_be_bytes(take_array(&mut rest, "total_size field")?);
    if total_size > max_record_size {
        return Err(FcaError::RecordTooLarge {
            total_size,
            limit: max_record_size,
        });
    }

    let header_size = u16::from_be_bytes(take_array(&mut rest, "header_size field")?);
    let payload_size = payload_size(total_size, header_size)?;

    let header = take(&mut rest, header_size as usize, "header bytes")?;
    let payload = take(&mut rest, payload_size, "payload bytes")?;

    let consumed = TOTAL_SIZE_FIELD + total_size as usize;
    trace!(total_size, header_size, consumed, "Decoded record");

    Ok((RecordRef { header, payload }, consumed))
}

/// Read one record from a stream
///
/// Returns `Ok(None)` on a clean end of stream (zero bytes before the next
/// `total_size` field). A partial `total_size` field is `Truncated`.
pub fn read_record<R: Read + ?Sized>(r: &mut R, max_record_size: u32) -> Result<Option<Record>> {
    let mut size_buf = [0u8; TOTAL_SIZE_FIELD];
    let got = read_full(r, &mut size_buf)?;
    if got == 0 {
        return Ok(None);
    }
    if got < TOTAL_SIZE_FIELD {
        return Err(FcaError::truncated("total_size field", TOTAL_SIZE_FIELD, got));
    }

    let total_size = u32::from_be_bytes(size_buf);
    if total_size > max_record_size {
        return Err(FcaError::RecordTooLarge {
            total_size,
            limit: max_record_size,
        });
    }

    let mut header_size_buf = [0u8; HEADER_SIZE_FIELD];
    let got = read_full(r, &mut header_size_buf)?;
    if got < HEADER_SIZE_FIELD {
        return Err(FcaError::truncated("header_size field", HEADER_SIZE_FIELD, got));
    }

    let header_size = u16::from_be_bytes(header_size_buf);
    let payload_size = payload_size(total_size, header_size)?;

    let header = read_exact_vec(r, header_size as usize, "header bytes")?;
    let payload = read_exact_vec(r, payload_size, "payload bytes")?;

    trace!(total_size, header_size, "Read record from stream");

    Ok(Some(Record { header, payload }))
}

fn payload_size(total_size: u32, header_size: u16) -> Result<usize> {
    (total_size as u64)
        .checked_sub(HEADER_SIZE_FIELD as u64 + header_size as u64)
        .map(|n| n as usize)
        .ok_or(FcaError::InvalidSize {
            total_size: total_size as u64,
            header_size: header_size as u64,
        })
}

fn take<'a>(rest: &mut &'a [u8], len: usize, context: &'static str) -> Result<&'a [u8]> {
    if rest.len() < len {
        return Err(FcaError::truncated(context, len, rest.len()));
    }
    let (head, tail) = rest.split_at(len);
    *rest = tail;
    Ok(head)
}

fn take_array<const N: usize>(rest: &mut &[u8], context: &'static str) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(rest, N, context)?);
    Ok(out)
}

/// Fill `buf` as far as the stream allows, returning the byte count
fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read exactly `len` bytes without trusting `len` for the allocation
fn read_exact_vec<R: Read + ?Sized>(r: &mut R, len: usize, context: &'static str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(len.min(STREAM_CHUNK));
    let got = (&mut *r).take(len as u64).read_to_end(&mut out)?;
    if got < len {
        return Err(FcaError::truncated(context, len, got));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_example_record() {
        let bytes = encode_record(&[0x00, 0x00], &[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(
            bytes,
            vec![0x00, 0x00, 0x00, 0x07, 0x00, 0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC]
        );
    }

    #[test]
    fn test_decode_example_record() {
        let bytes = [0x00, 0x00, 0x00, 0x07, 0x00, 0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC];
        let (record, consumed) = decode_record(&bytes).unwrap();
        assert_eq!(record.header, &[0x00, 0x00]);
        assert_eq!(record.payload, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_empty_payload() {
        let bytes = encode_record(&[0, 0], &[]).unwrap();
        assert_eq!(&bytes[..4], &4u32.to_be_bytes());

        let (record, consumed) = decode_record(&bytes).unwrap();
        assert!(record.payload.is_empty());
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_empty_header_and_payload() {
        let bytes = encode_record(&[], &[]).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 2, 0, 0]);

        let (record, consumed) = decode_record(&bytes).unwrap();
        assert!(record.header.is_empty());
        assert!(record.payload.is_empty());
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_decode_leaves_trailing_bytes() {
        let mut bytes = encode_record(&[1, 2], b"abc").unwrap();
        let first_len = bytes.len();
        bytes.extend_from_slice(&[0xDE, 0xAD]);

        let (_, consumed) = decode_record(&bytes).unwrap();
        assert_eq!(consumed, first_len);
    }

    #[test]
    fn test_total_size_smaller_than_header() {
        // header_size = 2 but total_size = 3
        let bytes = [0x00, 0x00, 0x00, 0x03, 0x00, 0x02, 0x00, 0x00];
        assert!(matches!(
            decode_record(&bytes),
            Err(FcaError::InvalidSize {
                total_size: 3,
                header_size: 2
            })
        ));
    }

    #[test]
    fn test_invalid_size_caught_before_header_read() {
        // Declared header_size far exceeds both total_size and the buffer
        let bytes = [0x00, 0x00, 0x00, 0x02, 0xFF, 0xFF];
        assert!(matches!(
            decode_record(&bytes),
            Err(FcaError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_huge_total_size_is_truncated_not_allocated() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00];
        assert!(matches!(
            decode_record(&bytes),
            Err(FcaError::Truncated {
                context: "payload bytes",
                ..
            })
        ));
    }

    #[test]
    fn test_record_limit() {
        let bytes = encode_record(&[0, 0], &[1; 100]).unwrap();
        assert!(matches!(
            decode_record_with_limit(&bytes, 50),
            Err(FcaError::RecordTooLarge {
                total_size: 104,
                limit: 50
            })
        ));
        assert!(decode_record_with_limit(&bytes, 104).is_ok());
    }

    #[test]
    fn test_header_too_large() {
        let header = vec![0u8; MAX_HEADER_SIZE + 1];
        assert!(matches!(
            encode_record(&header, &[]),
            Err(FcaError::SizeOverflow { .. })
        ));

        let header = vec![0u8; MAX_HEADER_SIZE];
        assert!(encode_record(&header, &[]).is_ok());
    }

    #[test]
    fn test_total_size_overflow() {
        assert!(matches!(
            total_size_for(2, u32::MAX as usize),
            Err(FcaError::SizeOverflow { .. })
        ));
        assert_eq!(
            total_size_for(0, u32::MAX as usize - 2).unwrap(),
            u32::MAX
        );
    }

    #[test]
    fn test_write_record_matches_encode() {
        let mut sink = Vec::new();
        let written = write_record(&mut sink, &[7, 0], b"payload").unwrap();
        assert_eq!(sink, encode_record(&[7, 0], b"payload").unwrap());
        assert_eq!(written, sink.len() as u64);
    }

    #[test]
    fn test_read_record_stream() {
        let mut bytes = encode_record(&[1, 0], b"one").unwrap();
        bytes.extend(encode_record(&[2, 0], b"two").unwrap());

        let mut cursor = bytes.as_slice();
        let first = read_record(&mut cursor, u32::MAX).unwrap().unwrap();
        let second = read_record(&mut cursor, u32::MAX).unwrap().unwrap();
        assert_eq!(first, Record::new(vec![1, 0], b"one".to_vec()));
        assert_eq!(second, Record::new(vec![2, 0], b"two".to_vec()));
        assert!(read_record(&mut cursor, u32::MAX).unwrap().is_none());
    }

    #[test]
    fn test_read_record_stream_truncation() {
        let bytes = encode_record(&[0, 0], &[0xAA, 0xBB, 0xCC]).unwrap();
        for len in 1..bytes.len() {
            let mut cursor = &bytes[..len];
            assert!(
                matches!(
                    read_record(&mut cursor, u32::MAX),
                    Err(FcaError::Truncated { .. })
                ),
                "prefix of {} bytes should be truncated",
                len
            );
        }
    }

    #[test]
    fn test_record_sizes() {
        let record = Record::new(vec![0, 0], vec![1, 2, 3]);
        assert_eq!(record.total_size().unwrap(), 7);
        assert_eq!(record.encoded_len().unwrap(), 11);
        assert_eq!(record.as_record_ref().to_record(), record);
    }
}
