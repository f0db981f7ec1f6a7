//! Property-based tests for the codec laws
//!
//! Uses proptest to check that encoding and decoding are exact inverses and
//! that no corrupted or truncated input is ever silently accepted.

use fca::{read_archive, write_archive, ArchiveReader, ErrorKind, Record, StreamReader};
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::collection::vec(any::<u8>(), 0..64),
        prop::collection::vec(any::<u8>(), 0..512),
    )
        .prop_map(|(header, payload)| Record::new(header, payload))
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..16)
}

proptest! {
    #[test]
    fn prop_round_trip(version in any::<u8>(), records in arb_records()) {
        let bytes = write_archive(version, &records).unwrap();
        let (decoded_version, decoded) = read_archive(&bytes).unwrap().into_parts();

        prop_assert_eq!(decoded_version, version);
        prop_assert_eq!(decoded, records);
    }

    #[test]
    fn prop_stream_reader_round_trip(version in any::<u8>(), records in arb_records()) {
        let bytes = write_archive(version, &records).unwrap();
        let reader = StreamReader::open(bytes.as_slice()).unwrap();
        prop_assert_eq!(reader.version(), version);

        let decoded: Vec<Record> = reader.records().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(decoded, records);
    }

    #[test]
    fn prop_encoded_length(version in any::<u8>(), records in arb_records()) {
        let bytes = write_archive(version, &records).unwrap();
        let expected: usize = 4 + records
            .iter()
            .map(|r| 4 + 2 + r.header.len() + r.payload.len())
            .sum::<usize>();
        prop_assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn prop_strict_prefix_is_leading_records_or_truncated(
        version in any::<u8>(),
        records in prop::collection::vec(arb_record(), 1..8),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = write_archive(version, &records).unwrap();
        let len = cut.index(bytes.len());

        // Record boundaries: the end of the global header and of each record
        let mut end = 4usize;
        let mut whole = if len == end { Some(0) } else { None };
        for (i, record) in records.iter().enumerate() {
            end += record.encoded_len().unwrap();
            if len == end {
                whole = Some(i + 1);
            }
        }

        let result = read_archive(&bytes[..len]);
        match whole {
            Some(count) => {
                let archive = result.unwrap();
                prop_assert_eq!(archive.version(), version);
                prop_assert_eq!(archive.records(), &records[..count]);
            }
            None => prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Truncated),
        }
    }

    #[test]
    fn prop_arbitrary_input_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        // Either a clean decode or a typed error, never a panic or overshoot
        if let Ok(reader) = ArchiveReader::new(&bytes) {
            let mut reader = reader;
            while let Ok(Some(_)) = reader.next_record() {
                prop_assert!(reader.position() <= bytes.len());
            }
        }
    }

    #[test]
    fn prop_decode_reencode_is_identity(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut input = b"FCA\x01".to_vec();
        input.extend(bytes);

        if let Ok(archive) = read_archive(&input) {
            prop_assert_eq!(archive.encode().unwrap(), input);
        }
    }
}
