#![no_main]
use fca::{read_archive, StreamReader};
use libfuzzer_sys::fuzz_target;

// The streaming reader must agree with the buffered reader on every input.
fuzz_target!(|data: &[u8]| {
    let buffered = read_archive(data).map(|a| a.into_parts());
    let streamed = StreamReader::open(data).and_then(|reader| {
        let version = reader.version();
        let records: Result<Vec<_>, _> = reader.records().collect();
        records.map(|records| (version, records))
    });

    match (buffered, streamed) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.kind(), b.kind()),
        (a, b) => panic!("readers disagree: {:?} vs {:?}", a.is_ok(), b.is_ok()),
    }
});
