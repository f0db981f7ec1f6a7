#![no_main]
use fca::read_archive;
use libfuzzer_sys::fuzz_target;

// Any input must either decode cleanly or fail with a typed error.
// A successful decode must re-encode to the exact input.
fuzz_target!(|data: &[u8]| {
    if let Ok(archive) = read_archive(data) {
        let encoded = archive.encode().expect("decoded archive re-encodes");
        assert_eq!(encoded, data);
    }
});
