#![no_main]

use libfuzzer_sys::fuzz_target;
use presence_analyzer::parser::parse_records;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes never abort a parse; only I/O errors can fail it
    let (store, stats) = parse_records(data).expect("in-memory reader cannot fail");
    assert!(store.record_count() as u64 <= stats.accepted);
});
