#![no_main]

use code_raker::{Range, Raker};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Limit input size to keep the fuzzer fast and avoid OOM in pathological cases.
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);

    // The comment pass needs no parse, so it must cope with any text.
    let mut raker = Raker::new(source.to_string());
    let report = raker
        .rake_comments(|_| true)
        .expect("a fresh raker accepts marks");
    assert_eq!(report.scanned, report.removed + report.skipped);

    let removed: usize = raker.removed_ranges().iter().map(Range::len).sum();
    let code = raker.to_code();
    assert_eq!(code.len(), source.len() - removed);

    let _ = raker.generate_map_json().expect("sourcemap serializes");
});
