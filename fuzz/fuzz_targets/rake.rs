#![no_main]

use code_raker::{Config, Options, Preset, rake::rake_all};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > 256 * 1024 {
        &data[..256 * 1024]
    } else {
        data
    };

    let source = String::from_utf8_lossy(data);

    for config in [
        Config::all(),
        Options::default().with_preset(Preset::Library).resolve(),
        Options::default().with_preset(Preset::Application).resolve(),
    ] {
        if let Ok(Some(out)) = rake_all(&source, "input.js", &config) {
            assert!(out.code.len() < source.len());
            // If raking succeeds, the sourcemap must be parseable JSON.
            // Any panic here is a bug we want the fuzzer to catch.
            let _ = serde_json::from_str::<serde_json::Value>(&out.map)
                .expect("sourcemap must be valid JSON when rake_all() returns Ok");
        }
    }
});
