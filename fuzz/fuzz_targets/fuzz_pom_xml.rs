#![no_main]
use libfuzzer_sys::fuzz_target;
use sbomgen::parsers::{ManifestParser, PomParser};

/// Fuzz the Maven POM reader, including property interpolation.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = PomParser::new().parse_str(s);
    }
});
