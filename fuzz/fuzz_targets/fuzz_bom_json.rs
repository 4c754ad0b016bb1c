#![no_main]
use libfuzzer_sys::fuzz_target;
use sbomgen::parsers::{write_bom, CycloneDxParser};

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the CycloneDX JSON reader and writer.
///
/// Prefixes input with a minimal CycloneDX JSON wrapper to increase
/// the likelihood of reaching component parsing rather than failing
/// on the envelope.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = CycloneDxParser::new();

        if let Ok(bom) = parser.parse_str(s) {
            let _ = write_bom(&bom);
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"bomFormat":"CycloneDX","specVersion":"1.5","components":[{s}]}}"#,
            );
            let _ = parser.parse_str(&wrapped);
        }
    }
});
