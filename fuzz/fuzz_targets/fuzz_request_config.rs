#![no_main]
use libfuzzer_sys::fuzz_target;
use sbomgen::model::{GenerationType, RequestConfig};

/// Fuzz request configuration validation for both request types.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for kind in [GenerationType::Build, GenerationType::Operation] {
            if let Ok(config) = RequestConfig::parse(s, kind, "") {
                let _ = config.to_yaml();
            }
        }
    }
});
