#![no_main]
use libfuzzer_sys::fuzz_target;
use sbomgen::parsers::{ManifestParser, PurlListParser};
use sbomgen::reconcile::BomReconciler;
use sbomgen::model::Bom;

/// Fuzz the purl-list reader and feed accepted manifests to the engine.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(manifest) = PurlListParser::new().parse_str(s) {
            let _ = BomReconciler::new().reconcile(&manifest, &Bom::default());
        }
    }
});
