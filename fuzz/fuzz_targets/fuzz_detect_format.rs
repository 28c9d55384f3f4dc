#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_convert::FormatDetector;

/// Fuzz format detection on any JSON value.
fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = FormatDetector::new().detect(&value);
    }
});
