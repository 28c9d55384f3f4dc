#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_convert::{config::ConverterConfig, CycloneDxToSpdx};

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz CycloneDX → SPDX conversion.
///
/// Wraps input as the component list of a valid CycloneDX envelope to
/// reach nested-component flattening and dependency handling.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let converter = CycloneDxToSpdx::new(&ConverterConfig::default());

        if let Ok(value) = serde_json::from_str(s) {
            let _ = converter.convert(&value);
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"bomFormat":"CycloneDX","specVersion":"1.5","version":1,"components":[{s}]}}"#,
            );
            if let Ok(value) = serde_json::from_str(&wrapped) {
                let _ = converter.convert(&value);
            }
        }
    }
});
