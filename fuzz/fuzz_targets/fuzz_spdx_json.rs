#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_convert::{config::ConverterConfig, SpdxToCycloneDx};

/// Fuzz SPDX → CycloneDX conversion.
///
/// Wraps input as the package list of a valid SPDX envelope so the entity
/// and relationship code is reached rather than stopping at validation.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let converter = SpdxToCycloneDx::new(&ConverterConfig::default());

        if let Ok(value) = serde_json::from_str(s) {
            let _ = converter.convert(&value);
        }

        if s.len() < 10_000 {
            let wrapped = format!(
                r#"{{"spdxVersion":"SPDX-2.3","dataLicense":"CC0-1.0","SPDXID":"SPDXRef-DOCUMENT","name":"fuzz","documentNamespace":"https://example.com/fuzz","packages":[{s}]}}"#,
            );
            if let Ok(value) = serde_json::from_str(&wrapped) {
                let _ = converter.convert(&value);
            }
        }
    }
});
