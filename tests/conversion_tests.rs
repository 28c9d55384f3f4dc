//! End-to-end conversion tests over the fixture documents.

use sbom_convert::{
    config::ConverterConfig, ConversionResult, ConvertError, Converter, ErrorCode, Origin,
    SbomFormat, Severity,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn convert_fixture(name: &str) -> ConversionResult {
    Converter::default()
        .convert_file(&fixture_path(name), None)
        .expect("fixture converts")
}

fn component<'a>(bom: &'a Value, name: &str) -> &'a Value {
    bom["components"]
        .as_array()
        .and_then(|components| components.iter().find(|c| c["name"] == name))
        .unwrap_or_else(|| panic!("component {name} not found"))
}

fn package<'a>(doc: &'a Value, name: &str) -> &'a Value {
    doc["packages"]
        .as_array()
        .and_then(|packages| packages.iter().find(|p| p["name"] == name))
        .unwrap_or_else(|| panic!("package {name} not found"))
}

fn relationships_of_type(doc: &Value, kind: &str) -> BTreeSet<(String, String)> {
    doc["relationships"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter(|r| r["relationshipType"] == kind)
        .map(|r| {
            (
                r["spdxElementId"].as_str().unwrap_or_default().to_string(),
                r["relatedSpdxElement"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

// ============================================================================
// Reference scenarios
// ============================================================================

mod scenarios {
    use super::*;

    fn required_spdx() -> Value {
        json!({
            "spdxVersion": "SPDX-2.3",
            "dataLicense": "CC0-1.0",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "minimal",
            "documentNamespace": "https://example.com/minimal"
        })
    }

    #[test]
    fn test_required_fields_only_spdx() {
        let result = Converter::default()
            .convert(&required_spdx())
            .expect("detected");

        assert!(result.success());
        assert!(result.errors.is_empty());
        assert_eq!(result.content["bomFormat"], "CycloneDX");
        assert_eq!(result.content["specVersion"], "1.5");
        assert_eq!(result.content["components"], json!([]));
    }

    #[test]
    fn test_two_components_one_dependency() {
        let bom = json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.4",
            "version": 1,
            "components": [
                {"type": "library", "bom-ref": "comp-a", "name": "a", "version": "1.0"},
                {"type": "library", "bom-ref": "comp-b", "name": "b", "version": "2.0"}
            ],
            "dependencies": [{"ref": "comp-a", "dependsOn": ["comp-b"]}]
        });
        let result = Converter::default().convert(&bom).expect("detected");
        let doc = &result.content;

        assert!(result.success());
        assert_eq!(doc["spdxVersion"], "SPDX-2.2");
        let packages = doc["packages"].as_array().expect("packages");
        assert_eq!(packages.len(), 2);
        assert!(packages
            .iter()
            .all(|p| p["SPDXID"].as_str().is_some_and(|id| id.starts_with("SPDXRef-"))));
        assert_eq!(
            relationships_of_type(doc, "DEPENDS_ON"),
            BTreeSet::from([("SPDXRef-comp-a".to_string(), "SPDXRef-comp-b".to_string())])
        );
    }

    #[test]
    fn test_unsupported_checksum_algorithm() {
        let mut doc = required_spdx();
        doc["packages"] = json!([{
            "SPDXID": "SPDXRef-pkg",
            "name": "pkg",
            "checksums": [{"algorithm": "FOO", "checksumValue": "abc"}]
        }]);
        let result = Converter::default().convert(&doc).expect("detected");

        assert!(result.success());
        let hashes = result.content["components"][0].get("hashes");
        assert!(hashes.map_or(true, |h| h.as_array().is_some_and(Vec::is_empty)));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Unsupported hash algorithm: FOO")));
    }
}

// ============================================================================
// SPDX → CycloneDX
// ============================================================================

mod spdx_to_cyclonedx {
    use super::*;

    #[test]
    fn test_document_fields() {
        let result = convert_fixture("spdx/minimal.spdx.json");
        assert!(result.success(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.target_format, SbomFormat::CycloneDx);

        let bom = &result.content;
        assert_eq!(bom["bomFormat"], "CycloneDX");
        assert_eq!(bom["specVersion"], "1.5");
        assert_eq!(bom["version"], 1);
        assert_eq!(
            bom["serialNumber"],
            "urn:uuid:1b4e28ba-2fa1-11d2-883f-0016d3cca427"
        );
    }

    #[test]
    fn test_metadata_from_creation_info() {
        let result = convert_fixture("spdx/minimal.spdx.json");
        let metadata = &result.content["metadata"];

        assert_eq!(metadata["timestamp"], "2024-01-15T10:00:00Z");
        assert_eq!(
            metadata["tools"],
            json!([{"name": "syft", "version": "0.100.0"}])
        );
        assert_eq!(
            metadata["supplier"],
            json!({"name": "Example Corp", "contact": [{"email": "security@example.com"}]})
        );
        assert_eq!(metadata["properties"][0]["value"], "test-app-sbom");
    }

    #[test]
    fn test_packages_become_components() {
        let result = convert_fixture("spdx/minimal.spdx.json");
        let bom = &result.content;
        assert_eq!(bom["components"].as_array().map(Vec::len), Some(2));

        // The described package is the BOM subject, not a component
        let app = &bom["metadata"]["component"];
        assert_eq!(app["name"], "test-app");
        assert_eq!(app["type"], "application");
        assert_eq!(app["bom-ref"], "Package-test-app");
        assert_eq!(app["supplier"], json!({"name": "Example Corp"}));
        assert!(app.get("externalReferences").is_none());

        let lodash = component(bom, "lodash");
        assert_eq!(lodash["type"], "library");
        assert_eq!(lodash["version"], "4.17.21");
        assert_eq!(lodash["purl"], "pkg:npm/lodash@4.17.21");
        assert_eq!(lodash["hashes"][0]["alg"], "SHA-256");
        assert_eq!(lodash["licenses"], json!([{"license": {"id": "MIT"}}]));
        assert!(lodash.get("copyright").is_none());
        assert_eq!(
            lodash["externalReferences"],
            json!([{"type": "distribution", "url": "https://registry.npmjs.org/lodash/-/lodash-4.17.21.tgz"}])
        );

        let express = component(bom, "express");
        assert_eq!(express["licenses"], json!([{"license": {"id": "MIT"}}]));
        assert_eq!(
            express["externalReferences"],
            json!([{"type": "website", "url": "http://expressjs.com/"}])
        );
    }

    #[test]
    fn test_relationships_become_dependencies() {
        let result = convert_fixture("spdx/minimal.spdx.json");
        assert_eq!(
            result.content["dependencies"],
            json!([{"ref": "Package-test-app", "dependsOn": ["Package-lodash", "Package-express"]}])
        );
    }

    #[test]
    fn test_document_rooted_edges_are_not_dependencies() {
        let doc = json!({
            "spdxVersion": "SPDX-2.3",
            "dataLicense": "CC0-1.0",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "rooted",
            "documentNamespace": "https://example.com/rooted",
            "documentDescribes": ["SPDXRef-app"],
            "packages": [
                {"SPDXID": "SPDXRef-app", "name": "app"},
                {"SPDXID": "SPDXRef-lib", "name": "lib"}
            ],
            "relationships": [
                {"spdxElementId": "SPDXRef-DOCUMENT", "relatedSpdxElement": "SPDXRef-app", "relationshipType": "DESCRIBES"},
                {"spdxElementId": "SPDXRef-DOCUMENT", "relatedSpdxElement": "SPDXRef-lib", "relationshipType": "CONTAINS"},
                {"spdxElementId": "SPDXRef-app", "relatedSpdxElement": "SPDXRef-lib", "relationshipType": "DEPENDS_ON"}
            ]
        });
        let result = Converter::default().convert(&doc).expect("detected");

        assert!(result.success());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.content["metadata"]["component"]["bom-ref"], "app");
        assert_eq!(
            result.content["dependencies"],
            json!([{"ref": "app", "dependsOn": ["lib"]}])
        );
    }

    #[test]
    fn test_cycle_is_reported_from_every_member() {
        let result = convert_fixture("spdx/cycle.spdx.json");
        assert!(result.success());
        assert_eq!(result.content["specVersion"], "1.4");
        assert_eq!(
            result.warnings,
            [
                "Circular dependency detected: SPDXRef-A -> SPDXRef-B -> SPDXRef-C -> SPDXRef-A",
                "Circular dependency detected: SPDXRef-B -> SPDXRef-C -> SPDXRef-A -> SPDXRef-B",
                "Circular dependency detected: SPDXRef-C -> SPDXRef-A -> SPDXRef-B -> SPDXRef-C",
            ]
        );
        assert_eq!(result.content["dependencies"].as_array().map(Vec::len), Some(3));
    }
}

// ============================================================================
// CycloneDX → SPDX
// ============================================================================

mod cyclonedx_to_spdx {
    use super::*;

    #[test]
    fn test_document_fields() {
        let result = convert_fixture("cyclonedx/minimal.cdx.json");
        assert!(result.success(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);

        let doc = &result.content;
        assert_eq!(doc["spdxVersion"], "SPDX-2.3");
        assert_eq!(doc["dataLicense"], "CC0-1.0");
        assert_eq!(doc["SPDXID"], "SPDXRef-DOCUMENT");
        assert_eq!(doc["name"], "test-app");
        assert_eq!(
            doc["documentNamespace"],
            "https://spdx.org/spdxdocs/test-app-3e671687-395b-41f5-a30f-a58921a69b79"
        );

        let creators = doc["creationInfo"]["creators"].as_array().expect("creators");
        assert_eq!(creators[0], "Tool: cdxgen-10.0.0");
        assert_eq!(creators[1], "Person: Jane Doe (jane@example.com)");
        assert_eq!(creators.len(), 3);
        assert_eq!(doc["creationInfo"]["created"], "2024-01-15T10:00:00Z");
    }

    #[test]
    fn test_components_become_packages() {
        let result = convert_fixture("cyclonedx/minimal.cdx.json");
        let doc = &result.content;

        let names: Vec<&str> = doc["packages"]
            .as_array()
            .expect("packages")
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(names, ["test-app", "lodash", "express", "body-parser"]);

        let app = package(doc, "test-app");
        assert_eq!(app["SPDXID"], "SPDXRef-pkg-npm-test-app-1.0.0");
        assert_eq!(app["primaryPackagePurpose"], "APPLICATION");
        assert_eq!(app["downloadLocation"], "NOASSERTION");
        assert_eq!(app["filesAnalyzed"], false);
        assert_eq!(
            app["externalRefs"],
            json!([{
                "referenceCategory": "PACKAGE-MANAGER",
                "referenceType": "purl",
                "referenceLocator": "pkg:npm/test-app@1.0.0"
            }])
        );

        let lodash = package(doc, "lodash");
        assert_eq!(lodash["licenseConcluded"], "MIT");
        assert_eq!(lodash["licenseDeclared"], "MIT");
        assert_eq!(lodash["checksums"][0]["algorithm"], "SHA256");

        let express = package(doc, "express");
        assert_eq!(express["primaryPackagePurpose"], "FRAMEWORK");
        assert_eq!(express["licenseConcluded"], "MIT OR Apache-2.0");
        assert_eq!(express["homepage"], "http://expressjs.com/");
    }

    #[test]
    fn test_structural_and_dependency_relationships() {
        let result = convert_fixture("cyclonedx/minimal.cdx.json");
        let doc = &result.content;
        let id = |s: &str| s.to_string();

        assert_eq!(
            relationships_of_type(doc, "DESCRIBES"),
            BTreeSet::from([
                (id("SPDXRef-DOCUMENT"), id("SPDXRef-pkg-npm-test-app-1.0.0")),
                (id("SPDXRef-DOCUMENT"), id("SPDXRef-pkg-npm-lodash-4.17.21")),
                (id("SPDXRef-DOCUMENT"), id("SPDXRef-pkg-npm-express-4.18.2")),
            ])
        );
        assert_eq!(
            relationships_of_type(doc, "CONTAINS"),
            BTreeSet::from([(
                id("SPDXRef-pkg-npm-express-4.18.2"),
                id("SPDXRef-pkg-npm-body-parser-1.20.1")
            )])
        );
        assert_eq!(
            relationships_of_type(doc, "DEPENDS_ON"),
            BTreeSet::from([
                (id("SPDXRef-pkg-npm-test-app-1.0.0"), id("SPDXRef-pkg-npm-lodash-4.17.21")),
                (id("SPDXRef-pkg-npm-test-app-1.0.0"), id("SPDXRef-pkg-npm-express-4.18.2")),
                (id("SPDXRef-pkg-npm-express-4.18.2"), id("SPDXRef-pkg-npm-body-parser-1.20.1")),
            ])
        );
    }

    #[test]
    fn test_dangling_dependency_dropped() {
        let bom = json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.6",
            "version": 1,
            "components": [{"bom-ref": "a", "name": "a"}],
            "dependencies": [
                {"ref": "a", "dependsOn": ["missing"]},
                {"ref": "ghost", "dependsOn": ["a"]}
            ]
        });
        let result = Converter::default().convert(&bom).expect("detected");

        assert_eq!(result.content["spdxVersion"], "SPDX-2.3");
        assert!(relationships_of_type(&result.content, "DEPENDS_ON").is_empty());
        assert_eq!(
            result.warnings,
            [
                "Dependency of 'a' on unknown component 'missing' dropped",
                "Dependency 'a' has no valid targets left; dropped",
                "Dependency references unknown component 'ghost'; dropped",
            ]
        );
    }
}

// ============================================================================
// Round trips and error paths
// ============================================================================

mod round_trip {
    use super::*;

    fn reconvert(result: &ConversionResult) -> ConversionResult {
        Converter::default()
            .convert(&result.content)
            .expect("converted output is detectable")
    }

    #[test]
    fn test_spdx_round_trip_keeps_identity() {
        let source: Value = serde_json::from_str(
            &std::fs::read_to_string(fixture_path("spdx/minimal.spdx.json")).expect("fixture"),
        )
        .expect("valid json");
        let back = reconvert(&convert_fixture("spdx/minimal.spdx.json"));
        assert!(back.success());
        assert_eq!(back.target_format, SbomFormat::Spdx);

        let doc = &back.content;
        assert_eq!(doc["name"], source["name"]);
        assert!(doc["documentNamespace"]
            .as_str()
            .is_some_and(|ns| ns.ends_with("1b4e28ba-2fa1-11d2-883f-0016d3cca427")));

        for name in ["test-app", "lodash", "express"] {
            assert_eq!(package(doc, name)["SPDXID"], package(&source, name)["SPDXID"]);
            assert_eq!(
                package(doc, name)["versionInfo"],
                package(&source, name)["versionInfo"]
            );
        }
        assert_eq!(
            relationships_of_type(doc, "DEPENDS_ON"),
            relationships_of_type(&source, "DEPENDS_ON")
        );
        assert_eq!(package(doc, "lodash")["licenseConcluded"], "MIT");
    }

    #[test]
    fn test_cyclonedx_round_trip_keeps_purls_and_licenses() {
        let back = reconvert(&convert_fixture("cyclonedx/minimal.cdx.json"));
        assert!(back.success());

        let bom = &back.content;
        assert_eq!(
            bom["serialNumber"],
            "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79"
        );
        assert_eq!(component(bom, "lodash")["purl"], "pkg:npm/lodash@4.17.21");
        assert_eq!(component(bom, "express")["type"], "framework");
        assert_eq!(
            component(bom, "express")["licenses"],
            json!([{"expression": "MIT OR Apache-2.0"}])
        );
        assert_eq!(bom["metadata"]["component"]["name"], "test-app");
        assert_eq!(bom["components"].as_array().map(Vec::len), Some(3));
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_unknown_format_is_hard_error() {
        let err = Converter::default()
            .convert(&json!({"hello": "world"}))
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownFormat));
    }

    #[test]
    fn test_same_format_refused() {
        let result = Converter::default()
            .convert_file(&fixture_path("spdx/minimal.spdx.json"), Some(SbomFormat::Spdx))
            .expect("readable");
        assert!(!result.success());
        assert_eq!(result.errors[0].code, ErrorCode::SameFormat);
    }

    #[test]
    fn test_wrong_bom_format_value() {
        let result = Converter::default()
            .convert(&json!({"bomFormat": "SPDX", "specVersion": "1.5", "version": 1}))
            .expect("detected as CycloneDX");
        assert_eq!(result.content, Value::Null);
        assert_eq!(result.errors[0].code, ErrorCode::InvalidDiscriminator);
        assert_eq!(result.errors[0].severity, Severity::Critical);
    }

    #[test]
    fn test_wrong_typed_field_is_error_not_abort() {
        let doc = json!({
            "spdxVersion": "SPDX-2.3",
            "dataLicense": "CC0-1.0",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "typed",
            "documentNamespace": "https://example.com/typed",
            "packages": [
                {"SPDXID": "SPDXRef-a", "name": "a", "checksums": "sha256:abc"},
                {"SPDXID": "SPDXRef-b", "name": "b"}
            ]
        });
        let result = Converter::default().convert(&doc).expect("detected");

        assert!(!result.success());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].severity, Severity::Error);
        assert_eq!(result.errors[0].code, ErrorCode::FieldTransformFailed);
        assert_eq!(result.errors[0].context["field"], "checksums");
        assert_eq!(result.content["components"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_errors_filter_by_origin() {
        let doc = json!({
            "spdxVersion": "SPDX-2.3",
            "dataLicense": "CC0-1.0",
            "SPDXID": "SPDXRef-DOCUMENT",
            "name": "typed",
            "documentNamespace": "https://example.com/typed",
            "packages": [{"SPDXID": "SPDXRef-a", "name": "a", "checksums": "x", "licenseConcluded": 5}],
            "relationships": {"not": "a list"}
        });
        let result = Converter::default().convert(&doc).expect("detected");

        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors_from(Origin::Hash).count(), 1);
        assert_eq!(result.errors_from(Origin::License).count(), 1);
        assert_eq!(result.errors_from(Origin::Relationship).count(), 1);
        assert_eq!(result.errors_from(Origin::FieldMapping).count(), 0);
    }

    #[test]
    fn test_disabled_cycle_detection() {
        let mut config = ConverterConfig::default();
        config.graph.detect_cycles = false;
        let result = Converter::new(&config)
            .convert_file(&fixture_path("spdx/cycle.spdx.json"), None)
            .expect("converted");
        assert!(result.warnings.is_empty());
    }
}
