use std::fs;
use std::path::Path;

use assert_json_diff::assert_json_eq;
use serde_json::json;

use stance_core::{EngineConfig, NeedCategory};
use stance_io::canonical_json::write_canonical_file;
use stance_io::hasher::sha256_canonical;
use stance_io::loader::{load_bundle_from_manifest, load_catalog};

fn write(dir: &Path, name: &str, body: serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(&body).unwrap()).unwrap();
}

fn catalog_json() -> serde_json::Value {
    json!({
        "policies": [
            {
                "id": "housing-first",
                "title": "Housing first",
                "impact": {
                    "categories": {
                        "physiological": {"value": 9, "rationale": "shelter"},
                        "safety": {"value": 7}
                    },
                    "dimensions": {"population_reached": 4, "essentiality": 9},
                    "rationale": "stable housing before treatment"
                }
            },
            {
                "id": "carbon-tax",
                "title": "Carbon tax",
                "impact": {
                    "categories": {"selfActualization": {"value": 5}},
                    "dimensions": {"timeToOutcome": 2}
                }
            }
        ]
    })
}

#[test]
fn manifest_bundle_loads_catalog_archetypes_and_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("content")).unwrap();
    write(&dir.path().join("content"), "catalog.json", catalog_json());
    write(
        &dir.path().join("content"),
        "archetypes.json",
        json!({"archetypes": [
            {"id": "farmer", "name": "Farmer", "weights": {"physiological": 3, "safety": 1}}
        ]}),
    );
    write(dir.path(), "config.json", json!({"consensus": {"strong_pct": 80, "moderate_pct": 60}}));
    write(
        dir.path(),
        "manifest.json",
        json!({
            "catalog_path": "content/catalog.json",
            "archetypes_path": "content/archetypes.json",
            "config_path": "config.json"
        }),
    );

    let bundle = load_bundle_from_manifest(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(bundle.catalog.len(), 2);
    assert_eq!(bundle.registry.archetypes().len(), 1);
    let farmer = bundle.registry.archetypes().get(&"farmer".parse().unwrap()).unwrap();
    assert_eq!(farmer.weights.weight(NeedCategory::Physiological), 3.0);
    assert_eq!(bundle.config.consensus.strong_pct, 80);
    assert!(bundle.digests.archetypes_sha256.is_some());
    assert_eq!(bundle.digests.config_sha256, sha256_canonical(&bundle.config).unwrap());
}

#[test]
fn catalog_digest_is_independent_of_source_formatting() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    write(a.path(), "catalog.json", catalog_json());
    // Same content, canonical (compact, sorted) formatting.
    write_canonical_file(&b.path().join("catalog.json"), &catalog_json()).unwrap();

    let ca = load_catalog(&a.path().join("catalog.json")).unwrap();
    let cb = load_catalog(&b.path().join("catalog.json")).unwrap();
    assert_eq!(sha256_canonical(&ca).unwrap(), sha256_canonical(&cb).unwrap());
}

#[test]
fn loaded_catalog_serializes_with_snake_case_tokens() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "catalog.json", catalog_json());
    let catalog = load_catalog(&dir.path().join("catalog.json")).unwrap();
    let v = serde_json::to_value(&catalog).unwrap();
    assert_json_eq!(
        v["carbon-tax"]["impact"],
        json!({
            "categories": {"self_actualization": {"value": 5.0, "rationale": ""}},
            "dimensions": {"time_to_outcome": 2.0},
            "rationale": ""
        })
    );
}

#[test]
fn defaults_apply_without_optional_inputs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "catalog.json", catalog_json());
    write(dir.path(), "manifest.json", json!({"catalog_path": "catalog.json"}));
    let bundle = load_bundle_from_manifest(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(bundle.config, EngineConfig::default());
    assert_eq!(bundle.registry.archetypes().len(), 6);
    assert!(bundle.digests.archetypes_sha256.is_none());
}
