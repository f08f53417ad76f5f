//! Integration test: validate every manifest under `fixtures/manifests/`.
//!
//! Files in `valid/` must load into a typed manifest. Files in `invalid/`
//! must be rejected, and each one is expected to report a violation at a
//! specific instance path.

use std::path::{Path, PathBuf};

use modlist_core::to_pretty_json;
use modlist_schema::{SchemaValidationError, SchemaValidator, MANIFEST_SCHEMA};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn fixtures_dir() -> PathBuf {
    repo_root().join("fixtures").join("manifests")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// All manifest files directly under a directory, sorted.
fn manifest_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("json" | "yaml" | "yml")
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

#[test]
fn test_fixture_directories_populated() {
    assert!(manifest_files(&fixtures_dir().join("valid")).len() >= 4);
    assert!(manifest_files(&fixtures_dir().join("invalid")).len() >= 6);
}

#[test]
fn test_valid_fixtures_load() {
    init_tracing();
    let validator = SchemaValidator::builtin().expect("builtin schema loads");

    let mut failed = Vec::new();
    for path in manifest_files(&fixtures_dir().join("valid")) {
        if let Err(e) = validator.load_manifest(&path) {
            failed.push(format!("{}: {e}", path.display()));
        }
    }

    assert!(
        failed.is_empty(),
        "{} valid fixtures were rejected:\n{}",
        failed.len(),
        failed.join("\n")
    );
}

#[test]
fn test_invalid_fixtures_report_expected_path() {
    init_tracing();
    let validator = SchemaValidator::builtin().expect("builtin schema loads");

    let expected = [
        ("file-not-string.json", "/mods/0/file"),
        ("missing-mods.json", ""),
        ("missing-version.json", ""),
        ("mod-missing-name.json", "/mods/0"),
        ("mod-missing-source.json", "/mods/0"),
        ("source-not-uri.json", "/mods/0/source"),
    ];

    for (file, instance_path) in expected {
        let path = fixtures_dir().join("invalid").join(file);
        match validator.load_manifest(&path) {
            Err(SchemaValidationError::ValidationFailed {
                schema_name,
                violations,
            }) => {
                assert!(schema_name.starts_with(MANIFEST_SCHEMA), "{schema_name}");
                assert!(
                    violations.has_path(instance_path),
                    "{file}: expected a violation at {instance_path:?}, got:\n{violations}"
                );
            }
            Err(other) => panic!("{file}: expected ValidationFailed, got: {other}"),
            Ok(manifest) => panic!("{file}: accepted as {}", manifest.summary()),
        }
    }
}

#[test]
fn test_every_invalid_fixture_is_covered() {
    let names: Vec<String> = manifest_files(&fixtures_dir().join("invalid"))
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec![
            "file-not-string.json",
            "missing-mods.json",
            "missing-version.json",
            "mod-missing-name.json",
            "mod-missing-source.json",
            "source-not-uri.json",
        ]
    );
}

/// JSON fixtures are written in the layout of the tooling that produced
/// existing manifests; loading and re-serializing must not change a byte.
#[test]
fn test_json_fixtures_round_trip_byte_for_byte() {
    let validator = SchemaValidator::builtin().expect("builtin schema loads");

    for path in manifest_files(&fixtures_dir().join("valid")) {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let original = std::fs::read_to_string(&path).unwrap();
        let manifest = validator.load_manifest(&path).unwrap();
        assert_eq!(
            to_pretty_json(&manifest).unwrap(),
            original,
            "{} changed on re-serialization",
            path.display()
        );
    }
}

#[test]
fn test_yaml_fixture_matches_expected_model() {
    let validator = SchemaValidator::builtin().expect("builtin schema loads");
    let manifest = validator
        .load_manifest(&fixtures_dir().join("valid").join("authored.yaml"))
        .unwrap();

    assert_eq!(manifest.summary(), "2 mods for 1.20.1");
    let lithium = manifest.find("Lithium").unwrap();
    assert_eq!(lithium.file.as_ref().map(|f| f.as_str()), Some("lithium-0.11.2.jar"));
    assert!(manifest.find("Sodium").unwrap().version.is_none());
}

#[test]
fn test_full_fixture_preserves_order_and_unicode() {
    let validator = SchemaValidator::builtin().expect("builtin schema loads");
    let manifest = validator
        .load_manifest(&fixtures_dir().join("valid").join("full.json"))
        .unwrap();

    let names: Vec<&str> = manifest.mods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["SeedcrackerX", "Sodium", "Café Tweaks"]);
    assert_eq!(manifest.mods[2].source.scheme(), "https");
}

#[test]
fn test_extra_keys_fixture_keeps_unknown_properties() {
    let validator = SchemaValidator::builtin().expect("builtin schema loads");
    let manifest = validator
        .load_manifest(&fixtures_dir().join("valid").join("extra-keys.json"))
        .unwrap();

    let keys: Vec<&str> = manifest.extra.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["loader", "notes"]);
    assert_eq!(manifest.extra["notes"]["author"], "Renée");
    // Both sources are RFC 3986 URIs that a WHATWG parser refuses.
    assert!(manifest.mods.iter().all(|m| m.source.url().is_none()));
}
