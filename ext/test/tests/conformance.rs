//! Conformance tests that run YAML fixtures against rabnf
//!
//! Run with: cargo test -p rabnf-test --test conformance

#![cfg(feature = "fixtures")]

use rabnf_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the fixtures directory at the workspace root
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);

    // Go up: ext/test -> ext -> workspace root
    let root = ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // root
        .expect("Could not find workspace root");

    root.join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    assert!(
        dir.exists(),
        "Fixtures directory does not exist: {}",
        dir.display()
    );

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    entries.sort();
    assert!(!entries.is_empty(), "No fixtures in {}", dir.display());

    for path in entries {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_terminals() {
    run_fixtures_in_dir(&fixtures_dir().join("01_terminals"));
}

#[test]
fn test_compound() {
    run_fixtures_in_dir(&fixtures_dir().join("02_compound"));
}

#[test]
fn test_core_rules() {
    run_fixtures_in_dir(&fixtures_dir().join("03_core_rules"));
}

#[test]
fn test_references() {
    run_fixtures_in_dir(&fixtures_dir().join("04_references"));
}

#[test]
fn test_config_errors() {
    run_fixtures_in_dir(&fixtures_dir().join("05_config_errors"));
}
