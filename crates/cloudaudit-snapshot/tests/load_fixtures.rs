//! Integration tests for snapshot loading over the shared fixtures.

use camino::{Utf8Path, Utf8PathBuf};
use cloudaudit_domain::cache::{CacheReader, Lookup};
use cloudaudit_snapshot::{MALFORMED_CODE, discover_snapshot_files, load_snapshot};
use cloudaudit_types::CachePath;
use std::path::PathBuf;

/// Get the path to the test fixtures directory (repo root / tests / fixtures).
fn fixtures_dir() -> Utf8PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/cloudaudit-snapshot -> crates -> repo root
    let repo_root = manifest_dir
        .parent()
        .expect("cloudaudit-snapshot should have parent (crates)")
        .parent()
        .expect("crates should have parent (repo root)");
    Utf8PathBuf::from_path_buf(repo_root.join("tests").join("fixtures"))
        .expect("fixture path should be valid UTF-8")
}

fn snapshot_path(fixture: &Utf8Path) -> Utf8PathBuf {
    let file = fixture.join("snapshot.json");
    if file.is_file() {
        file
    } else {
        fixture.join("snapshot")
    }
}

#[test]
fn every_fixture_loads_with_expected_malformed_count() {
    let root = fixtures_dir();
    let mut seen = 0;
    for entry in std::fs::read_dir(&root).expect("read fixtures") {
        let dir = Utf8PathBuf::from_path_buf(entry.expect("entry").path()).expect("utf8");
        if !dir.is_dir() {
            continue;
        }
        let expected: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.join("expected.json")).expect("read expected.json"),
        )
        .expect("parse expected.json");

        let snapshot = load_snapshot(&snapshot_path(&dir))
            .unwrap_or_else(|err| panic!("load {dir}: {err:#}"));
        assert!(!snapshot.cache.is_empty(), "{dir} has entries");
        assert_eq!(
            snapshot.malformed as u64,
            expected["malformed"].as_u64().expect("malformed"),
            "malformed count for {dir}"
        );
        seen += 1;
    }
    assert!(seen >= 6, "fixtures found: {seen}");
}

#[test]
fn sharded_fixture_is_discovered_in_order() {
    let dir = fixtures_dir().join("sharded").join("snapshot");
    let names: Vec<String> = discover_snapshot_files(&dir)
        .expect("discover shards")
        .iter()
        .filter_map(|p| p.file_name().map(str::to_string))
        .collect();
    assert_eq!(names, vec!["identity.json", "us-east-1.json"]);

    let snapshot = load_snapshot(&dir).expect("load");
    assert_eq!(snapshot.files.len(), 2);
    assert!(matches!(
        snapshot
            .cache
            .get(&CachePath::region("sts", "getCallerIdentity", "us-east-1")),
        Lookup::Ready(_)
    ));
}

#[test]
fn malformed_fixture_entry_is_an_upstream_error() {
    let snapshot =
        load_snapshot(&fixtures_dir().join("malformed").join("snapshot.json")).expect("load");
    match snapshot
        .cache
        .get(&CachePath::region("opensearch", "listDomainNames", "us-east-1"))
    {
        Lookup::Failed(err) => assert_eq!(err.code.as_deref(), Some(MALFORMED_CODE)),
        other => panic!("expected failure, got {other:?}"),
    }
}
