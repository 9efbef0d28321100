//! Fingerprint Operation Integration Tests
//!
//! Verifies request ordering, digest content, and the stop-at-first-failure
//! contract of `ArtifactRecord::record_fingerprints`.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use uuid::Uuid;

use armory::adapters::mock::MockFingerprintStore;
use armory::core::sha256_hex;
use armory::domain::artifact::DESCRIPTOR_PACKAGING;
use armory::{Artifact, ArtifactRecord, BuildRef, ModuleSetBuildRef};

fn build_at(archive_root: &Path) -> BuildRef {
    BuildRef {
        id: Uuid::new_v4(),
        number: 5,
        module_name: "core".to_string(),
        archive_root: archive_root.to_path_buf(),
        url: "job/core/5/".to_string(),
        module_set: ModuleSetBuildRef::new("3.9.6", "job/acme/5/"),
    }
}

fn descriptor() -> Artifact {
    Artifact::new(
        "com.acme",
        "core",
        "1.4.0",
        DESCRIPTOR_PACKAGING,
        "project.yaml",
        "project.yaml",
    )
}

fn main_artifact() -> Artifact {
    Artifact::new(
        "com.acme",
        "core",
        "1.4.0",
        "lib",
        "core-1.4.0.lib",
        "core-1.4.0.lib",
    )
}

fn attached(classifier: &str) -> Artifact {
    let file = format!("core-1.4.0-{}.lib", classifier);
    Artifact::new("com.acme", "core", "1.4.0", "lib", file.clone(), file)
        .with_classifier(classifier)
}

#[tokio::test]
async fn test_fingerprints_main_then_attached_in_order() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("project.yaml"), b"descriptor").unwrap();
    fs::write(temp.path().join("core-1.4.0.lib"), b"main bytes").unwrap();
    fs::write(temp.path().join("core-1.4.0-a.lib"), b"attached a").unwrap();
    fs::write(temp.path().join("core-1.4.0-b.lib"), b"attached b").unwrap();

    let record = ArtifactRecord::new(
        build_at(temp.path()),
        descriptor(),
        Some(main_artifact()),
        vec![attached("a"), attached("b")],
    );
    let store = MockFingerprintStore::new();

    record.record_fingerprints(&store).await.unwrap();

    let requests = store.requests();
    assert_eq!(requests.len(), 3);

    let files: Vec<_> = requests
        .iter()
        .map(|r| r.file.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        files,
        vec!["core-1.4.0.lib", "core-1.4.0-a.lib", "core-1.4.0-b.lib"]
    );

    // Digests are of the actual file contents
    assert_eq!(requests[0].sha256, sha256_hex(b"main bytes"));
    assert_eq!(requests[1].sha256, sha256_hex(b"attached a"));
}

#[tokio::test]
async fn test_store_failure_stops_the_sequence() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("project.yaml"), b"descriptor").unwrap();
    fs::write(temp.path().join("core-1.4.0.lib"), b"main bytes").unwrap();
    fs::write(temp.path().join("core-1.4.0-a.lib"), b"attached a").unwrap();
    fs::write(temp.path().join("core-1.4.0-b.lib"), b"attached b").unwrap();

    let record = ArtifactRecord::new(
        build_at(temp.path()),
        descriptor(),
        Some(main_artifact()),
        vec![attached("a"), attached("b")],
    );
    let store = MockFingerprintStore::failing_on_request(2);

    let err = record.record_fingerprints(&store).await.unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::Other);
    // Only the main artifact's request got through; the third was never issued
    assert_eq!(store.requests().len(), 1);
}

#[tokio::test]
async fn test_descriptor_only_record_issues_one_request() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("project.yaml"), b"descriptor").unwrap();

    let record = ArtifactRecord::new(build_at(temp.path()), descriptor(), None, vec![]);
    let store = MockFingerprintStore::new();

    record.record_fingerprints(&store).await.unwrap();

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sha256, sha256_hex(b"descriptor"));
}

#[tokio::test]
async fn test_missing_file_propagates_resolution_error() {
    let temp = TempDir::new().unwrap();

    let record = ArtifactRecord::new(
        build_at(temp.path()),
        descriptor(),
        Some(main_artifact()),
        vec![],
    );
    let store = MockFingerprintStore::new();

    let err = record.record_fingerprints(&store).await.unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert!(store.requests().is_empty());
}
