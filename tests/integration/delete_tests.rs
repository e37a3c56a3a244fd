use std::fs;
use std::path::Path;

use tempfile::tempdir;
use vidupe::actions::{DeleteError, DeleteGuard, DeleteMode};
use vidupe::config::Config;
use vidupe::engine::{ScanEngine, ScanRequest};

fn touch(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn guarded_engine() -> ScanEngine {
    ScanEngine::new(Config {
        delete_guard: DeleteGuard::KnownResultsOnly,
        ..Config::default()
    })
}

#[test]
fn test_delete_duplicate_then_rescan() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("x/show.mp4");
    let drop = dir.path().join("y/show.mp4");
    touch(&keep, b"same");
    touch(&drop, b"same");

    let engine = ScanEngine::new(Config::default());
    let request = ScanRequest::new(vec![dir.path().to_path_buf()], Vec::new(), true);
    let report = engine.start_scan(request.clone()).unwrap().wait().unwrap();
    assert_eq!(report.sets.len(), 1);

    let result = engine.delete_path(&drop).unwrap();
    assert_eq!(result.size, 4);
    assert_eq!(result.mode, DeleteMode::Permanent);
    assert!(!drop.exists());
    assert!(keep.exists());

    // Results are only refreshed by a scan.
    assert!(engine.results()[0].contains(&drop));
    let rescan = engine.start_scan(request).unwrap().wait().unwrap();
    assert!(rescan.sets.is_empty());
    assert!(engine.results().is_empty());
}

#[test]
fn test_guard_rejects_before_any_scan() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("show.mp4");
    touch(&path, b"data");

    let err = guarded_engine().delete_path(&path).unwrap_err();
    assert!(matches!(err, DeleteError::NotInResults(_)));
    assert!(path.exists());
}

#[test]
fn test_guard_accepts_result_members_only() {
    let dir = tempdir().unwrap();
    let member = dir.path().join("a/show.mp4");
    let unique = dir.path().join("a/solo.mp4");
    touch(&member, b"1");
    touch(&dir.path().join("b/show.mp4"), b"2");
    touch(&unique, b"3");

    let engine = guarded_engine();
    engine
        .start_scan(ScanRequest::new(vec![dir.path().to_path_buf()], Vec::new(), false))
        .unwrap()
        .wait()
        .unwrap();

    let err = engine.delete_path(&unique).unwrap_err();
    assert!(matches!(err, DeleteError::NotInResults(_)));
    assert!(unique.exists());

    engine.delete_path(&member).unwrap();
    assert!(!member.exists());
}

#[test]
fn test_unguarded_delete_of_missing_file() {
    let dir = tempdir().unwrap();
    let engine = ScanEngine::new(Config::default());
    let err = engine.delete_path(&dir.path().join("nope.mkv")).unwrap_err();
    assert!(matches!(err, DeleteError::NotFound(_)));
}

#[test]
fn test_delete_refuses_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("show.mp4");
    fs::create_dir(&sub).unwrap();

    let engine = ScanEngine::new(Config::default());
    let err = engine.delete_path(&sub).unwrap_err();
    assert!(matches!(err, DeleteError::NotAFile(_)));
    assert!(sub.is_dir());
}
