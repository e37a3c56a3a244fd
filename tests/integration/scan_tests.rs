use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use tempfile::tempdir;
use vidupe::config::Config;
use vidupe::duplicates::{DuplicateSet, KeyPolicy};
use vidupe::engine::{
    EngineError, ScanEngine, ScanObserver, ScanPlan, ScanReport, ScanRequest, ScanState,
};

fn touch(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scan(engine: &ScanEngine, roots: Vec<PathBuf>, content: bool) -> ScanReport {
    engine
        .start_scan(ScanRequest::new(roots, Vec::new(), content))
        .unwrap()
        .wait()
        .unwrap()
}

fn file_names(set: &DuplicateSet) -> BTreeSet<String> {
    set.files.iter().map(|f| f.file_name.clone()).collect()
}

#[test]
fn test_end_to_end_show_scenario() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    touch(&media.join("x/show.mp4"), b"first");
    touch(&media.join("y/show.mp4"), b"second");
    touch(&media.join("z/other.mkv"), b"third");

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![media.clone()], false);

    let results = engine.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "show");
    assert_eq!(
        results[0].paths(),
        vec![media.join("x/show.mp4"), media.join("y/show.mp4")]
    );
    assert!(!results.iter().any(|s| s.contains(&media.join("z/other.mkv"))));

    assert_eq!(report.status.total_files_seen, 3);
    assert_eq!(engine.status().state, ScanState::Idle);
    assert!(engine.status().last_scan.is_some());
}

#[test]
fn test_stem_grouping_across_extensions() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.mp4"), b"1");
    touch(&dir.path().join("a.mkv"), b"2");
    touch(&dir.path().join("b.mp4"), b"3");

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![dir.path().to_path_buf()], false);

    assert_eq!(report.sets.len(), 1);
    let expected: BTreeSet<String> = ["a.mkv", "a.mp4"].iter().map(|s| s.to_string()).collect();
    assert_eq!(file_names(&report.sets[0]), expected);
    assert!(!report.sets[0].contains(&dir.path().join("b.mp4")));
}

#[test]
fn test_filename_policy_keeps_extensions_apart() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.mp4"), b"1");
    touch(&dir.path().join("a.mkv"), b"2");
    touch(&dir.path().join("sub/a.mp4"), b"3");

    let config = Config {
        key_policy: KeyPolicy::FileName,
        ..Config::default()
    };
    let engine = ScanEngine::new(config);
    let report = scan(&engine, vec![dir.path().to_path_buf()], false);

    assert_eq!(report.key_policy, KeyPolicy::FileName);
    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets[0].name, "a.mp4");
    assert_eq!(report.sets[0].len(), 2);
}

#[test]
fn test_content_refinement() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("d1/movie.mp4"), b"identical bytes");
    touch(&dir.path().join("d2/movie.mp4"), b"identical bytes");
    touch(&dir.path().join("d3/movie.mp4"), b"different bytes");
    let roots = vec![dir.path().to_path_buf()];

    let engine = ScanEngine::new(Config::default());

    let verified = scan(&engine, roots.clone(), true);
    assert!(verified.content_verify);
    assert_eq!(verified.sets.len(), 1);
    assert_eq!(
        verified.sets[0].paths(),
        vec![dir.path().join("d1/movie.mp4"), dir.path().join("d2/movie.mp4")]
    );
    assert!(verified.sets[0].content_hash.is_some());
    assert!(verified.sets[0].id.starts_with("movie_"));

    let by_name = scan(&engine, roots, false);
    assert_eq!(by_name.sets.len(), 1);
    assert_eq!(by_name.sets[0].len(), 3);
    assert!(by_name.sets[0].content_hash.is_none());
}

#[test]
fn test_content_mode_splits_into_several_sets() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a/clip.mp4"), b"one");
    touch(&dir.path().join("b/clip.mp4"), b"two");
    touch(&dir.path().join("c/clip.mp4"), b"one");
    touch(&dir.path().join("d/clip.mp4"), b"two");

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![dir.path().to_path_buf()], true);

    assert_eq!(report.sets.len(), 2);
    assert_eq!(
        report.sets[0].paths(),
        vec![dir.path().join("a/clip.mp4"), dir.path().join("c/clip.mp4")]
    );
    assert_eq!(
        report.sets[1].paths(),
        vec![dir.path().join("b/clip.mp4"), dir.path().join("d/clip.mp4")]
    );
    assert_ne!(report.sets[0].id, report.sets[1].id);
}

#[test]
fn test_configured_content_mode_is_default() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a/movie.mp4"), b"x");
    touch(&dir.path().join("b/movie.mp4"), b"y");

    let config = Config {
        scan_by_content: true,
        ..Config::default()
    };
    let engine = ScanEngine::new(config);
    let report = engine
        .start_scan(ScanRequest {
            roots: vec![dir.path().to_path_buf()],
            ..ScanRequest::default()
        })
        .unwrap()
        .wait()
        .unwrap();

    assert!(report.content_verify);
    assert!(report.sets.is_empty());
}

#[test]
fn test_exclusion_prunes_subtree() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("keep/show.mp4"), b"1");
    touch(&dir.path().join("skip/show.mp4"), b"2");
    touch(&dir.path().join("other/show.mp4"), b"3");

    let engine = ScanEngine::new(Config::default());
    let report = engine
        .start_scan(ScanRequest::new(
            vec![dir.path().to_path_buf()],
            vec![dir.path().join("skip")],
            false,
        ))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(report.status.total_files_seen, 2);
    assert_eq!(report.sets.len(), 1);
    assert!(!report.sets[0].contains(&dir.path().join("skip/show.mp4")));
}

#[test]
fn test_configured_exclusions_merge_with_request() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a/show.mp4"), b"1");
    touch(&dir.path().join("b/show.mp4"), b"2");
    touch(&dir.path().join("c/show.mp4"), b"3");

    let config = Config {
        exclude_paths: vec![dir.path().join("a")],
        ..Config::default()
    };
    let engine = ScanEngine::new(config);
    let report = engine
        .start_scan(ScanRequest::new(
            vec![dir.path().to_path_buf()],
            vec![dir.path().join("b")],
            false,
        ))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(report.status.total_files_seen, 1);
    assert!(report.sets.is_empty());
}

#[test]
fn test_empty_input_is_success() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("notes.txt"), b"not a video");

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![dir.path().to_path_buf()], true);

    assert!(report.sets.is_empty());
    assert!(!report.is_partial());
    assert_eq!(engine.status().state, ScanState::Idle);
    assert!(engine.status().last_error.is_none());
}

#[test]
fn test_no_roots_is_rejected() {
    let engine = ScanEngine::new(Config::default());
    let result = engine.start_scan(ScanRequest::default());
    assert!(matches!(result, Err(EngineError::NoRoots)));
    assert_eq!(engine.status().state, ScanState::Idle);
}

#[test]
fn test_configured_roots_used_when_request_is_empty() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("x/show.mp4"), b"1");
    touch(&dir.path().join("y/show.mp4"), b"2");

    let config = Config {
        scan_paths: vec![dir.path().to_path_buf()],
        ..Config::default()
    };
    let engine = ScanEngine::new(config);
    let report = engine
        .start_scan(ScanRequest::default())
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(report.sets.len(), 1);
}

#[test]
fn test_missing_root_is_partial() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("x/show.mp4"), b"1");
    touch(&dir.path().join("y/show.mp4"), b"2");

    let engine = ScanEngine::new(Config::default());
    let report = scan(
        &engine,
        vec![dir.path().join("does-not-exist"), dir.path().to_path_buf()],
        false,
    );

    assert_eq!(report.sets.len(), 1);
    assert!(report.is_partial());
    assert_eq!(report.status.entries_skipped, 1);
    assert_eq!(engine.status().state, ScanState::Idle);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_does_not_abort() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    touch(&dir.path().join("a/show.mp4"), b"1");
    touch(&dir.path().join("b/show.mp4"), b"2");
    touch(&dir.path().join("locked/show.mp4"), b"3");
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still read the directory.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![dir.path().to_path_buf()], false);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets[0].len(), 2);
    assert!(report.is_partial());
    assert_eq!(engine.status().state, ScanState::Idle);
}

#[cfg(unix)]
#[test]
fn test_hardlinked_and_symlinked_copies_grouped() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    touch(&media.join("x/show.mp4"), b"same");
    fs::create_dir_all(media.join("y")).unwrap();
    fs::hard_link(media.join("x/show.mp4"), media.join("y/show.mp4")).unwrap();
    touch(&media.join("x/clip.mp4"), b"clip");
    fs::create_dir_all(media.join("z")).unwrap();
    std::os::unix::fs::symlink(media.join("x/clip.mp4"), media.join("z/clip.mp4")).unwrap();

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![media.clone()], false);

    assert_eq!(report.sets.len(), 2);
    let show = report.sets.iter().find(|s| s.name == "show").unwrap();
    assert_eq!(
        show.paths(),
        vec![media.join("x/show.mp4"), media.join("y/show.mp4")]
    );
    let clip = report.sets.iter().find(|s| s.name == "clip").unwrap();
    assert_eq!(
        clip.paths(),
        vec![media.join("x/clip.mp4"), media.join("z/clip.mp4")]
    );
    assert_eq!(report.status.total_files_seen, 4);
}

#[test]
fn test_repeated_scans_are_deterministic() {
    let dir = tempdir().unwrap();
    for sub in ["c", "a", "b"] {
        touch(&dir.path().join(sub).join("show.mp4"), sub.as_bytes());
        touch(&dir.path().join(sub).join("film.avi"), sub.as_bytes());
    }

    let engine = ScanEngine::new(Config::default());
    let first = scan(&engine, vec![dir.path().to_path_buf()], false);
    let second = scan(&engine, vec![dir.path().to_path_buf()], false);

    let paths = |report: &ScanReport| -> Vec<Vec<PathBuf>> {
        report.sets.iter().map(DuplicateSet::paths).collect()
    };
    assert_eq!(paths(&first), paths(&second));
    assert_eq!(second.scan_id, first.scan_id + 1);
}

/// Holds the worker inside `on_scan_started` until released.
struct Gate {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
    completed: Mutex<Vec<u64>>,
}

impl ScanObserver for Gate {
    fn on_scan_started(&self, _scan_id: u64, _plan: &ScanPlan) {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
    }

    fn on_scan_completed(&self, report: &ScanReport) {
        self.completed.lock().unwrap().push(report.scan_id);
    }
}

#[test]
fn test_single_flight() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("x/show.mp4"), b"1");
    touch(&dir.path().join("y/show.mp4"), b"2");

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let gate = Arc::new(Gate {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
        completed: Mutex::new(Vec::new()),
    });

    let engine = ScanEngine::new(Config::default());
    engine.subscribe(gate.clone());

    let handle = engine
        .start_scan(ScanRequest::new(vec![dir.path().to_path_buf()], Vec::new(), false))
        .unwrap();
    entered_rx.recv().unwrap();

    assert!(engine.status().is_scanning());
    let second = engine.start_scan(ScanRequest::new(vec![dir.path().join("x")], Vec::new(), true));
    assert!(matches!(second, Err(EngineError::AlreadyScanning)));
    assert!(engine.status().is_scanning());
    assert_eq!(engine.status().scan_id, handle.scan_id());

    release_tx.send(()).unwrap();
    let report = handle.wait().unwrap();
    assert!(!report.content_verify);
    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets[0].len(), 2);
    assert_eq!(*gate.completed.lock().unwrap(), vec![report.scan_id]);

    // A new scan may start once the first has ended.
    release_tx.send(()).unwrap();
    let next = engine
        .start_scan(ScanRequest::new(vec![dir.path().to_path_buf()], Vec::new(), false))
        .unwrap();
    entered_rx.recv().unwrap();
    assert!(next.wait().is_ok());
}

#[test]
fn test_status_counters_after_content_scan() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a/movie.mp4"), b"same");
    touch(&dir.path().join("b/movie.mp4"), b"same");
    touch(&dir.path().join("c/movie.mp4"), b"diff");
    touch(&dir.path().join("c/solo.mkv"), b"solo");

    let engine = ScanEngine::new(Config::default());
    let report = scan(&engine, vec![dir.path().to_path_buf()], true);
    let status = engine.status();

    assert_eq!(status, report.status);
    assert_eq!(status.total_files_seen, 4);
    assert_eq!(status.files_processed, 4);
    assert_eq!(status.candidate_groups, 1);
    assert_eq!(status.files_to_hash, 3);
    assert_eq!(status.files_hashed, 3);
    assert_eq!(status.duplicate_sets_found, 1);
    assert!(status.phase.is_none());
}
