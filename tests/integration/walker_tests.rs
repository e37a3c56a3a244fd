use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use vidupe::scanner::classifier::Entry;
use vidupe::scanner::{
    Classification, PathClassifier, ScanError, SkipReason, VideoFile, Walker, WalkerConfig,
};

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"data").unwrap();
}

fn walk(roots: Vec<PathBuf>, exclude: &[PathBuf]) -> (Vec<VideoFile>, Vec<ScanError>) {
    let walker = Walker::new(
        roots,
        PathClassifier::with_defaults(exclude),
        WalkerConfig::default(),
    );
    let mut videos = Vec::new();
    let mut errors = Vec::new();
    for item in walker.walk() {
        match item {
            Ok(v) => videos.push(v),
            Err(e) => errors.push(e),
        }
    }
    (videos, errors)
}

#[test]
fn test_excluded_prefix_never_video() {
    let root = Path::new("/media");
    let classifier = PathClassifier::with_defaults(&[PathBuf::from("/media/tmp")]);

    for name in ["clip.mp4", "clip.MKV", "deep/nested/clip.avi"] {
        let path = Path::new("/media/tmp").join(name);
        assert_eq!(
            classifier.classify(&Entry::file(&path, root)),
            Classification::NotVideo,
            "{} should be excluded",
            path.display()
        );
    }
    assert_eq!(
        classifier.classify(&Entry::file(Path::new("/media/keep/clip.mp4"), root)),
        Classification::Video
    );
    assert_eq!(
        classifier.classify(&Entry::directory(Path::new("/media/tmp"), root, true)),
        Classification::SkipDirectory(SkipReason::Excluded)
    );
}

#[test]
fn test_reserved_directories_not_descended() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("lost+found/show.mp4"));
    touch(&dir.path().join(".hidden/show.mp4"));
    touch(&dir.path().join("$RECYCLE.BIN/show.mp4"));
    touch(&dir.path().join("System Volume Information/show.mp4"));
    touch(&dir.path().join("visible/show.mp4"));

    let (videos, errors) = walk(vec![dir.path().to_path_buf()], &[]);
    assert!(errors.is_empty());
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].path, dir.path().join("visible/show.mp4"));
}

#[test]
fn test_non_video_files_ignored() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.mp4"));
    touch(&dir.path().join("b.txt"));
    touch(&dir.path().join("c.MOV"));
    touch(&dir.path().join("noext"));

    let (videos, _) = walk(vec![dir.path().to_path_buf()], &[]);
    let names: Vec<_> = videos.iter().map(|v| v.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.mp4", "c.MOV"]);
    assert_eq!(videos[1].extension, ".mov");
}

#[test]
fn test_roots_walked_in_order() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("second/a.mp4"));
    touch(&dir.path().join("first/z.mp4"));

    let (videos, _) = walk(
        vec![dir.path().join("second"), dir.path().join("first")],
        &[],
    );
    let paths: Vec<_> = videos.iter().map(|v| v.path.clone()).collect();
    assert_eq!(
        paths,
        vec![dir.path().join("second/a.mp4"), dir.path().join("first/z.mp4")]
    );
}

#[test]
fn test_nested_root_not_walked_twice() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("sub/show.mp4"));

    let (videos, errors) = walk(
        vec![dir.path().to_path_buf(), dir.path().join("sub")],
        &[],
    );
    assert!(errors.is_empty());
    assert_eq!(videos.len(), 1);
}

#[test]
fn test_bad_roots_reported() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("file.mp4"));

    let (videos, errors) = walk(
        vec![dir.path().join("missing"), dir.path().join("file.mp4")],
        &[],
    );
    assert!(videos.is_empty());
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], ScanError::RootNotFound(_)));
    assert!(matches!(errors[1], ScanError::NotADirectory(_)));
}

#[test]
fn test_sizes_recorded() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("clip.mp4"), vec![0u8; 4096]).unwrap();

    let (videos, _) = walk(vec![dir.path().to_path_buf()], &[]);
    assert_eq!(videos[0].size, Some(4096));
}
