use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::tempdir;
use vidupe::cli::Cli;
use vidupe::config::Config;
use vidupe::error::ExitCode;
use vidupe::run_app;

fn touch(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Runs the app against an empty config file so user settings never leak in.
fn run(dir: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
    let config = dir.join("vidupe.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut argv = vec!["vidupe", "-q", "--no-color", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_scan_exit_codes() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    touch(&media.join("x/show.mp4"), b"1");
    touch(&media.join("y/show.mp4"), b"2");
    touch(&media.join("z/other.mkv"), b"3");
    let media = media.to_str().unwrap();

    assert_eq!(run(dir.path(), &["scan", media]).unwrap(), ExitCode::Success);
    assert_eq!(
        run(dir.path(), &["scan", media, "--content", "-o", "json"]).unwrap(),
        ExitCode::NoDuplicates
    );

    let missing = dir.path().join("missing");
    assert_eq!(
        run(dir.path(), &["scan", media, missing.to_str().unwrap()]).unwrap(),
        ExitCode::PartialSuccess
    );
}

#[test]
fn test_delete_command() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("show.mp4");
    touch(&target, b"bytes");

    assert_eq!(
        run(dir.path(), &["delete", target.to_str().unwrap()]).unwrap(),
        ExitCode::Success
    );
    assert!(!target.exists());

    let err = run(dir.path(), &["delete", target.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().starts_with("Failed to delete"));
}

#[test]
fn test_config_write_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh/config.toml");
    let cli = Cli::try_parse_from([
        "vidupe",
        "-q",
        "config",
        "--write",
        "--config",
        path.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(run_app(cli).unwrap(), ExitCode::Success);
    let written = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(written.io_threads, Config::default().io_threads);
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let cli = Cli::try_parse_from(["vidupe", "--config", path.to_str().unwrap(), "scan", "."])
        .unwrap();
    let err = run_app(cli).unwrap_err();
    assert_eq!(err.to_string(), "Failed to load configuration");
}
