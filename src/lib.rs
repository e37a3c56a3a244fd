//! Vidupe - duplicate video finder
//!
//! Walks one or more roots for video files, groups them by a name-derived
//! key and, optionally, confirms each group by hashing full contents with
//! BLAKE3. Scans run on a background worker; the [`engine::ScanEngine`]
//! exposes status snapshots while it runs and the latest complete result
//! set afterwards.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use bytesize::ByteSize;

use crate::actions::DeleteMode;
use crate::cli::{Cli, Commands, ConfigArgs, DeleteArgs, OutputFormat, ScanArgs};
use crate::config::{Config, ConfigError};
use crate::engine::{ScanEngine, ScanRequest};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::ScanProgress;

/// Terminal-facing settings shared by the subcommands.
struct Console {
    verbose: u8,
    quiet: bool,
    color: bool,
    accessible: bool,
}

/// Run the CLI application.
///
/// # Errors
///
/// Returns any configuration, scan, delete or output error.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let Cli {
        verbose,
        quiet,
        no_color,
        accessible,
        config: config_path,
        command,
        ..
    } = cli;

    let config = load_config(config_path.as_deref(), &command)?;
    logging::init_logging(verbose, quiet, config.log_level_filter());
    if !config.log_level.is_empty() && config.log_level_filter().is_none() {
        log::warn!("Ignoring unknown log level '{}'", config.log_level);
    }

    if no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }
    let console = Console {
        verbose,
        quiet,
        color: yansi::is_enabled(),
        accessible,
    };

    match command {
        Commands::Scan(args) => run_scan(config, args, &console),
        Commands::Delete(args) => run_delete(config, &args, &console),
        Commands::Config(args) => run_config(&config, &args, config_path),
    }
}

/// A `config --write` to a file that does not exist yet starts from defaults.
fn load_config(path: Option<&std::path::Path>, command: &Commands) -> Result<Config> {
    if let (Commands::Config(ConfigArgs { write: true }), Some(p)) = (command, path) {
        if !p.exists() {
            return Config::load(None).context("Failed to load configuration");
        }
    }
    Config::load(path).context("Failed to load configuration")
}

fn run_scan(mut config: Config, args: ScanArgs, console: &Console) -> Result<ExitCode> {
    let content_verify = args.content_override();
    if let Some(policy) = args.key_policy {
        config.key_policy = policy;
    }
    if let Some(threads) = args.io_threads {
        config.io_threads = threads.max(1);
    }
    if args.follow_symlinks {
        config.follow_symlinks = true;
    }

    let mut roots = args.paths;
    if roots.is_empty() && config.scan_paths.is_empty() {
        roots.push(PathBuf::from("."));
    }

    let engine = ScanEngine::new(config);
    let handle = engine.start_scan(ScanRequest {
        roots,
        exclude: args.exclude,
        content_verify,
    })?;

    let show_progress =
        !console.quiet && args.output == OutputFormat::Text && io::stderr().is_terminal();
    let mut progress = ScanProgress::with_accessible(!show_progress, console.accessible);
    while !handle.is_finished() {
        progress.update(&engine.status());
        thread::sleep(progress.poll_interval());
    }
    progress.finish(&engine.status());

    let report = handle.wait().context("Scan failed")?;
    let exit_code = ExitCode::for_report(&report);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&report)
            .with_color(console.color)
            .with_skipped_details(console.verbose > 0)
            .write_to(&mut out)
            .context("Failed to write results")?,
        OutputFormat::Json => JsonOutput::new(&report, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write results")?,
    }
    out.flush().context("Failed to write results")?;

    Ok(exit_code)
}

fn run_delete(mut config: Config, args: &DeleteArgs, console: &Console) -> Result<ExitCode> {
    if args.trash {
        config.delete_mode = DeleteMode::Trash;
    }

    let engine = ScanEngine::new(config);
    let result = engine
        .delete_path(&args.path)
        .with_context(|| format!("Failed to delete {}", args.path.display()))?;

    if !console.quiet {
        let verb = match result.mode {
            DeleteMode::Permanent => "Deleted",
            DeleteMode::Trash => "Moved to trash",
        };
        println!(
            "{}: {} ({})",
            verb,
            result.path.display(),
            ByteSize::b(result.size)
        );
    }
    Ok(ExitCode::Success)
}

fn run_config(config: &Config, args: &ConfigArgs, path: Option<PathBuf>) -> Result<ExitCode> {
    if args.write {
        let path = match path {
            Some(p) => p,
            None => Config::default_path().ok_or(ConfigError::NoConfigDir)?,
        };
        config
            .save(&path)
            .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
        println!("Configuration written to {}", path.display());
    } else {
        print!("{}", config.to_toml().context("Failed to render configuration")?);
    }
    Ok(ExitCode::Success)
}
