//! Logging setup for the vidupe binary.
//!
//! The library only uses the `log` facade; this module installs the
//! `env_logger` backend. Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. `log_level` from the configuration
//! 4. Default: info level
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: timestamp and level, plus the module path when verbose
//! - **Release builds**: compact `LEVEL message` lines
//!
//! # Example
//!
//! ```rust,no_run
//! use vidupe::logging::init_logging;
//!
//! // -v, nothing configured
//! init_logging(1, false, None);
//! log::debug!("visible");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem.
///
/// Call once, before any log output matters. A second call is ignored
/// with a debug message instead of panicking.
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - Only show errors (overridden by `RUST_LOG`)
/// * `configured` - Level from the configuration file, if any
pub fn init_logging(verbose: u8, quiet: bool, configured: Option<LevelFilter>) {
    let use_env = env::var("RUST_LOG").is_ok();
    let level = determine_level(verbose, quiet, configured);

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }
    configure_format(&mut builder, verbose);

    if let Err(e) = builder.try_init() {
        log::debug!("Logger already initialized: {}", e);
        return;
    }

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!("Logging initialized at level: {:?}", level);
    }
}

fn determine_level(verbose: u8, quiet: bool, configured: Option<LevelFilter>) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => configured.unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}
