//! Output formatters for scan reports.
//!
//! - [`text`]: human-readable listing for terminals
//! - [`json`]: stable schema for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use vidupe::config::Config;
//! use vidupe::engine::{ScanEngine, ScanRequest};
//! use vidupe::error::ExitCode;
//! use vidupe::output::JsonOutput;
//!
//! let engine = ScanEngine::new(Config::default());
//! let handle = engine
//!     .start_scan(ScanRequest::new(vec![".".into()], Vec::new(), false))
//!     .unwrap();
//! let report = handle.wait().unwrap();
//!
//! let output = JsonOutput::new(&report, ExitCode::for_report(&report));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
