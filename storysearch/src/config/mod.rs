//! Configuration file for storysearch.
//!
//! User settings live in `~/.storysearch/config.ini`:
//!
//! ```ini
//! [dispatcher]
//! recheck_before_delivery = true
//!
//! [fixtures]
//! page_size = 10
//! latency_ms = 50
//!
//! [logging]
//! file = ~/.storysearch/storysearch.log
//! ```
//!
//! Settings structs live in `settings`, constants in `defaults`, parsing
//! in `parser` and serialization in `writer`. Missing files and missing keys
//! fall back to defaults.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DispatcherSettings, FixtureSettings, LoggingSettings};
