//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Dispatcher behaviour
    pub dispatcher: DispatcherSettings,
    /// Fixture repository used by the CLI
    pub fixtures: FixtureSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[dispatcher]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// Re-check cancellation right before a callback runs
    pub recheck_before_delivery: bool,
}

/// `[fixtures]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSettings {
    /// Stories per page
    pub page_size: usize,
    /// Simulated latency of each search, in milliseconds
    pub latency_ms: u64,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
