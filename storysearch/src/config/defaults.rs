//! Default values for all configuration settings.

use super::file::config_directory;
use super::settings::*;
use crate::dispatch::DEFAULT_RECHECK_BEFORE_DELIVERY;

/// Default stories per fixture page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default simulated search latency in milliseconds.
pub const DEFAULT_LATENCY_MS: u64 = 50;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "storysearch.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherSettings::default(),
            fixtures: FixtureSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            recheck_before_delivery: DEFAULT_RECHECK_BEFORE_DELIVERY,
        }
    }
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(DEFAULT_LOG_FILE_NAME),
        }
    }
}
