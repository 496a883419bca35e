//! CLI runner for common setup.
//!
//! Encapsulates config loading and logging initialization.

use crate::error::CliError;
use std::path::Path;
use storysearch::config::ConfigFile;
use storysearch::dispatch::DispatcherConfig;
use storysearch::logging::{init_logging, LoggingGuard};
use tracing::info;

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// Without an explicit path, a default ~/.storysearch/config.ini is
    /// written on first run.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to load instead of ~/.storysearch/config.ini
    /// * `debug_mode` - When true, enables debug-level logging (also mirrored
    ///   to stdout) regardless of RUST_LOG
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        // An explicit path is used as is; missing keys or file mean defaults
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => {
                ConfigFile::ensure_exists()?;
                ConfigFile::load()?
            }
        };

        // Results go to stdout, so log lines only join them when debugging
        let logging_guard = init_logging(&config.logging.file, debug_mode, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Dispatcher settings from the config file.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig::from(&self.config.dispatcher)
    }

    /// Log startup information.
    pub fn log_startup(&self) {
        info!("storysearch v{}", storysearch::VERSION);
        info!(
            log_file = %self.config.logging.file.display(),
            recheck_before_delivery = self.config.dispatcher.recheck_before_delivery,
            "Configuration loaded"
        );
    }
}
