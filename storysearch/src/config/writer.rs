//! INI serialization logic for converting `ConfigFile` → INI string.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[dispatcher]
; Drop results whose request was cancelled after the fetch finished
; but before the callback ran (true/false)
recheck_before_delivery = {}

[fixtures]
; Stories per page served by the fixture repository
page_size = {}
; Simulated latency of each search in milliseconds
latency_ms = {}

[logging]
; Log file location
file = {}
"#,
        config.dispatcher.recheck_before_delivery,
        config.fixtures.page_size,
        config.fixtures.latency_ms,
        config.logging.file.to_string_lossy(),
    )
}
