//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [dispatcher] section
    if let Some(section) = ini.section(Some("dispatcher")) {
        if let Some(v) = section.get("recheck_before_delivery") {
            config.dispatcher.recheck_before_delivery = parse_bool(v);
        }
    }

    // [fixtures] section
    if let Some(section) = ini.section(Some("fixtures")) {
        if let Some(v) = section.get("page_size") {
            config.fixtures.page_size = match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(invalid(
                        "fixtures",
                        "page_size",
                        v,
                        "must be a positive integer",
                    ))
                }
            };
        }
        if let Some(v) = section.get("latency_ms") {
            config.fixtures.latency_ms = v
                .trim()
                .parse()
                .map_err(|_| {
                    invalid(
                        "fixtures",
                        "latency_ms",
                        v,
                        "must be a whole number of milliseconds",
                    )
                })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Lenient boolean: `true`, `1`, `yes`, `on` (any case) are true.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_is_default() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_all_sections() {
        let config = parse(
            "[dispatcher]\nrecheck_before_delivery = off\n\
             [fixtures]\npage_size = 5\nlatency_ms = 250\n\
             [logging]\nfile = /tmp/ss.log\n",
        )
        .unwrap();

        assert!(!config.dispatcher.recheck_before_delivery);
        assert_eq!(config.fixtures.page_size, 5);
        assert_eq!(config.fixtures.latency_ms, 250);
        assert_eq!(config.logging.file, PathBuf::from("/tmp/ss.log"));
    }

    #[test]
    fn test_invalid_latency() {
        let err = parse("[fixtures]\nlatency_ms = soon\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: fixtures.latency_ms = 'soon' - must be a whole number of milliseconds"
        );
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "TRUE", "1", "yes", "On"] {
            assert!(parse_bool(v), "{v} should be true");
        }
        for v in ["false", "0", "no", "off", ""] {
            assert!(!parse_bool(v), "{v} should be false");
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x.log"), home.join("x.log"));
        }
    }
}
