use crate::db::ReadMode;
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid repository config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// RepoConfig
///
/// Per-session settings. Missing keys take their defaults; unknown keys
/// are rejected.
///
/// ```toml
/// debug = true
/// default_read_mode = "readonly"
/// metrics = false
/// ```
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Emit `tracing` debug records for repository calls.
    pub debug: bool,
    /// Read mode used by `get` and `all`.
    pub default_read_mode: ReadMode,
    /// Record metrics events for this session.
    pub metrics: bool,
}

impl RepoConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_read_mode: ReadMode::Tracked,
            metrics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = RepoConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, RepoConfig::default());
    }

    #[test]
    fn partial_source_overrides_named_keys_only() {
        let config = RepoConfig::from_toml_str("debug = true\ndefault_read_mode = \"readonly\"\n")
            .expect("config should parse");

        assert!(config.debug);
        assert_eq!(config.default_read_mode, ReadMode::Readonly);
        assert!(config.metrics);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RepoConfig::from_toml_str("tracing = true").expect_err("unknown key must fail");

        assert!(err.to_string().contains("tracing"), "{err}");
    }

    #[test]
    fn bad_read_mode_is_rejected() {
        RepoConfig::from_toml_str("default_read_mode = \"sometimes\"")
            .expect_err("unknown read mode must fail");
    }
}
