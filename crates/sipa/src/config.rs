//! Configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sipa_component::AppConfig;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// URL of the document apps render into
    pub document_url: String,
    /// Destroy children whose alias a re-render no longer produces
    pub prune_orphaned_children: bool,
    /// Reject custom triggers outside a class's declared events
    pub validate_custom_triggers: bool,
    pub log: LogConfig,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        let app = AppConfig::default();
        Self {
            document_url: "about:blank".into(),
            prune_orphaned_children: app.prune_orphaned_children,
            validate_custom_triggers: app.validate_custom_triggers,
            log: LogConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Component-layer switches
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            prune_orphaned_children: self.prune_orphaned_children,
            validate_custom_triggers: self.validate_custom_triggers,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `"warn,sipa_component=debug"`
    pub filter: String,
    /// Print the event target with each line
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".into(),
            with_target: false,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// File backing local storage; session storage when absent
    pub local_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "log": { "filter": "debug" } }"#).unwrap();
        assert_eq!(config.log.filter, "debug");
        assert!(!config.log.with_target);
        assert_eq!(config.document_url, "about:blank");
        assert!(config.prune_orphaned_children);
        assert_eq!(config.storage.local_path, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "prune_children": false }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut config = Config::default();
        config.validate_custom_triggers = false;
        config.storage.local_path = Some(PathBuf::from("/tmp/sipa.json"));

        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&text).unwrap(), config);
    }
}
