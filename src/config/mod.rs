//! # Bootstrap Configuration
//!
//! The declarative input of gridboot: free-form engine properties, engine
//! logging settings and the session lists grouped by subsystem.
//!
//! ```toml
//! [properties]
//! "engine.cluster" = "orders"
//!
//! [logging]
//! destination = "slf4j"
//! character_limit = 123
//!
//! [[sessions.server]]
//! name = "default"
//! config = "cache-config.xml"
//! scope_name = "fooscope"
//! priority = 1
//!
//! [[sessions.client]]
//! config = "client-config.xml"
//! ```

pub mod logging;

pub use logging::*;

use crate::env::properties;
use crate::session::{SessionDescriptor, SessionGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),
}

/// Top-level configuration tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Native engine properties, passed through verbatim
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// Session declarations grouped by subsystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server: Vec<SessionEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub client: Vec<SessionEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grpc: Vec<SessionEntry>,
}

/// One session entry as written in a group list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub config: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl SessionEntry {
    fn to_descriptor(&self, group: SessionGroup) -> SessionDescriptor {
        SessionDescriptor {
            name: self.name.clone(),
            config_locator: self.config.clone(),
            scope_name: self.scope_name.clone(),
            priority: self.priority,
            group: group.as_str().to_string(),
        }
    }
}

impl SessionsConfig {
    pub fn entries(&self, group: SessionGroup) -> &[SessionEntry] {
        match group {
            SessionGroup::Server => &self.server,
            SessionGroup::Client => &self.client,
            SessionGroup::Grpc => &self.grpc,
        }
    }

    /// Flatten into descriptors: server entries, then client, then grpc
    pub fn descriptors(&self) -> Vec<SessionDescriptor> {
        SessionGroup::ALL
            .iter()
            .flat_map(|group| self.entries(*group).iter().map(|e| e.to_descriptor(*group)))
            .collect()
    }
}

impl BootstrapConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BootstrapConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(logging) = &self.logging {
            logging.validate()?;
            for placeholder in logging.unknown_placeholders() {
                warn!("Unknown log message format placeholder: {{{}}}", placeholder);
            }
        }
        Ok(())
    }

    pub fn descriptors(&self) -> Vec<SessionDescriptor> {
        self.sessions.descriptors()
    }

    /// Engine properties: raw properties plus the logging projection
    ///
    /// Structured logging fields take precedence over raw properties with
    /// the same key.
    pub fn engine_properties(&self) -> EngineProperties {
        let mut merged: BTreeMap<String, String> = self
            .properties
            .iter()
            .map(|(k, v)| (properties::namespaced(k), v.clone()))
            .collect();

        if let Some(logging) = &self.logging {
            merged.extend(logging.to_properties());
        }

        EngineProperties(merged)
    }
}

/// Namespaced property map handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineProperties(BTreeMap<String, String>);

impl EngineProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a native key under the namespace
    pub fn insert(&mut self, native_key: &str, value: impl Into<String>) {
        self.0.insert(properties::namespaced(native_key), value.into());
    }

    /// Look up a native key
    pub fn get(&self, native_key: &str) -> Option<&str> {
        self.0
            .get(&properties::namespaced(native_key))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Namespaced entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries with the namespace stripped, as the engine reads them
    pub fn native(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(properties::NAMESPACE)
                    .map(|native| (native.to_string(), v.clone()))
            })
            .collect()
    }
}

impl From<BTreeMap<String, String>> for EngineProperties {
    fn from(native: BTreeMap<String, String>) -> Self {
        let mut props = EngineProperties::new();
        for (k, v) in native {
            props.insert(&k, v);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURE: &str = r#"
[properties]
"engine.log.limit" = "444"
"engine.log.level" = "1"
"engine.log.logger" = "GridBoot"
"engine.log" = "log4j"
"engine.log.format" = "foobar"

[logging]
destination = "slf4j"
logger_name = "testing"
message_format = "Testing: {date}/{uptime} {product} {version} <{level}> (thread={thread}, member={member}): {text}"
character_limit = 123

[[sessions.server]]
name = "default"
config = "coherence-cache-config.xml"
scope_name = "fooscope"
priority = 1

[[sessions.server]]
name = "test"
config = "test-coherence-config.xml"
scope_name = "barscope"
priority = 2

[[sessions.server]]
config = "test-coherence-config.xml"
scope_name = "myscope"

[[sessions.client]]
name = "remote"
config = "client-config.xml"
"#;

    #[test]
    fn test_parse_fixture() {
        let config = BootstrapConfig::from_toml_str(FIXTURE).unwrap();

        assert_eq!(config.properties.len(), 5);
        assert_eq!(config.properties["engine.log.limit"], "444");
        assert_eq!(config.properties["engine.log"], "log4j");

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging.character_limit, Some(123));
        assert_eq!(logging.destination, Some(LogDestination::Slf4j));
        assert_eq!(logging.logger_name.as_deref(), Some("testing"));

        assert_eq!(config.sessions.server.len(), 3);
        assert_eq!(config.sessions.server[2].name, None);
        assert_eq!(config.sessions.server[2].priority, None);
        assert_eq!(config.sessions.client.len(), 1);
        assert!(config.sessions.grpc.is_empty());
    }

    #[test]
    fn test_descriptors_are_flattened_by_group() {
        let config = BootstrapConfig::from_toml_str(FIXTURE).unwrap();
        let descriptors = config.descriptors();

        assert_eq!(descriptors.len(), 4);
        assert_eq!(descriptors[0].group, "server");
        assert_eq!(descriptors[0].config_locator, "coherence-cache-config.xml");
        assert_eq!(descriptors[3].group, "client");
        assert_eq!(descriptors[3].name.as_deref(), Some("remote"));
    }

    #[test]
    fn test_engine_properties_logging_wins() {
        let config = BootstrapConfig::from_toml_str(FIXTURE).unwrap();
        let props = config.engine_properties();

        // 5 raw keys; logging overrides 4 of them, level stays raw
        assert_eq!(props.len(), 5);
        assert_eq!(props.get("engine.log"), Some("slf4j"));
        assert_eq!(props.get("engine.log.limit"), Some("123"));
        assert_eq!(props.get("engine.log.logger"), Some("testing"));
        assert_eq!(props.get("engine.log.level"), Some("1"));

        let native = props.native();
        assert_eq!(native["engine.log"], "slf4j");
        assert!(native.keys().all(|k| !k.starts_with(properties::NAMESPACE)));
    }

    #[test]
    fn test_invalid_severity_is_rejected() {
        let content = "[logging]\nseverity_level = 12\n";
        let result = BootstrapConfig::from_toml_str(content);
        assert!(matches!(result, Err(ConfigError::InvalidLogging(_))));
    }

    #[test]
    fn test_negative_character_limit_fails_to_parse() {
        let content = "[logging]\ncharacter_limit = -5\n";
        assert!(matches!(
            BootstrapConfig::from_toml_str(content),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = BootstrapConfig::from_toml_str("").unwrap();
        assert_eq!(config, BootstrapConfig::default());
        assert!(config.descriptors().is_empty());
        assert!(config.engine_properties().is_empty());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gridboot.toml");

        let original = BootstrapConfig::from_toml_str(FIXTURE).unwrap();
        original.to_toml_file(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = BootstrapConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = BootstrapConfig::from_toml_file("does-not-exist.toml").unwrap_err();
        assert!(err.to_string().contains("does-not-exist.toml"));
    }
}
