//! Engine logging settings and their projection to engine properties.

use super::ConfigError;
use crate::env::properties;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Placeholders the engine substitutes in a log message format
pub const MESSAGE_FORMAT_PLACEHOLDERS: [&str; 11] = [
    "date", "uptime", "product", "version", "level", "thread", "member", "location", "role",
    "text", "ecid",
];

/// Lowest legal severity level; no messages are emitted
pub const SEVERITY_SILENT: i32 = -1;

/// Highest legal severity level
pub const SEVERITY_MAX: i32 = 9;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_]+)\}").expect("placeholder pattern is valid"));

/// Where the engine sends its log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDestination {
    Stderr,
    Stdout,
    Jdk,
    Log4j,
    Log4j2,
    Slf4j,
}

impl LogDestination {
    /// Value the engine expects for the destination property
    pub fn key(&self) -> &'static str {
        match self {
            LogDestination::Stderr => "stderr",
            LogDestination::Stdout => "stdout",
            LogDestination::Jdk => "jdk",
            LogDestination::Log4j => "log4j",
            LogDestination::Log4j2 => "log4j2",
            LogDestination::Slf4j => "slf4j",
        }
    }
}

/// Engine logging configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging destination, the engine falls back to stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<LogDestination>,

    /// Severity level from -1 (silent) to 9 (most verbose)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_level: Option<i32>,

    /// Logger name within the chosen logging system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger_name: Option<String>,

    /// Message format, may contain the placeholders in [`MESSAGE_FORMAT_PLACEHOLDERS`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_format: Option<String>,

    /// Maximum number of characters the logger processes before discarding; 0 means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_limit: Option<u32>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = self.severity_level
            && !(SEVERITY_SILENT..=SEVERITY_MAX).contains(&level)
        {
            return Err(ConfigError::InvalidLogging(format!(
                "severity level {} is outside {}..={}",
                level, SEVERITY_SILENT, SEVERITY_MAX
            )));
        }
        Ok(())
    }

    /// Placeholders in the message format the engine does not recognize
    pub fn unknown_placeholders(&self) -> Vec<String> {
        let Some(format) = self.message_format.as_deref() else {
            return Vec::new();
        };

        PLACEHOLDER
            .captures_iter(format)
            .map(|c| c[1].to_string())
            .filter(|p| !MESSAGE_FORMAT_PLACEHOLDERS.contains(&p.as_str()))
            .collect()
    }

    /// Project the set fields to namespaced engine properties
    ///
    /// Unset fields and blank strings produce no entry.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut projected = BTreeMap::new();

        if let Some(destination) = self.destination {
            projected.insert(
                properties::namespaced(properties::LOG_DESTINATION),
                destination.key().to_string(),
            );
        }

        if let Some(logger_name) = self.logger_name.as_deref().filter(|s| !s.trim().is_empty()) {
            projected.insert(
                properties::namespaced(properties::LOG_LOGGER_NAME),
                logger_name.to_string(),
            );
        }

        if let Some(level) = self.severity_level {
            projected.insert(
                properties::namespaced(properties::LOG_LEVEL),
                level.to_string(),
            );
        }

        if let Some(format) = self.message_format.as_deref().filter(|s| !s.trim().is_empty()) {
            projected.insert(
                properties::namespaced(properties::LOG_MESSAGE_FORMAT),
                format.to_string(),
            );
        }

        if let Some(limit) = self.character_limit {
            projected.insert(
                properties::namespaced(properties::LOG_LIMIT),
                limit.to_string(),
            );
        }

        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str =
        "Testing: {date}/{uptime} {product} {version} <{level}> (thread={thread}, member={member}): {text}";

    fn fixture() -> LoggingConfig {
        LoggingConfig {
            destination: Some(LogDestination::Slf4j),
            severity_level: None,
            logger_name: Some("testing".to_string()),
            message_format: Some(FORMAT.to_string()),
            character_limit: Some(123),
        }
    }

    #[test]
    fn test_projection_contains_only_set_fields() {
        let projected = fixture().to_properties();

        assert_eq!(projected.len(), 4);
        assert_eq!(projected["engine.properties.engine.log"], "slf4j");
        assert_eq!(projected["engine.properties.engine.log.logger"], "testing");
        assert_eq!(projected["engine.properties.engine.log.format"], FORMAT);
        assert_eq!(projected["engine.properties.engine.log.limit"], "123");
        assert!(!projected.contains_key("engine.properties.engine.log.level"));
        assert!(projected.keys().all(|k| k.starts_with(properties::NAMESPACE)));
    }

    #[test]
    fn test_blank_strings_are_omitted() {
        let logging = LoggingConfig {
            logger_name: Some("  ".to_string()),
            message_format: Some(String::new()),
            ..LoggingConfig::default()
        };
        assert!(logging.to_properties().is_empty());
    }

    #[test]
    fn test_zero_limit_and_silent_level_are_projected() {
        let logging = LoggingConfig {
            severity_level: Some(SEVERITY_SILENT),
            character_limit: Some(0),
            ..LoggingConfig::default()
        };
        let projected = logging.to_properties();
        assert_eq!(projected["engine.properties.engine.log.level"], "-1");
        assert_eq!(projected["engine.properties.engine.log.limit"], "0");
    }

    #[test]
    fn test_severity_level_bounds() {
        for level in [SEVERITY_SILENT, 0, 5, SEVERITY_MAX] {
            let logging = LoggingConfig {
                severity_level: Some(level),
                ..LoggingConfig::default()
            };
            assert!(logging.validate().is_ok(), "level {} should be valid", level);
        }

        for level in [-2, 10] {
            let logging = LoggingConfig {
                severity_level: Some(level),
                ..LoggingConfig::default()
            };
            assert!(matches!(
                logging.validate(),
                Err(ConfigError::InvalidLogging(_))
            ));
        }
    }

    #[test]
    fn test_unknown_placeholders() {
        assert!(fixture().unknown_placeholders().is_empty());

        let logging = LoggingConfig {
            message_format: Some("{date} {severity} {text} {host}".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(logging.unknown_placeholders(), vec!["severity", "host"]);
    }

    #[test]
    fn test_destination_keys() {
        assert_eq!(LogDestination::Log4j2.key(), "log4j2");
        let parsed: LogDestination = serde_json::from_str("\"slf4j\"").unwrap();
        assert_eq!(parsed, LogDestination::Slf4j);
    }
}
