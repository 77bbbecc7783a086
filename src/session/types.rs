use crate::env::{DEFAULT_PRIORITY, DEFAULT_SESSION_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subsystem category a session configures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionGroup {
    /// Full engine participation (storage-enabled member)
    Server,
    /// Remote access only, over the engine's native client protocol
    Client,
    /// Remote access only, over gRPC
    Grpc,
}

impl SessionGroup {
    pub const ALL: [SessionGroup; 3] = [
        SessionGroup::Server,
        SessionGroup::Client,
        SessionGroup::Grpc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionGroup::Server => "server",
            SessionGroup::Client => "client",
            SessionGroup::Grpc => "grpc",
        }
    }

    /// Whether sessions of this group make the process a full engine member
    pub fn is_member(&self) -> bool {
        matches!(self, SessionGroup::Server)
    }
}

impl fmt::Display for SessionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(SessionGroup::Server),
            "client" => Ok(SessionGroup::Client),
            "grpc" => Ok(SessionGroup::Grpc),
            other => Err(format!("unknown session group '{}'", other)),
        }
    }
}

/// One user-declared session entry, possibly partial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Locator of the resource describing the session's data-access configuration
    #[serde(rename = "config")]
    pub config_locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Raw group name; validated during resolution
    pub group: String,
}

impl SessionDescriptor {
    pub fn new(group: SessionGroup, config_locator: impl Into<String>) -> Self {
        Self {
            name: None,
            config_locator: config_locator.into(),
            scope_name: None,
            priority: None,
            group: group.as_str().to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_scope(mut self, scope_name: impl Into<String>) -> Self {
        self.scope_name = Some(scope_name.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Copy of this descriptor with the name and priority defaults written out
    pub fn with_defaults_applied(&self) -> Self {
        Self {
            name: Some(self.resolved_name().to_string()),
            priority: Some(self.resolved_priority()),
            ..self.clone()
        }
    }

    pub fn resolved_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }

    pub fn resolved_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }
}

/// Resolved, immutable session configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionConfiguration {
    name: String,
    config_locator: String,
    scope_name: Option<String>,
    priority: i32,
    group: SessionGroup,
}

impl SessionConfiguration {
    pub(crate) fn new(
        name: String,
        config_locator: String,
        scope_name: Option<String>,
        priority: i32,
        group: SessionGroup,
    ) -> Self {
        Self {
            name,
            config_locator,
            scope_name,
            priority,
            group,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_locator(&self) -> &str {
        &self.config_locator
    }

    pub fn scope_name(&self) -> Option<&str> {
        self.scope_name.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn group(&self) -> SessionGroup {
        self.group
    }

    /// Whether the priority was left to the engine's default ordering
    pub fn has_default_priority(&self) -> bool {
        self.priority == DEFAULT_PRIORITY
    }
}

impl fmt::Display for SessionConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.group)?;
        if let Some(scope) = &self.scope_name {
            write!(f, " scope={}", scope)?;
        }
        if self.has_default_priority() {
            write!(f, " priority=default")?;
        } else {
            write!(f, " priority={}", self.priority)?;
        }
        write!(f, " config={}", self.config_locator)
    }
}
