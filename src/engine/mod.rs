//! # Engine Boundary
//!
//! Traits and handles at the seam between gridboot and the caching engine.
//!
//! - **[`Engine`]**: the live engine; owns the named-session registry
//! - **[`Configurer`]**: produces the engine handle, the configuration
//!   snapshot and the optional server handle
//! - **[`ConfigurerSelector`]**: picks the one configurer a process uses
//! - **[`DefaultConfigurer`]**: built-in configurer backed by [`LocalEngine`]

pub mod local;
pub mod selector;

pub use local::*;
pub use selector::*;

use crate::session::{ResolvedSessions, SessionConfiguration};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use uuid::Uuid;

/// Shared handle to the live engine
pub type EngineHandle = Arc<dyn Engine>;

/// A running caching engine as seen by gridboot
pub trait Engine: Send + Sync {
    /// Identity of this engine instance
    fn instance_id(&self) -> Uuid;

    /// Look up a live session by name
    ///
    /// When several sessions share the name, the first in startup order wins.
    fn find_session(&self, name: &str) -> Option<SessionHandle>;

    /// Names of all live sessions, in startup order
    fn session_names(&self) -> Vec<String>;

    /// Current view of the cluster this engine belongs to
    fn cluster(&self) -> ClusterHandle;
}

/// Pluggable provider of the three startup artifacts
///
/// The orchestrator calls `engine`, `configuration` and `server` once each,
/// in that order.
pub trait Configurer: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    fn engine(&self) -> BoxFuture<'_, anyhow::Result<EngineHandle>>;

    fn configuration(&self) -> BoxFuture<'_, anyhow::Result<ConfigurationSnapshot>>;

    /// Server handle, or `None` when this process is not an engine member
    fn server(&self) -> BoxFuture<'_, anyhow::Result<Option<ServerHandle>>>;
}

/// Reference to a live session
///
/// Cheap to clone; the engine keeps the session alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    configuration: Arc<SessionConfiguration>,
    engine_id: Uuid,
}

impl SessionHandle {
    pub fn new(configuration: Arc<SessionConfiguration>, engine_id: Uuid) -> Self {
        Self {
            configuration,
            engine_id,
        }
    }

    pub fn name(&self) -> &str {
        self.configuration.name()
    }

    pub fn scope_name(&self) -> Option<&str> {
        self.configuration.scope_name()
    }

    pub fn priority(&self) -> i32 {
        self.configuration.priority()
    }

    pub fn config_locator(&self) -> &str {
        self.configuration.config_locator()
    }

    pub fn configuration(&self) -> &SessionConfiguration {
        &self.configuration
    }

    pub fn engine_id(&self) -> Uuid {
        self.engine_id
    }
}

/// Snapshot of a cluster's identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterHandle {
    pub name: String,
    pub engine_id: Uuid,
    /// Whether this process takes part as a full member
    pub is_member: bool,
}

/// Configuration the engine was started with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    /// Sessions in startup order
    pub sessions: Vec<SessionConfiguration>,
    /// Native engine properties
    pub properties: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl ConfigurationSnapshot {
    pub fn new(sessions: &ResolvedSessions, properties: BTreeMap<String, String>) -> Self {
        Self {
            sessions: sessions.startup_order().into_iter().cloned().collect(),
            properties,
            created_at: Utc::now(),
        }
    }
}

/// Handle on the engine's server process
pub struct ServerHandle {
    engine: EngineHandle,
    sessions: Vec<SessionConfiguration>,
    running: AtomicBool,
}

impl ServerHandle {
    /// `sessions` must already be in startup order
    pub fn new(engine: EngineHandle, sessions: Vec<SessionConfiguration>) -> Self {
        Self {
            engine,
            sessions,
            running: AtomicBool::new(false),
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Start the server; a no-op when already running
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        for session in &self.sessions {
            info!("Starting session {}", session);
        }
        info!(
            "Server started on engine {} with {} sessions",
            self.engine.instance_id(),
            self.sessions.len()
        );
    }

    /// Stop the server, closing sessions in reverse startup order
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        for session in self.sessions.iter().rev() {
            info!("Stopping session {}", session);
        }
        info!("Server stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("engine", &self.engine.instance_id())
            .field("sessions", &self.sessions.len())
            .field("running", &self.is_running())
            .finish()
    }
}
