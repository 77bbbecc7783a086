//! Named-session lookup against an initialized engine.

use crate::engine::SessionHandle;
use crate::env::DEFAULT_SESSION_NAME;
use crate::error::{BootstrapError, BootstrapResult};
use crate::orchestrator::InitializationOrchestrator;
use std::sync::Arc;
use tracing::debug;

/// Resolves session names to live session handles
///
/// The gateway never initializes the engine; call
/// [`InitializationOrchestrator::ensure_initialized`] first. It keeps no
/// cache of its own, every lookup goes to the engine's registry.
#[derive(Clone)]
pub struct SessionLookupGateway {
    orchestrator: Arc<InitializationOrchestrator>,
}

impl SessionLookupGateway {
    pub fn new(orchestrator: Arc<InitializationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Look up a session, `None` meaning the default session
    pub fn lookup(&self, requested: Option<&str>) -> BootstrapResult<SessionHandle> {
        let engine = self.orchestrator.engine()?;
        let name = requested.unwrap_or(DEFAULT_SESSION_NAME);
        debug!("Looking up session {}", name);

        engine
            .find_session(name)
            .ok_or_else(|| BootstrapError::SessionNotFound {
                name: name.to_string(),
            })
    }
}
