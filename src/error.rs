//! Error types shared by the resolver, selector, orchestrator and gateway.

/// Stage of the initialization pass that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    /// Choosing the configurer
    Selection,
    /// Obtaining the engine handle
    Engine,
    /// Obtaining the configuration snapshot
    Configuration,
    /// Obtaining the server handle
    Server,
    /// The driving task panicked or was aborted
    Driver,
}

impl std::fmt::Display for InitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InitStage::Selection => "configurer selection",
            InitStage::Engine => "engine",
            InitStage::Configuration => "configuration snapshot",
            InitStage::Server => "server",
            InitStage::Driver => "initialization driver",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the bootstrap core
///
/// Cloneable so a failed initialization can hand the same error to every
/// waiter and every later caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapError {
    #[error("Invalid session descriptor at index {index}: {reason}")]
    InvalidDescriptor { index: usize, reason: String },

    #[error("Expected one configurer but found {count}")]
    AmbiguousConfiguration { count: usize },

    #[error("Initialization failed during {stage}: {message}")]
    Initialization { stage: InitStage, message: String },

    #[error("No session has been configured with the name {name}")]
    SessionNotFound { name: String },

    #[error("Engine has not been initialized")]
    NotInitialized,
}

impl BootstrapError {
    pub(crate) fn invalid(index: usize, reason: impl Into<String>) -> Self {
        BootstrapError::InvalidDescriptor {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn initialization(stage: InitStage, source: &anyhow::Error) -> Self {
        BootstrapError::Initialization {
            stage,
            message: format!("{:#}", source),
        }
    }
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_initialization_error_keeps_context_chain() {
        let source: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = source.context("Failed to join cluster").unwrap_err();

        let mapped = BootstrapError::initialization(InitStage::Engine, &err);
        assert_eq!(
            mapped.to_string(),
            "Initialization failed during engine: Failed to join cluster: connection refused"
        );
    }

    #[test]
    fn test_session_not_found_message() {
        let err = BootstrapError::SessionNotFound {
            name: "missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No session has been configured with the name missing"
        );
    }
}
