//! # gridboot
//!
//! Session configuration resolution and single-initialization bootstrap for
//! a clustered caching engine.
//!
//! gridboot sits in front of an opaque engine. It turns a declarative,
//! possibly partial list of named sessions into a validated, priority-ordered
//! registry, and makes sure the engine behind it is initialized exactly once
//! per process no matter how many callers ask for it concurrently.
//!
//! ## Architecture Overview
//!
//! - **[`session`]**: session descriptors and the pure resolver producing
//!   [`SessionConfiguration`]s
//! - **[`config`]**: TOML configuration tree, engine logging settings and the
//!   engine property projection
//! - **[`engine`]**: the [`Engine`] and [`Configurer`] seams, the configurer
//!   selector and the built-in local engine
//! - **[`orchestrator`]**: the once-only initialization state machine
//! - **[`gateway`]**: named-session lookup against the initialized engine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridboot::config::BootstrapConfig;
//! use gridboot::{InitializationOrchestrator, SessionConfigurationResolver, SessionLookupGateway};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BootstrapConfig::from_toml_file("gridboot.toml")?;
//!     let sessions = SessionConfigurationResolver::new().resolve(&config.descriptors())?;
//!
//!     let orchestrator = InitializationOrchestrator::builder(sessions)
//!         .properties(config.engine_properties())
//!         .build();
//!     orchestrator.ensure_initialized().await?;
//!
//!     let session = SessionLookupGateway::new(orchestrator).lookup(Some("test"))?;
//!     println!("Session {} priority {}", session.name(), session.priority());
//!     Ok(())
//! }
//! ```

/// Configuration tree, logging settings and engine properties.
pub mod config;

/// Engine and configurer seams.
pub mod engine;

/// Well-known constants and path utilities.
pub mod env;

/// Error types of the bootstrap core.
pub mod error;

/// Named-session lookup.
pub mod gateway;

/// Once-only engine initialization.
pub mod orchestrator;

/// Session descriptors and resolution.
pub mod session;

// CLI module for command-line interface
pub mod cli;

pub use config::{BootstrapConfig, EngineProperties, LoggingConfig};
pub use engine::{
    Configurer, ConfigurerSelector, DefaultConfigurer, Engine, EngineHandle, SessionHandle,
};
pub use env::{DEFAULT_PRIORITY, DEFAULT_SESSION_NAME};
pub use error::{BootstrapError, BootstrapResult};
pub use gateway::SessionLookupGateway;
pub use orchestrator::{CachingFlags, InitPhase, InitializationOrchestrator, RuntimeArtifacts};
pub use session::{
    ResolvedSessions, SessionConfiguration, SessionConfigurationResolver, SessionDescriptor,
    SessionGroup,
};
