//! # Single-Initialization Orchestrator
//!
//! Owns the process-wide bootstrap state and guarantees the engine is
//! initialized at most once.
//!
//! ```text
//!                   compare-and-set          configurer ok
//! Uninitialized ─────────────────▶ Initializing ─────────────▶ Ready
//!                                        │
//!                                        └── any step fails ─▶ Failed (sticky)
//! ```
//!
//! Exactly one caller wins the compare-and-set and spawns the driver task;
//! every caller, the winner included, then waits on a watch channel for a
//! terminal phase. If the driver task is dropped before it finishes, for
//! instance because its runtime shut down, the pass is published as failed.
//! The artifacts are published as a single [`RuntimeArtifacts`] value, so
//! the engine handle, configuration snapshot and server handle become
//! visible together.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gridboot::{InitializationOrchestrator, SessionConfigurationResolver, SessionLookupGateway};
//! use gridboot::config::BootstrapConfig;
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
//!     let gateway = SessionLookupGateway::new(orchestrator);
//!     let session = gateway.lookup(None)?;
//!     println!("Default session uses {}", session.config_locator());
//!     Ok(())
//! }
//! ```


use crate::config::EngineProperties;
use crate::engine::{
    ClusterHandle, ConfigurationSnapshot, Configurer, ConfigurerSelector, DefaultConfigurer,
    EngineHandle, ServerHandle, SessionHandle,
};
use crate::error::{BootstrapError, BootstrapResult, InitStage};
use crate::session::ResolvedSessions;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Lifecycle phase of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InitPhase {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
    Failed = 3,
}

impl InitPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => InitPhase::Uninitialized,
            1 => InitPhase::Initializing,
            2 => InitPhase::Ready,
            _ => InitPhase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InitPhase::Ready | InitPhase::Failed)
    }
}

/// Flags supplied by the embedding layer deciding whether a default cache
/// manager is registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachingFlags {
    /// The application asked for caching support
    pub caching_requested: bool,
    /// The application already supplies its own cache manager
    pub manager_already_provided: bool,
}

impl CachingFlags {
    pub fn should_register_manager(&self) -> bool {
        self.caching_requested && !self.manager_already_provided
    }
}

/// Engine-backed cache manager registered when caching is requested
#[derive(Clone)]
pub struct CacheManager {
    engine: EngineHandle,
}

impl CacheManager {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Session backing the caches of the given name
    pub fn session(&self, name: &str) -> Option<SessionHandle> {
        self.engine.find_session(name)
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("engine", &self.engine.instance_id())
            .finish()
    }
}

/// Everything produced by a successful initialization
pub struct RuntimeArtifacts {
    configurer_name: String,
    engine: EngineHandle,
    configuration: Arc<ConfigurationSnapshot>,
    server: Option<Arc<ServerHandle>>,
    cache_manager: Option<CacheManager>,
}

impl RuntimeArtifacts {
    pub fn configurer_name(&self) -> &str {
        &self.configurer_name
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn configuration(&self) -> &Arc<ConfigurationSnapshot> {
        &self.configuration
    }

    pub fn server(&self) -> Option<&Arc<ServerHandle>> {
        self.server.as_ref()
    }

    pub fn cache_manager(&self) -> Option<&CacheManager> {
        self.cache_manager.as_ref()
    }
}

impl std::fmt::Debug for RuntimeArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeArtifacts")
            .field("configurer", &self.configurer_name)
            .field("engine", &self.engine.instance_id())
            .field("sessions", &self.configuration.sessions.len())
            .field("server", &self.server.is_some())
            .field("cache_manager", &self.cache_manager.is_some())
            .finish()
    }
}

/// Builder for [`InitializationOrchestrator`]
pub struct OrchestratorBuilder {
    sessions: ResolvedSessions,
    properties: EngineProperties,
    candidates: Vec<Arc<dyn Configurer>>,
    caching: CachingFlags,
}

impl OrchestratorBuilder {
    pub fn properties(mut self, properties: EngineProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Register a configurer candidate
    pub fn configurer(mut self, configurer: Arc<dyn Configurer>) -> Self {
        self.candidates.push(configurer);
        self
    }

    pub fn caching(mut self, caching: CachingFlags) -> Self {
        self.caching = caching;
        self
    }

    pub fn build(self) -> Arc<InitializationOrchestrator> {
        let (published, _) = watch::channel(InitPhase::Uninitialized);
        Arc::new(InitializationOrchestrator {
            sessions: self.sessions,
            properties: self.properties,
            selector: ConfigurerSelector::new(self.candidates),
            caching: self.caching,
            phase: AtomicU8::new(InitPhase::Uninitialized as u8),
            outcome: OnceLock::new(),
            published,
        })
    }
}

tokio::task_local! {
    /// Address of the orchestrator whose pass the current task is driving
    static DRIVING: usize;
}

/// Publishes a cancellation failure if the driver task is dropped before
/// it finishes, e.g. when its runtime shuts down.
struct DriverGuard {
    orchestrator: Arc<InitializationOrchestrator>,
    finished: bool,
}

impl DriverGuard {
    fn new(orchestrator: Arc<InitializationOrchestrator>) -> Self {
        Self {
            orchestrator,
            finished: false,
        }
    }

    fn finish(mut self, result: BootstrapResult<RuntimeArtifacts>) {
        self.finished = true;
        self.orchestrator.publish(result);
    }
}

impl Drop for DriverGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.orchestrator.publish(Err(BootstrapError::Initialization {
                stage: InitStage::Driver,
                message: "initialization task cancelled".to_string(),
            }));
        }
    }
}

/// Process-wide bootstrap state, shared through `Arc`
pub struct InitializationOrchestrator {
    sessions: ResolvedSessions,
    properties: EngineProperties,
    selector: ConfigurerSelector,
    caching: CachingFlags,
    phase: AtomicU8,
    outcome: OnceLock<BootstrapResult<Arc<RuntimeArtifacts>>>,
    published: watch::Sender<InitPhase>,
}

impl InitializationOrchestrator {
    pub fn builder(sessions: ResolvedSessions) -> OrchestratorBuilder {
        OrchestratorBuilder {
            sessions,
            properties: EngineProperties::default(),
            candidates: Vec::new(),
            caching: CachingFlags::default(),
        }
    }

    pub fn phase(&self) -> InitPhase {
        InitPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn sessions(&self) -> &ResolvedSessions {
        &self.sessions
    }

    pub fn properties(&self) -> &EngineProperties {
        &self.properties
    }

    /// The configurer picked during initialization, once picked
    pub fn configurer(&self) -> Option<Arc<dyn Configurer>> {
        self.selector.selected()
    }

    /// Initialize the engine unless it already is, returning the artifacts
    ///
    /// Concurrent callers share one initialization pass and all observe the
    /// same outcome. A failure is returned to every later caller as well.
    /// Called from inside the pass itself (e.g. by a configurer) it fails
    /// immediately with [`InitStage::Driver`] instead of waiting on itself.
    /// Must be called from within a Tokio runtime.
    pub async fn ensure_initialized(self: &Arc<Self>) -> BootstrapResult<Arc<RuntimeArtifacts>> {
        if let Some(outcome) = self.outcome.get() {
            return outcome.clone();
        }

        // The driver cannot wait on itself
        if self.is_driving() {
            warn!("Re-entrant initialization requested from within the initialization pass");
            return Err(BootstrapError::Initialization {
                stage: InitStage::Driver,
                message: "re-entrant initialization".to_string(),
            });
        }

        if self
            .phase
            .compare_exchange(
                InitPhase::Uninitialized as u8,
                InitPhase::Initializing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            info!("Initializing engine");
            self.published.send_replace(InitPhase::Initializing);

            // Driven on its own task so dropping this future cannot strand the waiters
            let guard = DriverGuard::new(Arc::clone(self));
            let driving = Arc::as_ptr(self) as usize;
            tokio::spawn(async move {
                let pass = AssertUnwindSafe(guard.orchestrator.drive()).catch_unwind();
                let result = DRIVING
                    .scope(driving, pass)
                    .await
                    .unwrap_or_else(|_| {
                        Err(BootstrapError::Initialization {
                            stage: InitStage::Driver,
                            message: "initialization task panicked".to_string(),
                        })
                    });
                guard.finish(result);
            });
        } else {
            debug!("Initialization already started, waiting for its outcome");
        }

        self.wait_for_outcome().await
    }

    /// Artifacts of a completed initialization
    ///
    /// Never initializes: fails with the sticky error after a failed pass and
    /// with [`BootstrapError::NotInitialized`] before the pass completes.
    pub fn artifacts(&self) -> BootstrapResult<Arc<RuntimeArtifacts>> {
        match self.outcome.get() {
            Some(outcome) => outcome.clone(),
            None => Err(BootstrapError::NotInitialized),
        }
    }

    pub fn engine(&self) -> BootstrapResult<EngineHandle> {
        Ok(Arc::clone(self.artifacts()?.engine()))
    }

    pub fn configuration(&self) -> BootstrapResult<Arc<ConfigurationSnapshot>> {
        Ok(Arc::clone(self.artifacts()?.configuration()))
    }

    pub fn server(&self) -> BootstrapResult<Option<Arc<ServerHandle>>> {
        Ok(self.artifacts()?.server().cloned())
    }

    pub fn cache_manager(&self) -> BootstrapResult<Option<CacheManager>> {
        Ok(self.artifacts()?.cache_manager().cloned())
    }

    /// Fresh view of the cluster on every call
    pub fn cluster(&self) -> BootstrapResult<ClusterHandle> {
        Ok(self.artifacts()?.engine().cluster())
    }

    fn is_driving(&self) -> bool {
        let this = self as *const Self as usize;
        DRIVING.try_with(|driving| *driving == this).unwrap_or(false)
    }

    async fn wait_for_outcome(&self) -> BootstrapResult<Arc<RuntimeArtifacts>> {
        let mut receiver = self.published.subscribe();
        if receiver.wait_for(InitPhase::is_terminal).await.is_err() {
            return Err(BootstrapError::NotInitialized);
        }
        self.artifacts()
    }

    fn publish(&self, result: BootstrapResult<RuntimeArtifacts>) {
        let outcome = result.map(Arc::new);
        let phase = match &outcome {
            Ok(artifacts) => {
                info!("Engine initialized: {:?}", artifacts);
                InitPhase::Ready
            }
            Err(e) => {
                error!("Engine initialization failed: {}", e);
                InitPhase::Failed
            }
        };

        // outcome before phase: a waiter seeing a terminal phase always finds it
        let _ = self.outcome.set(outcome);
        self.phase.store(phase as u8, Ordering::Release);
        self.published.send_replace(phase);
    }

    async fn drive(&self) -> BootstrapResult<RuntimeArtifacts> {
        let configurer = self.selector.select(|| -> Arc<dyn Configurer> {
            Arc::new(DefaultConfigurer::new(
                self.sessions.clone(),
                self.properties.clone(),
            ))
        })?;
        debug!("Using {} configurer", configurer.name());

        let engine = configurer
            .engine()
            .await
            .map_err(|e| BootstrapError::initialization(InitStage::Engine, &e))?;
        let configuration = configurer
            .configuration()
            .await
            .map_err(|e| BootstrapError::initialization(InitStage::Configuration, &e))?;
        let server = configurer
            .server()
            .await
            .map_err(|e| BootstrapError::initialization(InitStage::Server, &e))?;

        info!(
            "Caching is enabled: {}. Found existing cache manager: {}",
            self.caching.caching_requested, self.caching.manager_already_provided
        );
        let cache_manager = if self.caching.should_register_manager() {
            info!("Creating default cache manager");
            Some(CacheManager::new(Arc::clone(&engine)))
        } else {
            None
        };

        Ok(RuntimeArtifacts {
            configurer_name: configurer.name().to_string(),
            engine,
            configuration: Arc::new(configuration),
            server: server.map(Arc::new),
            cache_manager,
        })
    }
}
