use anyhow::{Context, Result};
use gridboot::cli::{Args, ConfigDiscovery, ExecutionMode, ResolveConfig, StartConfig};
use gridboot::{
    BootstrapConfig, CachingFlags, InitializationOrchestrator, ResolvedSessions,
    SessionConfigurationResolver, SessionGroup, SessionLookupGateway,
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridboot=info")),
        )
        .init();

    let args = Args::parse();
    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    match mode {
        ExecutionMode::Resolve(config) => run_resolve(config),
        ExecutionMode::Properties { config_override } => run_properties(config_override.as_deref()),
        ExecutionMode::Start(config) => run_start(config).await,
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            Ok(())
        }
    }
}

fn load(config_override: Option<&Path>) -> Result<(BootstrapConfig, ResolvedSessions)> {
    let config = ConfigDiscovery::load(config_override).context("Failed to load configuration")?;
    let sessions = SessionConfigurationResolver::new()
        .resolve(&config.descriptors())
        .context("Failed to resolve sessions")?;
    Ok((config, sessions))
}

fn run_resolve(resolve: ResolveConfig) -> Result<()> {
    let (_, sessions) = load(resolve.config_override.as_deref())?;

    if resolve.json {
        println!("{}", serde_json::to_string_pretty(sessions.all())?);
        return Ok(());
    }

    for group in SessionGroup::ALL {
        println!("{}:", group);
        for session in sessions.group(group) {
            println!("  {}", session);
        }
    }
    Ok(())
}

fn run_properties(config_override: Option<&Path>) -> Result<()> {
    let (config, _) = load(config_override)?;
    for (key, value) in config.engine_properties().iter() {
        println!("{}={}", key, value);
    }
    Ok(())
}

async fn run_start(start: StartConfig) -> Result<()> {
    let (config, sessions) = load(start.config_override.as_deref())?;

    let orchestrator = InitializationOrchestrator::builder(sessions)
        .properties(config.engine_properties())
        .caching(CachingFlags {
            caching_requested: start.caching,
            manager_already_provided: false,
        })
        .build();

    let artifacts = orchestrator.ensure_initialized().await?;
    if let Some(server) = artifacts.server() {
        server.start();
    }

    let cluster = orchestrator.cluster()?;
    info!("Joined cluster {} (member: {})", cluster.name, cluster.is_member);

    let gateway = SessionLookupGateway::new(orchestrator);
    let session = gateway.lookup(start.session.as_deref())?;
    println!("{}", session.configuration());

    if let Some(server) = artifacts.server() {
        server.stop();
    }
    Ok(())
}
