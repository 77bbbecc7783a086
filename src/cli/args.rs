//! Command line argument parsing
//!
//! Subcommands:
//! - `resolve`: Print resolved sessions per group
//! - `properties`: Print the engine properties
//! - `start`: Initialize the engine and look up a session
//! - `show-config`: Show configuration discovery information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    Resolve(ResolveConfig),
    Properties { config_override: Option<PathBuf> },
    Start(StartConfig),
    ShowConfig,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResolveConfig {
    pub config_override: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StartConfig {
    pub config_override: Option<PathBuf>,
    pub session: Option<String>,
    pub caching: bool,
}

#[derive(Debug, Parser)]
#[command(name = "gridboot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve session configuration and bootstrap a caching engine")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the declared sessions and print them per group
    Resolve {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Print as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Print the properties handed to the engine
    Properties {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
    /// Initialize the engine and look up a session
    Start {
        /// Configuration file path
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        /// Session to look up (defaults to the default session)
        #[arg(short = 's', long = "session")]
        session: Option<String>,
        /// Register the default cache manager
        #[arg(long = "caching")]
        caching: bool,
    },
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Resolve { config, json }) => Ok(ExecutionMode::Resolve(ResolveConfig {
                config_override: config.clone(),
                json: *json,
            })),
            Some(Commands::Properties { config }) => Ok(ExecutionMode::Properties {
                config_override: config.clone(),
            }),
            Some(Commands::Start {
                config,
                session,
                caching,
            }) => Ok(ExecutionMode::Start(StartConfig {
                config_override: config.clone(),
                session: session.clone(),
                caching: *caching,
            })),
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => Err(
                "No command specified. Use 'gridboot --help' to see available commands."
                    .to_string(),
            ),
        }
    }
}
