//! CLI Tooling
//!
//! `serve` runs the registry. `register`, `heartbeat`, `list` and `unregister`
//! talk to a running registry over HTTP.

use crate::config::{ConfigLoader, RegistryConfig};
use crate::directory::{format_agent_list_text, shutdown_signal, DirectoryServer};
use crate::error::{RegistryError, RegistryResult};
use crate::heartbeat::{HeartbeatClient, HeartbeatConfig, REGISTRY_URL_ENV};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEFAULT_REGISTRY_URL: &str = "http://localhost:8000";

/// Agent Registry - discovery and liveness for A2A agents
#[derive(Parser, Debug)]
#[command(name = "agent-registry")]
#[command(about = "Central directory of live agents with TTL-based liveness")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the registry server
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Seconds a record stays live without a heartbeat
        #[arg(long)]
        ttl_secs: Option<u64>,
        /// Seconds between reaper sweeps
        #[arg(long)]
        sweep_interval_secs: Option<u64>,
    },
    /// Register an agent once
    Register {
        /// Agent base URL; its card is fetched from the well-known path
        agent_url: String,
        /// Display name; skips card resolution
        #[arg(long)]
        name: Option<String>,
        #[arg(long, env = REGISTRY_URL_ENV, default_value = DEFAULT_REGISTRY_URL)]
        registry: String,
    },
    /// Register an agent and keep it alive until interrupted
    Heartbeat {
        agent_url: String,
        #[arg(long)]
        name: Option<String>,
        /// Seconds between heartbeats
        #[arg(long, default_value = "100")]
        interval_secs: u64,
        #[arg(long, env = REGISTRY_URL_ENV, default_value = DEFAULT_REGISTRY_URL)]
        registry: String,
    },
    /// List live agents
    List {
        #[arg(long, value_enum, default_value = "text")]
        format: ListFormat,
        #[arg(long, env = REGISTRY_URL_ENV, default_value = DEFAULT_REGISTRY_URL)]
        registry: String,
    },
    /// Remove an agent
    Unregister {
        agent_url: String,
        #[arg(long, env = REGISTRY_URL_ENV, default_value = DEFAULT_REGISTRY_URL)]
        registry: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Text,
    Json,
}

/// Resolved configuration plus the command to run
pub struct CliContext {
    config: RegistryConfig,
    log_file: Option<PathBuf>,
}

impl CliContext {
    /// Load layered config and apply the global flags on top.
    pub fn new(cli: &Cli) -> RegistryResult<Self> {
        let mut config = match &cli.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };

        let logging = &mut config.logging;
        if let Some(level) = &cli.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &cli.log_output {
            logging.output = output.clone();
        }

        Ok(Self {
            config,
            log_file: cli.log_file.clone(),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// `--log-file`, kept apart from the config so it outranks
    /// `AGENT_REGISTRY_LOG_FILE`
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.clone()
    }

    /// Execute a CLI command, returning text for stdout
    pub async fn execute(&self, command: &Commands) -> RegistryResult<String> {
        match command {
            Commands::Serve {
                host,
                port,
                ttl_secs,
                sweep_interval_secs,
            } => {
                let mut config = self.config.clone();
                if let Some(host) = host {
                    config.host = host.clone();
                }
                if let Some(port) = port {
                    config.port = *port;
                }
                if let Some(ttl) = ttl_secs {
                    config.ttl_secs = *ttl;
                }
                if let Some(sweep) = sweep_interval_secs {
                    config.sweep_interval_secs = *sweep;
                }

                let server = DirectoryServer::bind(&config).await?;
                server.run_until(shutdown_signal()).await?;
                Ok(String::new())
            }
            Commands::Register {
                agent_url,
                name,
                registry,
            } => {
                let client = client_for(registry, agent_url, name.as_deref(), None)?;
                let record = client.register().await?;
                Ok(format!("Registered '{}' at {}", record.name, record.url))
            }
            Commands::Heartbeat {
                agent_url,
                name,
                interval_secs,
                registry,
            } => {
                if *interval_secs == 0 {
                    return Err(RegistryError::InvalidInput(
                        "--interval-secs must be positive".to_string(),
                    ));
                }
                let client = client_for(
                    registry,
                    agent_url,
                    name.as_deref(),
                    Some(Duration::from_secs(*interval_secs)),
                )?;
                let handle = client.spawn();
                shutdown_signal().await;
                handle.stop().await;
                info!(agent_url = %agent_url, "Heartbeat ended");
                Ok(String::new())
            }
            Commands::List { format, registry } => {
                let client = client_for(registry, "", None, None)?;
                let agents = client.list().await?;
                match format {
                    ListFormat::Json => serde_json::to_string_pretty(&agents)
                        .map_err(|e| RegistryError::Io(e.into())),
                    ListFormat::Text => Ok(format_agent_list_text(&agents, chrono::Utc::now())),
                }
            }
            Commands::Unregister {
                agent_url,
                registry,
            } => {
                let client = client_for(registry, agent_url, None, None)?;
                client.unregister().await?;
                Ok(format!("Unregistered {}", agent_url))
            }
        }
    }
}

fn client_for(
    registry: &str,
    agent_url: &str,
    name: Option<&str>,
    interval: Option<Duration>,
) -> RegistryResult<HeartbeatClient> {
    let mut config = HeartbeatConfig::new(registry, agent_url);
    if let Some(name) = name {
        config = config.with_name(name);
    }
    if let Some(interval) = interval {
        config = config.with_interval(interval);
    }
    HeartbeatClient::new(config)
}
