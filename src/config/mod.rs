//! Registry configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `REGISTRY_*` environment variables. CLI flags are applied on top
//! by the binary. TTL and sweep period are fixed once the server starts.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::card::DEFAULT_RESOLVE_TIMEOUT;
use crate::error::{RegistryError, RegistryResult};
use crate::logging::LoggingConfig;
use crate::registry::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable prefix for registry settings
pub const ENV_PREFIX: &str = "REGISTRY";

/// Serializes tests that read or write `REGISTRY_*` variables
#[cfg(test)]
pub(crate) static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

fn default_resolve_timeout_secs() -> u64 {
    DEFAULT_RESOLVE_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds a record stays live without a heartbeat
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Seconds between reaper sweeps; must be shorter than the TTL
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Bound on a single agent card fetch
    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            resolve_timeout_secs: default_resolve_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RegistryConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> RegistryResult<()> {
        if self.host.trim().is_empty() {
            return Err(RegistryError::ConfigError("host cannot be empty".to_string()));
        }
        if self.ttl_secs == 0 {
            return Err(RegistryError::ConfigError(
                "ttl_secs must be positive".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(RegistryError::ConfigError(
                "sweep_interval_secs must be positive".to_string(),
            ));
        }
        if self.sweep_interval_secs >= self.ttl_secs {
            return Err(RegistryError::ConfigError(format!(
                "sweep_interval_secs ({}) must be shorter than ttl_secs ({})",
                self.sweep_interval_secs, self.ttl_secs
            )));
        }
        if self.resolve_timeout_secs == 0 {
            return Err(RegistryError::ConfigError(
                "resolve_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
